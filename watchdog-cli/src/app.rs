//! Keyboard state machine for the terminal dashboard
//!
//! Turns key presses into `Action`s. Holds no data from the server; the
//! caller passes in what it needs to know about the current frame.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use watchdog_core::model::{LogId, LogQuery, LogSource, QueryKind};

/// Which log pane has focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Live,
    Stored,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Self::Live => Self::Stored,
            Self::Stored => Self::Live,
        }
    }

    pub fn source(self) -> LogSource {
        match self {
            Self::Live => LogSource::Live,
            Self::Stored => LogSource::Stored,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Search(LogSource, QueryKind),
    Save(QueryKind),
}

impl PromptKind {
    pub fn title(&self) -> String {
        match self {
            Self::Search(source, kind) => {
                format!("Search {} by {}", source.label().to_lowercase(), kind.label())
            }
            Self::Save(QueryKind::Id) => "Save log by id".to_string(),
            Self::Save(QueryKind::Type) => "Save logs by type".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Search { source: LogSource, query: LogQuery },
    Save(LogQuery),
    Delete(LogId),
    Refresh(LogSource),
    DismissNotice,
}

/// What the key handler needs to know about the frame on screen
pub struct KeyContext<'a> {
    pub notice_open: bool,
    pub live_len: usize,
    /// Delete target of each stored-pane line, in display order
    pub stored: &'a [Option<LogId>],
}

#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub focus: Focus,
    pub prompt: Option<Prompt>,
    pub help_open: bool,
    pub live_selected: usize,
    pub stored_selected: usize,
}

impl UiState {
    pub fn selected(&self, focus: Focus) -> usize {
        match focus {
            Focus::Live => self.live_selected,
            Focus::Stored => self.stored_selected,
        }
    }

    /// Keep selections inside lists that may have shrunk since the last frame
    pub fn clamp(&mut self, live_len: usize, stored_len: usize) {
        self.live_selected = self.live_selected.min(live_len.saturating_sub(1));
        self.stored_selected = self.stored_selected.min(stored_len.saturating_sub(1));
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            input: String::new(),
        });
    }

    fn move_selection(&mut self, down: bool, ctx: &KeyContext<'_>) {
        let (selected, len) = match self.focus {
            Focus::Live => (&mut self.live_selected, ctx.live_len),
            Focus::Stored => (&mut self.stored_selected, ctx.stored.len()),
        };
        if down {
            if *selected + 1 < len {
                *selected += 1;
            }
        } else {
            *selected = selected.saturating_sub(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &KeyContext<'_>) -> Action {
        let KeyEvent { code, modifiers, .. } = key;

        // ---------- NOTICE (blocks everything else) ----------
        if ctx.notice_open {
            return match code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Action::DismissNotice,
                _ => Action::None,
            };
        }

        // ---------- PROMPT ----------
        if let Some(prompt) = &mut self.prompt {
            match code {
                KeyCode::Esc => self.prompt = None,
                KeyCode::Enter => {
                    let kind = prompt.kind;
                    let input = std::mem::take(&mut prompt.input);
                    self.prompt = None;
                    return match kind {
                        PromptKind::Search(source, kind) => LogQuery::new(kind, &input)
                            .map(|query| Action::Search { source, query })
                            .unwrap_or(Action::None),
                        PromptKind::Save(kind) => LogQuery::new(kind, &input)
                            .map(Action::Save)
                            .unwrap_or(Action::None),
                    };
                }
                KeyCode::Backspace => {
                    prompt.input.pop();
                }
                KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                    prompt.input.push(c);
                }
                _ => {}
            }
            return Action::None;
        }

        // ---------- HELP ----------
        if self.help_open {
            if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.help_open = false;
            }
            return Action::None;
        }

        match (code, modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => {
                self.focus = self.focus.toggle();
                Action::None
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                self.move_selection(true, ctx);
                Action::None
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.move_selection(false, ctx);
                Action::None
            }
            (KeyCode::Char('/'), _) => {
                self.open_prompt(PromptKind::Search(self.focus.source(), QueryKind::Id));
                Action::None
            }
            (KeyCode::Char('t'), _) => {
                self.open_prompt(PromptKind::Search(self.focus.source(), QueryKind::Type));
                Action::None
            }
            (KeyCode::Char('s'), _) => {
                self.open_prompt(PromptKind::Save(QueryKind::Id));
                Action::None
            }
            (KeyCode::Char('S'), _) => {
                self.open_prompt(PromptKind::Save(QueryKind::Type));
                Action::None
            }
            (KeyCode::Char('r'), _) => Action::Refresh(self.focus.source()),
            (KeyCode::Char('d'), _) | (KeyCode::Delete, _) if self.focus == Focus::Stored => ctx
                .stored
                .get(self.stored_selected)
                .copied()
                .flatten()
                .map(Action::Delete)
                .unwrap_or(Action::None),
            (KeyCode::Char('?'), _) => {
                self.help_open = true;
                Action::None
            }
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx(stored: &[Option<LogId>]) -> KeyContext<'_> {
        KeyContext {
            notice_open: false,
            live_len: 3,
            stored,
        }
    }

    fn type_text(ui: &mut UiState, text: &str, c: &KeyContext<'_>) {
        for ch in text.chars() {
            assert_eq!(ui.handle_key(key(KeyCode::Char(ch)), c), Action::None);
        }
    }

    #[test]
    fn test_search_prompt_submits_query_for_focused_pane() {
        let mut ui = UiState::default();
        let c = ctx(&[]);

        ui.handle_key(key(KeyCode::Tab), &c);
        ui.handle_key(key(KeyCode::Char('t')), &c);
        assert!(ui.prompt.is_some());
        type_text(&mut ui, "Error", &c);

        let action = ui.handle_key(key(KeyCode::Enter), &c);
        assert_eq!(
            action,
            Action::Search {
                source: LogSource::Stored,
                query: LogQuery::by_type("Error").unwrap(),
            }
        );
        assert!(ui.prompt.is_none());
    }

    #[test]
    fn test_blank_prompt_is_ignored() {
        let mut ui = UiState::default();
        let c = ctx(&[]);

        ui.handle_key(key(KeyCode::Char('s')), &c);
        type_text(&mut ui, "  ", &c);
        assert_eq!(ui.handle_key(key(KeyCode::Enter), &c), Action::None);
        assert!(ui.prompt.is_none());
    }

    #[test]
    fn test_prompt_backspace_and_escape() {
        let mut ui = UiState::default();
        let c = ctx(&[]);

        ui.handle_key(key(KeyCode::Char('S')), &c);
        type_text(&mut ui, "Warnx", &c);
        ui.handle_key(key(KeyCode::Backspace), &c);
        type_text(&mut ui, "ing", &c);
        assert_eq!(
            ui.handle_key(key(KeyCode::Enter), &c),
            Action::Save(LogQuery::by_type("Warning").unwrap())
        );

        ui.handle_key(key(KeyCode::Char('/')), &c);
        type_text(&mut ui, "12", &c);
        assert_eq!(ui.handle_key(key(KeyCode::Esc), &c), Action::None);
        assert!(ui.prompt.is_none());
    }

    #[test]
    fn test_keys_typed_into_prompt_are_not_commands() {
        let mut ui = UiState::default();
        let c = ctx(&[]);

        ui.handle_key(key(KeyCode::Char('/')), &c);
        assert_eq!(ui.handle_key(key(KeyCode::Char('q')), &c), Action::None);
        assert_eq!(ui.prompt.as_ref().map(|p| p.input.as_str()), Some("q"));
    }

    #[test]
    fn test_delete_targets_selected_stored_record() {
        let mut ui = UiState::default();
        let stored = [Some(5), Some(7)];
        let c = ctx(&stored);

        // Delete does nothing while the live pane has focus
        assert_eq!(ui.handle_key(key(KeyCode::Char('d')), &c), Action::None);

        ui.handle_key(key(KeyCode::Tab), &c);
        ui.handle_key(key(KeyCode::Down), &c);
        ui.handle_key(key(KeyCode::Down), &c);
        assert_eq!(ui.stored_selected, 1);
        assert_eq!(ui.handle_key(key(KeyCode::Char('d')), &c), Action::Delete(7));
    }

    #[test]
    fn test_delete_on_sentinel_line_is_ignored() {
        let mut ui = UiState {
            focus: Focus::Stored,
            ..Default::default()
        };
        let stored = [None];
        assert_eq!(
            ui.handle_key(key(KeyCode::Delete), &ctx(&stored)),
            Action::None
        );
    }

    #[test]
    fn test_notice_blocks_other_keys() {
        let mut ui = UiState::default();
        let c = KeyContext {
            notice_open: true,
            live_len: 0,
            stored: &[],
        };

        assert_eq!(ui.handle_key(key(KeyCode::Char('q')), &c), Action::None);
        assert_eq!(ui.handle_key(key(KeyCode::Char('/')), &c), Action::None);
        assert!(ui.prompt.is_none());
        assert_eq!(ui.handle_key(key(KeyCode::Enter), &c), Action::DismissNotice);
    }

    #[test]
    fn test_quit_and_refresh() {
        let mut ui = UiState::default();
        let c = ctx(&[]);
        assert_eq!(
            ui.handle_key(key(KeyCode::Char('r')), &c),
            Action::Refresh(LogSource::Live)
        );
        assert_eq!(
            ui.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &c),
            Action::Quit
        );
        assert_eq!(ui.handle_key(key(KeyCode::Char('q')), &c), Action::Quit);
    }

    #[test]
    fn test_clamp_after_list_shrinks() {
        let mut ui = UiState {
            live_selected: 9,
            stored_selected: 4,
            ..Default::default()
        };
        ui.clamp(3, 0);
        assert_eq!(ui.live_selected, 2);
        assert_eq!(ui.stored_selected, 0);
        assert_eq!(ui.selected(Focus::Live), 2);
    }

    #[test]
    fn test_prompt_titles() {
        assert_eq!(
            PromptKind::Search(LogSource::Stored, QueryKind::Id).title(),
            "Search stored logs by id"
        );
        assert_eq!(PromptKind::Save(QueryKind::Type).title(), "Save logs by type");
    }
}
