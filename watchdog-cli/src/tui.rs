//! Terminal dashboard
//!
//! Three metric charts over two log panes. Pollers write into `ViewSlot`s and
//! the shared metrics state; this loop only reads them, draws, and turns key
//! presses into spawned requests so the screen never waits on the network.

use std::io;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Wrap,
    },
};
use tracing::{debug, info};

use watchdog_core::client::Transport;
use watchdog_core::config::DashboardConfig;
use watchdog_core::dashboard::{Dashboard, Surfaces};
use watchdog_core::metrics::{MetricKind, MetricsState, PERCENT_MAX};
use watchdog_core::model::{LogId, LogSource};
use watchdog_core::notice::{Notice, NoticeQueue};
use watchdog_core::render::DisplayItem;
use watchdog_core::view::{ViewSlot, ViewSnapshot};

use crate::app::{Action, Focus, KeyContext, UiState};
use crate::ui::styles;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Everything one frame draws, copied out of the shared state
struct Screen {
    base_url: String,
    live: ViewSnapshot,
    stored: ViewSnapshot,
    metrics: MetricsState,
    notice: Option<Notice>,
}

impl Screen {
    fn pane(&self, focus: Focus) -> &ViewSnapshot {
        match focus {
            Focus::Live => &self.live,
            Focus::Stored => &self.stored,
        }
    }

    fn stored_targets(&self) -> Vec<Option<LogId>> {
        self.stored.list.items().iter().map(|i| i.delete_id()).collect()
    }
}

pub async fn run(config: DashboardConfig, transport: Arc<dyn Transport>) -> io::Result<()> {
    let live = ViewSlot::new(LogSource::Live);
    let stored = ViewSlot::new(LogSource::Stored);
    let notices = NoticeQueue::new();

    let mut dashboard = Dashboard::new(
        config,
        transport,
        Surfaces {
            live: Arc::new(live.clone()),
            stored: Arc::new(stored.clone()),
            notifier: Arc::new(notices.clone()),
        },
    );
    dashboard.start();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &dashboard, &live, &stored, &notices).await;

    dashboard.stop();
    restore_terminal(terminal)?;
    info!("dashboard closed");
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    dashboard: &Dashboard,
    live: &ViewSlot,
    stored: &ViewSlot,
    notices: &NoticeQueue,
) -> io::Result<()> {
    let mut ui = UiState::default();

    loop {
        let screen = Screen {
            base_url: dashboard.client().base_url().to_string(),
            live: live.snapshot().await,
            stored: stored.snapshot().await,
            metrics: dashboard.metrics().read().await.clone(),
            notice: notices.current().await,
        };
        ui.clamp(screen.live.list.len(), screen.stored.list.len());
        terminal.draw(|f| draw(f, &ui, &screen))?;

        // Drain pending input without blocking the pollers
        while event::poll(Duration::ZERO)? {
            let CEvent::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            let targets = screen.stored_targets();
            let ctx = KeyContext {
                notice_open: notices.current().await.is_some(),
                live_len: screen.live.list.len(),
                stored: &targets,
            };

            match ui.handle_key(key, &ctx) {
                Action::None => {}
                Action::Quit => return Ok(()),
                Action::DismissNotice => {
                    notices.dismiss().await;
                }
                Action::Search { source, query } => {
                    debug!(source = source.label(), query = %query.label(), "search");
                    let view = dashboard.view(source).clone();
                    tokio::spawn(async move { view.run_query(query).await });
                }
                Action::Refresh(source) => {
                    let view = dashboard.view(source).clone();
                    tokio::spawn(async move { view.refresh().await });
                }
                Action::Save(query) => {
                    let mutations = dashboard.mutations().clone();
                    tokio::spawn(async move {
                        mutations.create(&query).await;
                    });
                }
                Action::Delete(id) => {
                    let mutations = dashboard.mutations().clone();
                    tokio::spawn(async move {
                        mutations.delete(id).await;
                    });
                }
            }
        }

        tokio::time::sleep(FRAME_INTERVAL).await;
    }
}

fn draw(f: &mut Frame, ui: &UiState, screen: &Screen) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);
    for (kind, area) in MetricKind::ALL.into_iter().zip(charts.iter()) {
        draw_chart(f, *area, kind, &screen.metrics);
    }

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    draw_pane(f, panes[0], ui, screen, Focus::Live);
    draw_pane(f, panes[1], ui, screen, Focus::Stored);

    draw_status(f, rows[2], ui, screen);
    draw_hints(f, rows[3], ui.focus);

    if ui.help_open {
        draw_help(f);
    }
    if let Some(notice) = &screen.notice {
        draw_notice(f, notice);
    }
}

fn draw_chart(f: &mut Frame, area: Rect, kind: MetricKind, metrics: &MetricsState) {
    let window = metrics.window(kind);
    let data = window.points();
    let x_max = (window.capacity().max(2) - 1) as f64;

    let mut title = vec![Span::styled(format!(" {} ", kind.title()), styles::title())];
    if let Some(latest) = window.latest() {
        title.push(Span::styled(format!("{:.1} ", latest), styles::load(latest)));
    }

    let bounds = window
        .value_bounds()
        .map(|(min, max)| format!(" min {:.1}  max {:.1} ", min, max))
        .unwrap_or_else(|| " waiting for data ".to_string());

    let x_labels = vec![
        Span::styled(window.first_label().unwrap_or("").to_string(), styles::text_dim()),
        Span::styled(window.last_label().unwrap_or("").to_string(), styles::text_dim()),
    ];

    let dataset = Dataset::default()
        .name(kind.short())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(styles::metric(kind)))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .title(Line::from(title))
                .title_bottom(Line::from(Span::styled(bounds, styles::text_dim())))
                .borders(Borders::ALL)
                .border_style(styles::border(false)),
        )
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels))
        .y_axis(
            Axis::default()
                .bounds([0.0, PERCENT_MAX])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );

    f.render_widget(chart, area);
}

fn item_line(item: &DisplayItem) -> ListItem<'static> {
    let style = match item.level() {
        Some(level) => styles::level(level),
        None => styles::text_muted(),
    };
    ListItem::new(Line::from(Span::styled(item.text().to_string(), style)))
}

fn draw_pane(f: &mut Frame, area: Rect, ui: &UiState, screen: &Screen, pane: Focus) {
    let focused = ui.focus == pane;
    let snapshot = screen.pane(pane);

    let state_style = if snapshot.state.is_override() {
        styles::accent()
    } else {
        styles::text_dim()
    };
    let title = Line::from(vec![
        Span::styled(format!(" {} ", pane.source().label()), styles::title()),
        Span::styled(format!("[{}] ", snapshot.state.label()), state_style),
    ]);

    let items: Vec<ListItem> = snapshot.list.items().iter().map(item_line).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(styles::border(focused)),
        )
        .highlight_style(if focused {
            styles::selection()
        } else {
            Style::default()
        });

    let mut list_state = ListState::default();
    list_state.select(Some(ui.selected(pane)));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%H:%M:%S").to_string()
}

fn draw_status(f: &mut Frame, area: Rect, ui: &UiState, screen: &Screen) {
    let line = if let Some(prompt) = &ui.prompt {
        Line::from(vec![
            Span::styled(format!("{}: ", prompt.kind.title()), styles::accent()),
            Span::styled(prompt.input.clone(), styles::text()),
            Span::styled("█", styles::accent()),
        ])
    } else {
        let updated = screen
            .pane(ui.focus)
            .updated_at
            .map(format_time)
            .unwrap_or_else(|| "never".to_string());
        Line::from(vec![
            Span::styled(format!(" {} ", screen.base_url), styles::text_dim()),
            Span::styled(format!("│ updated {} ", updated), styles::text_dim()),
            Span::styled(format!("│ {} samples", screen.metrics.samples), styles::text_dim()),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_hints(f: &mut Frame, area: Rect, focus: Focus) {
    let mut hints = vec![
        ("Tab", "focus"),
        ("↑↓", "select"),
        ("/", "search id"),
        ("t", "search type"),
        ("s", "save id"),
        ("S", "save type"),
    ];
    if focus == Focus::Stored {
        hints.push(("d", "delete"));
    }
    hints.extend([("r", "refresh"), ("?", "help"), ("q", "quit")]);

    let spans: Vec<Span> = hints
        .into_iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!(" {} ", key), styles::key_hint()),
                Span::styled(format!("{} ", desc), styles::text_dim()),
            ]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn centered_rect(width_pct: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_pct) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn notice_message_style(notice: &Notice) -> Style {
    if notice.is_error() {
        styles::error()
    } else {
        styles::text()
    }
}

fn draw_notice(f: &mut Frame, notice: &Notice) {
    let modal_rect = centered_rect(40, 5, f.area());
    f.render_widget(Clear, modal_rect);

    let title = if notice.is_error() { " Error " } else { " Notice " };
    let body = vec![
        Line::from(Span::styled(notice.message.clone(), notice_message_style(notice))),
        Line::from(Span::styled("Enter to dismiss", styles::text_dim())),
    ];
    let paragraph = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(styles::notice(notice.level)),
        );
    f.render_widget(paragraph, modal_rect);
}

fn draw_help(f: &mut Frame) {
    let modal_rect = centered_rect(50, 16, f.area());
    f.render_widget(Clear, modal_rect);

    let rows = [
        ("Tab", "Switch between live and stored logs"),
        ("↑/k ↓/j", "Move selection"),
        ("/", "Search the focused pane by id"),
        ("t", "Search the focused pane by type"),
        ("s", "Save a live log to stored logs by id"),
        ("S", "Save all live logs of a type"),
        ("d", "Delete the selected stored log"),
        ("r", "Refresh the focused pane now"),
        ("Enter", "Submit prompt / dismiss notice"),
        ("Esc", "Cancel prompt / close help"),
        ("q", "Quit"),
    ];
    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!(" {:<10}", key), styles::key_hint()),
                Span::styled(desc, styles::text()),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Keys ")
            .borders(Borders::ALL)
            .border_style(styles::border(true)),
    );
    f.render_widget(paragraph, modal_rect);
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use ratatui::backend::TestBackend;

    use watchdog_core::model::MetricSample;

    use super::*;

    /// Non-blank Braille cells drawn for a CPU chart holding one sample
    fn plotted_cells(cpu: f64) -> usize {
        let mut metrics = MetricsState::new();
        metrics.push(MetricSample {
            timestamp: Local::now(),
            cpu,
            ram: 0.0,
            disk: 0.0,
        });

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|f| draw_chart(f, f.area(), MetricKind::Cpu, &metrics))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .filter(|cell| {
                cell.symbol()
                    .chars()
                    .any(|c| ('\u{2801}'..='\u{28FF}').contains(&c))
            })
            .count()
    }

    #[test]
    fn test_out_of_range_sample_is_still_plotted() {
        assert_eq!(plotted_cells(100.0), 1);
        assert_eq!(plotted_cells(100.5), 1);
        assert_eq!(plotted_cells(-3.0), 1);
    }

    #[test]
    fn test_error_notice_body_uses_error_style() {
        assert_eq!(
            notice_message_style(&Notice::error("Error deleting log")),
            styles::error()
        );
        assert_eq!(notice_message_style(&Notice::info("Log saved!")), styles::text());
    }

    #[test]
    fn test_centered_rect_on_very_wide_terminal() {
        let area = Rect::new(0, 0, 2000, 50);
        let rect = centered_rect(50, 16, area);
        assert_eq!(rect, Rect::new(500, 17, 1000, 16));
    }

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(40, 5, area);
        assert_eq!(rect, Rect::new(30, 17, 40, 5));

        let tiny = Rect::new(0, 0, 10, 3);
        let rect = centered_rect(50, 16, tiny);
        assert_eq!(rect.height, 3);
        assert!(rect.x + rect.width <= tiny.width);
    }
}
