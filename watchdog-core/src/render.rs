use crate::model::{LogEntry, LogId, LogSource};

/// One line in a log pane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayItem {
    /// The "nothing to show" line. Not an error.
    Sentinel(String),
    Record {
        id: LogId,
        /// `levelDisplayName` as sent by the server
        level: String,
        text: String,
        /// Set for stored-log items: the id a delete action targets
        delete_id: Option<LogId>,
    },
}

impl DisplayItem {
    pub fn text(&self) -> &str {
        match self {
            Self::Sentinel(text) => text,
            Self::Record { text, .. } => text,
        }
    }

    pub fn level(&self) -> Option<&str> {
        match self {
            Self::Sentinel(_) => None,
            Self::Record { level, .. } => Some(level),
        }
    }

    pub fn delete_id(&self) -> Option<LogId> {
        match self {
            Self::Sentinel(_) => None,
            Self::Record { delete_id, .. } => *delete_id,
        }
    }
}

/// Full contents of a log pane. Always non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayList {
    items: Vec<DisplayItem>,
}

impl DisplayList {
    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the list is the single sentinel line
    pub fn is_empty_state(&self) -> bool {
        matches!(self.items.as_slice(), [DisplayItem::Sentinel(_)])
    }

    /// Record ids in display order
    pub fn ids(&self) -> Vec<LogId> {
        self.items
            .iter()
            .filter_map(|item| match item {
                DisplayItem::Record { id, .. } => Some(*id),
                DisplayItem::Sentinel(_) => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.text()).collect()
    }
}

/// `ID: 7 - TIMESTAMP: [..] - TYPE: (Error) - MESSAGE: ..`
pub fn format_entry(entry: &LogEntry) -> String {
    format!(
        "ID: {} - TIMESTAMP: [{}] - TYPE: ({}) - MESSAGE: {}",
        entry.id, entry.time_created, entry.level_display_name, entry.message
    )
}

/// Build the display list for a log pane. Stored-log items carry a delete
/// target; an empty input yields a single sentinel line.
pub fn render(records: &[LogEntry], source: LogSource) -> DisplayList {
    if records.is_empty() {
        return DisplayList {
            items: vec![DisplayItem::Sentinel(source.empty_message().to_string())],
        };
    }

    let items = records
        .iter()
        .map(|entry| DisplayItem::Record {
            id: entry.id,
            level: entry.level_display_name.clone(),
            text: format_entry(entry),
            delete_id: match source {
                LogSource::Stored => Some(entry.id),
                LogSource::Live => None,
            },
        })
        .collect();

    DisplayList { items }
}

/// Initial pane contents before the first fetch lands
pub fn placeholder(source: LogSource) -> DisplayList {
    render(&[], source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: LogId, level: &str, message: &str) -> LogEntry {
        LogEntry {
            id,
            time_created: format!("2024-05-01T10:00:{:02}Z", id),
            level_display_name: level.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_empty_renders_single_sentinel() {
        for source in [LogSource::Live, LogSource::Stored] {
            let list = render(&[], source);
            assert_eq!(list.len(), 1);
            assert!(list.is_empty_state());
            assert_eq!(list.items()[0].text(), source.empty_message());
            assert_eq!(list.items()[0].delete_id(), None);
        }
    }

    #[test]
    fn test_render_keeps_input_order() {
        let records = vec![entry(9, "Error", "b"), entry(2, "Information", "a")];
        let list = render(&records, LogSource::Live);
        assert_eq!(list.ids(), vec![9, 2]);
        assert_eq!(
            list.texts(),
            vec![format_entry(&records[0]), format_entry(&records[1])]
        );
        assert_eq!(list.items()[0].level(), Some("Error"));
        assert!(!list.is_empty_state());
    }

    #[test]
    fn test_format_entry() {
        let text = format_entry(&entry(7, "Warning", "disk almost full"));
        assert_eq!(
            text,
            "ID: 7 - TIMESTAMP: [2024-05-01T10:00:07Z] - TYPE: (Warning) - MESSAGE: disk almost full"
        );
    }

    #[test]
    fn test_stored_items_carry_delete_target() {
        let records = vec![entry(3, "Error", "x"), entry(4, "Error", "y")];

        let stored = render(&records, LogSource::Stored);
        let targets: Vec<_> = stored.items().iter().map(|i| i.delete_id()).collect();
        assert_eq!(targets, vec![Some(3), Some(4)]);

        let live = render(&records, LogSource::Live);
        assert!(live.items().iter().all(|i| i.delete_id().is_none()));
    }

    #[test]
    fn test_render_is_idempotent() {
        let records = vec![entry(1, "Information", "a"), entry(2, "Error", "b")];
        assert_eq!(
            render(&records, LogSource::Stored),
            render(&records, LogSource::Stored)
        );
    }
}
