//! One-shot subcommands
//!
//! Each command builds a `Dashboard` without starting its pollers and drives
//! the pieces it needs once.

mod logs;
mod metrics;
mod stored;

use std::sync::Arc;

use async_trait::async_trait;

use watchdog_core::client::Transport;
use watchdog_core::config::DashboardConfig;
use watchdog_core::dashboard::{Dashboard, Surfaces};
use watchdog_core::model::{LogQuery, LogSource, QueryKind};
use watchdog_core::notice::{Notice, Notifier};
use watchdog_core::render::DisplayList;
use watchdog_core::view::ViewSlot;

pub use logs::run_logs;
pub use metrics::run_metrics;
pub use stored::{run_delete, run_save};

/// Notices go to stdout, errors to stderr
struct PrintNotifier;

#[async_trait]
impl Notifier for PrintNotifier {
    async fn notify(&self, notice: Notice) {
        if notice.is_error() {
            eprintln!("{}", notice.message);
        } else {
            println!("{}", notice.message);
        }
    }
}

pub struct Session {
    dashboard: Dashboard,
    live: ViewSlot,
    stored: ViewSlot,
}

impl Session {
    pub fn new(config: DashboardConfig, transport: Arc<dyn Transport>) -> Self {
        let live = ViewSlot::new(LogSource::Live);
        let stored = ViewSlot::new(LogSource::Stored);
        let dashboard = Dashboard::new(
            config,
            transport,
            Surfaces {
                live: Arc::new(live.clone()),
                stored: Arc::new(stored.clone()),
                notifier: Arc::new(PrintNotifier),
            },
        );
        Self {
            dashboard,
            live,
            stored,
        }
    }

    fn slot(&self, source: LogSource) -> &ViewSlot {
        match source {
            LogSource::Live => &self.live,
            LogSource::Stored => &self.stored,
        }
    }
}

/// Build a query from `--id` / `--type`. `Ok(None)` when neither was given.
pub fn query_from_args(id: Option<String>, log_type: Option<String>) -> Result<Option<LogQuery>, String> {
    let (kind, input) = match (id, log_type) {
        (Some(id), None) => (QueryKind::Id, id),
        (None, Some(log_type)) => (QueryKind::Type, log_type),
        (None, None) => return Ok(None),
        (Some(_), Some(_)) => return Err("--id and --type cannot be used together".into()),
    };
    LogQuery::new(kind, &input)
        .map(Some)
        .ok_or_else(|| format!("log {} must not be blank", kind.label()))
}

fn print_list(list: &DisplayList) {
    for item in list.items() {
        println!("{}", item.text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_args() {
        assert_eq!(query_from_args(None, None), Ok(None));
        assert_eq!(
            query_from_args(Some(" 7 ".into()), None),
            Ok(LogQuery::by_id("7"))
        );
        assert_eq!(
            query_from_args(None, Some("Error".into())),
            Ok(LogQuery::by_type("Error"))
        );
        assert_eq!(
            query_from_args(None, Some("   ".into())),
            Err("log type must not be blank".to_string())
        );
        assert!(query_from_args(Some("1".into()), Some("Error".into())).is_err());
    }
}
