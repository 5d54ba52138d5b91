use watchdog_core::model::{LogQuery, LogSource};

use super::{Session, print_list};

/// Print one fetch of live or stored logs, optionally narrowed by a query.
/// An unreachable service prints the same "nothing found" line as an empty
/// collection.
pub async fn run_logs(session: &Session, source: LogSource, query: Option<LogQuery>) -> Result<(), String> {
    let view = session.dashboard.view(source);
    match query {
        Some(query) => view.run_query(query).await,
        None => view.refresh().await,
    }
    let snapshot = session.slot(source).snapshot().await;
    print_list(&snapshot.list);
    Ok(())
}
