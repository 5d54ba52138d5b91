use watchdog_core::client::MutationOutcome;
use watchdog_core::model::{LogId, LogQuery, LogSource};

use super::{Session, print_list};

/// Save a live log (by id) or all live logs of a type into stored logs.
/// The outcome notice is printed by the session's notifier.
pub async fn run_save(session: &Session, query: LogQuery) -> MutationOutcome {
    session.dashboard.mutations().create(&query).await
}

/// Delete a stored log and print what remains.
pub async fn run_delete(session: &Session, id: LogId) -> MutationOutcome {
    let outcome = session.dashboard.mutations().delete(id).await;
    if outcome.is_success() {
        println!("Deleted stored log {}.", id);
        print_list(&session.slot(LogSource::Stored).snapshot().await.list);
    }
    outcome
}
