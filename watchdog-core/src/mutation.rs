//! Create/delete of stored logs
//!
//! A successful delete refreshes the stored view at once instead of waiting
//! for its next tick. A successful save does not; the stored view picks the
//! new records up on its next tick.

use std::sync::Arc;

use tracing::info;

use crate::client::{Method, MutationOutcome, RemoteClient};
use crate::model::{LogId, LogQuery, LogSource, QueryKind, Resource};
use crate::notice::{Notice, Notifier};
use crate::view::LogView;

pub struct MutationCoordinator {
    client: Arc<RemoteClient>,
    stored: Arc<LogView>,
    notifier: Arc<dyn Notifier>,
}

impl MutationCoordinator {
    pub fn new(client: Arc<RemoteClient>, stored: Arc<LogView>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            stored,
            notifier,
        }
    }

    /// Persist a live log by id, or every live log of a type, into the
    /// stored collection.
    pub async fn create(&self, target: &LogQuery) -> MutationOutcome {
        let resource = Resource::Lookup(LogSource::Stored, target.clone());
        let outcome = self.client.mutate(Method::Post, &resource).await;

        let notice = match (target.kind(), outcome) {
            (QueryKind::Id, MutationOutcome::Success) => Notice::info("Log saved!"),
            (QueryKind::Type, MutationOutcome::Success) => Notice::info("Logs by type saved!"),
            (QueryKind::Id, MutationOutcome::Failure) => Notice::error("Error saving log"),
            (QueryKind::Type, MutationOutcome::Failure) => {
                Notice::error("Error saving logs by type")
            }
        };
        if outcome.is_success() {
            info!(query = %target.label(), "saved to stored logs");
        }
        self.notifier.notify(notice).await;
        outcome
    }

    /// Delete a stored log. On success the stored view is refreshed before
    /// this returns.
    pub async fn delete(&self, id: LogId) -> MutationOutcome {
        let outcome = self
            .client
            .mutate(Method::Delete, &Resource::StoredRecord(id))
            .await;

        match outcome {
            MutationOutcome::Success => {
                info!(id, "stored log deleted");
                self.stored.refresh().await;
            }
            MutationOutcome::Failure => {
                self.notifier.notify(Notice::error("Error deleting log")).await;
            }
        }
        outcome
    }
}
