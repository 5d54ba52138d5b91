//! Log view controllers
//!
//! A `LogView` owns one pane's live/override state and writes full
//! replacements into an injected `RenderTarget`. Periodic refreshes and user
//! searches share the same target; whichever render lands last is what the
//! pane shows. In-flight requests are never cancelled or sequenced, so a slow
//! earlier request can overwrite a newer result.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::client::RemoteClient;
use crate::model::{LogEntry, LogQuery, LogSource, QueryKind, Resource};
use crate::render::{self, DisplayList};

/// What a log pane is currently showing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ViewState {
    /// Result of the most recent periodic refresh
    #[default]
    Live,
    /// Result of a user search, until the next refresh replaces it
    Override(LogQuery),
}

impl ViewState {
    pub fn label(&self) -> String {
        match self {
            Self::Live => "live".to_string(),
            Self::Override(query) => format!("search: {}", query.label()),
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, Self::Override(_))
    }
}

/// A complete pane update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewUpdate {
    pub state: ViewState,
    pub list: DisplayList,
}

/// Injected display surface for one pane.
#[async_trait]
pub trait RenderTarget: Send + Sync {
    /// Replace the pane contents
    async fn present(&self, update: ViewUpdate);
}

/// What a `ViewSlot` holds.
#[derive(Clone, Debug)]
pub struct ViewSnapshot {
    pub state: ViewState,
    pub list: DisplayList,
    /// Number of renders written so far
    pub generation: u64,
    pub updated_at: Option<SystemTime>,
}

/// Single mutable slot holding a pane's last render. Cheap to clone; clones
/// share the slot.
#[derive(Clone)]
pub struct ViewSlot {
    inner: Arc<RwLock<ViewSnapshot>>,
}

impl ViewSlot {
    pub fn new(source: LogSource) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ViewSnapshot {
                state: ViewState::Live,
                list: render::placeholder(source),
                generation: 0,
                updated_at: None,
            })),
        }
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl RenderTarget for ViewSlot {
    async fn present(&self, update: ViewUpdate) {
        let mut slot = self.inner.write().await;
        slot.state = update.state;
        slot.list = update.list;
        slot.generation += 1;
        slot.updated_at = Some(SystemTime::now());
    }
}

pub struct LogView {
    source: LogSource,
    client: Arc<RemoteClient>,
    target: Arc<dyn RenderTarget>,
    state: Mutex<ViewState>,
}

impl LogView {
    pub fn new(source: LogSource, client: Arc<RemoteClient>, target: Arc<dyn RenderTarget>) -> Self {
        Self {
            source,
            client,
            target,
            state: Mutex::new(ViewState::Live),
        }
    }

    pub fn source(&self) -> LogSource {
        self.source
    }

    pub async fn state(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    /// Fetch the full collection and render it. This is the periodic tick and
    /// also the out-of-band refresh after a delete. Returns the view to `Live`.
    pub async fn refresh(&self) {
        let records: Vec<LogEntry> = self
            .client
            .fetch_collection(&Resource::Logs(self.source))
            .await;
        debug!(view = self.source.label(), count = records.len(), "refresh");
        self.show(ViewState::Live, &records).await;
    }

    /// Run a user search and render its result over the live contents. A
    /// failed or empty search renders the empty state. Polling is untouched;
    /// the next refresh replaces this result.
    pub async fn run_query(&self, query: LogQuery) {
        let resource = Resource::Lookup(self.source, query.clone());
        let records: Vec<LogEntry> = match query.kind() {
            QueryKind::Id => self
                .client
                .fetch_one::<LogEntry>(&resource)
                .await
                .into_iter()
                .collect(),
            QueryKind::Type => self.client.fetch_collection(&resource).await,
        };
        debug!(
            view = self.source.label(),
            query = %query.label(),
            count = records.len(),
            "search"
        );
        self.show(ViewState::Override(query), &records).await;
    }

    /// The state lock is held across `present` so the controller's state
    /// and the target's last render are always written in the same order.
    async fn show(&self, state: ViewState, records: &[LogEntry]) {
        let list = render::render(records, self.source);
        let mut current = self.state.lock().await;
        *current = state.clone();
        self.target.present(ViewUpdate { state, list }).await;
    }
}
