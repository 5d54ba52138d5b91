//! One dashboard session: a shared client, two log views, the metric
//! windows, the mutation coordinator, and the pollers that keep them fresh.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::client::{RemoteClient, Transport};
use crate::config::DashboardConfig;
use crate::metrics::MetricsState;
use crate::model::LogSource;
use crate::mutation::MutationCoordinator;
use crate::notice::Notifier;
use crate::poll::{MetricsPoller, PollScheduler};
use crate::view::{LogView, RenderTarget};

/// Render targets and notice sink supplied by the front end.
pub struct Surfaces {
    pub live: Arc<dyn RenderTarget>,
    pub stored: Arc<dyn RenderTarget>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct Dashboard {
    config: DashboardConfig,
    client: Arc<RemoteClient>,
    live: Arc<LogView>,
    stored: Arc<LogView>,
    metrics: Arc<RwLock<MetricsState>>,
    mutations: Arc<MutationCoordinator>,
    scheduler: PollScheduler,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, transport: Arc<dyn Transport>, surfaces: Surfaces) -> Self {
        let client = Arc::new(RemoteClient::new(config.base_url.clone(), transport));
        let live = Arc::new(LogView::new(LogSource::Live, client.clone(), surfaces.live));
        let stored = Arc::new(LogView::new(LogSource::Stored, client.clone(), surfaces.stored));
        let metrics = Arc::new(RwLock::new(MetricsState::with_capacity(config.window_capacity)));
        let mutations = Arc::new(MutationCoordinator::new(
            client.clone(),
            stored.clone(),
            surfaces.notifier,
        ));

        Self {
            config,
            client,
            live,
            stored,
            metrics,
            mutations,
            scheduler: PollScheduler::new(),
        }
    }

    /// Spawn the three pollers. Each runs its first tick immediately. Calling
    /// this twice does not start duplicate streams.
    pub fn start(&mut self) {
        if !self.scheduler.handles().is_empty() {
            return;
        }
        info!(
            base_url = self.client.base_url(),
            transport = self.client.transport_name(),
            "starting dashboard"
        );
        let poll = &self.config.poll;
        self.scheduler.spawn(self.live.clone(), poll.logs_interval());
        self.scheduler.spawn(self.stored.clone(), poll.stored_interval());
        self.scheduler.spawn(
            Arc::new(MetricsPoller::new(self.client.clone(), self.metrics.clone())),
            poll.metrics_interval(),
        );
    }

    pub fn stop(&mut self) {
        self.scheduler.stop_all();
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<RemoteClient> {
        &self.client
    }

    pub fn view(&self, source: LogSource) -> &Arc<LogView> {
        match source {
            LogSource::Live => &self.live,
            LogSource::Stored => &self.stored,
        }
    }

    pub fn metrics(&self) -> &Arc<RwLock<MetricsState>> {
        &self.metrics
    }

    pub fn mutations(&self) -> &Arc<MutationCoordinator> {
        &self.mutations
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }
}
