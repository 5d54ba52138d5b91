//! Periodic refresh
//!
//! Each data stream runs as its own repeating task on a fixed interval. The
//! first tick fires immediately so panes fill without waiting a full period.
//! A tick never fails: the client has already folded errors into empty
//! results, so a bad tick renders the empty state and the next one runs on
//! schedule.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::client::RemoteClient;
use crate::metrics::MetricsState;
use crate::model::{LogSource, MetricSample, MetricsReading, Resource};
use crate::view::LogView;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Logs,
    StoredLogs,
    Metrics,
}

impl StreamKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Logs => "logs",
            Self::StoredLogs => "stored-logs",
            Self::Metrics => "metrics",
        }
    }
}

/// One refresh cycle of a stream.
#[async_trait]
pub trait PollTask: Send + Sync {
    fn stream(&self) -> StreamKind;

    /// Fetch and render once. Must not panic on remote failure.
    async fn tick(&self);
}

#[async_trait]
impl PollTask for LogView {
    fn stream(&self) -> StreamKind {
        match self.source() {
            LogSource::Live => StreamKind::Logs,
            LogSource::Stored => StreamKind::StoredLogs,
        }
    }

    async fn tick(&self) {
        self.refresh().await;
    }
}

/// Feeds `/metrics/current` into the three rolling windows. A failed poll
/// appends nothing.
pub struct MetricsPoller {
    client: Arc<RemoteClient>,
    state: Arc<RwLock<MetricsState>>,
}

impl MetricsPoller {
    pub fn new(client: Arc<RemoteClient>, state: Arc<RwLock<MetricsState>>) -> Self {
        Self { client, state }
    }
}

#[async_trait]
impl PollTask for MetricsPoller {
    fn stream(&self) -> StreamKind {
        StreamKind::Metrics
    }

    async fn tick(&self) {
        let Some(reading) = self
            .client
            .fetch_one::<MetricsReading>(&Resource::CurrentMetrics)
            .await
        else {
            return;
        };
        let sample = MetricSample::from_reading(reading, Local::now());
        debug!(cpu = sample.cpu, ram = sample.ram, disk = sample.disk, "metrics sample");
        self.state.write().await.push(sample);
    }
}

/// Stable handle to a running stream. Stopping it ends future ticks; a tick
/// already awaiting the network is dropped with the task.
pub struct PollHandle {
    stream: StreamKind,
    interval: Duration,
    ticks: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Completed ticks so far
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

/// Spawn a repeating task that calls `task.tick()` every `interval`, starting
/// now. Ticks that overrun the interval cause missed ticks to be skipped
/// rather than fired in a burst.
pub fn spawn_poller(task: Arc<dyn PollTask>, interval: Duration) -> PollHandle {
    let stream = task.stream();
    let ticks = Arc::new(AtomicU64::new(0));
    let counter = ticks.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            task.tick().await;
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    info!(stream = stream.label(), interval_ms = interval.as_millis() as u64, "poller started");

    PollHandle {
        stream,
        interval,
        ticks,
        task: handle,
    }
}

/// Owns every running stream. Dropping the scheduler stops them all.
#[derive(Default)]
pub struct PollScheduler {
    handles: Vec<PollHandle>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, task: Arc<dyn PollTask>, interval: Duration) {
        self.handles.push(spawn_poller(task, interval));
    }

    pub fn handle(&self, stream: StreamKind) -> Option<&PollHandle> {
        self.handles.iter().find(|h| h.stream() == stream)
    }

    pub fn handles(&self) -> &[PollHandle] {
        &self.handles
    }

    pub fn stop_all(&mut self) {
        for handle in self.handles.drain(..) {
            info!(stream = handle.stream().label(), ticks = handle.ticks(), "poller stopped");
            handle.stop();
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.stop();
        }
    }
}
