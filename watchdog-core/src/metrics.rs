//! Rolling windows backing the CPU / RAM / Disk charts
//!
//! Each window is a fixed-capacity FIFO of (time label, value) pairs. The
//! oldest point is dropped when an append would exceed capacity.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::model::MetricSample;

/// Points kept per chart
pub const DEFAULT_WINDOW_CAPACITY: usize = 30;

const LABEL_FORMAT: &str = "%H:%M:%S";

/// Top of the chart y-axis
pub const PERCENT_MAX: f64 = 100.0;

/// Fixed-capacity, append-only FIFO with a time label per value.
#[derive(Clone, Debug)]
pub struct RollingWindow<T> {
    cap: usize,
    labels: VecDeque<String>,
    values: VecDeque<T>,
}

impl<T: Clone> RollingWindow<T> {
    /// A capacity of 0 is raised to 1; a window always holds its latest value.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            labels: VecDeque::with_capacity(cap),
            values: VecDeque::with_capacity(cap),
        }
    }

    /// Append a value labelled with the current local time
    pub fn append(&mut self, value: T) {
        self.append_at(Local::now(), value);
    }

    /// Append a value labelled with the given capture time
    pub fn append_at(&mut self, at: DateTime<Local>, value: T) {
        self.append_labeled(at.format(LABEL_FORMAT).to_string(), value);
    }

    pub fn append_labeled(&mut self, label: impl Into<String>, value: T) {
        self.labels.push_back(label.into());
        self.values.push_back(value);
        if self.values.len() > self.cap {
            self.labels.pop_front();
            self.values.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Labels, oldest first, index-aligned with `values()`
    pub fn labels(&self) -> Vec<String> {
        self.labels.iter().cloned().collect()
    }

    /// Values, oldest first
    pub fn values(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<T> {
        self.values.back().cloned()
    }

    pub fn first_label(&self) -> Option<&str> {
        self.labels.front().map(|s| s.as_str())
    }

    pub fn last_label(&self) -> Option<&str> {
        self.labels.back().map(|s| s.as_str())
    }
}

impl RollingWindow<f64> {
    /// (slot, value) pairs for Chart rendering; slot 0 is the oldest point.
    /// Values are clamped to the fixed 0..100 axis. The stored values are not.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, v.clamp(0.0, PERCENT_MAX)))
            .collect()
    }

    /// Get min and max values in the window
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        let min_v = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max_v = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min_v, max_v))
    }
}

impl<T: Clone> Default for RollingWindow<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Cpu,
    Ram,
    Disk,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Cpu, MetricKind::Ram, MetricKind::Disk];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU Usage (%)",
            Self::Ram => "RAM Usage (%)",
            Self::Disk => "Disk Usage (%)",
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Ram => "RAM",
            Self::Disk => "DISK",
        }
    }
}

/// One rolling window per metric kind, fed by the metrics poller.
#[derive(Clone, Debug)]
pub struct MetricsState {
    pub cpu: RollingWindow<f64>,
    pub ram: RollingWindow<f64>,
    pub disk: RollingWindow<f64>,
    /// Samples received since startup
    pub samples: u64,
}

impl MetricsState {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            cpu: RollingWindow::new(cap),
            ram: RollingWindow::new(cap),
            disk: RollingWindow::new(cap),
            samples: 0,
        }
    }

    /// Append one sample to all three windows, labelled with its capture time
    pub fn push(&mut self, sample: MetricSample) {
        self.cpu.append_at(sample.timestamp, sample.cpu);
        self.ram.append_at(sample.timestamp, sample.ram);
        self.disk.append_at(sample.timestamp, sample.disk);
        self.samples += 1;
    }

    pub fn window(&self, kind: MetricKind) -> &RollingWindow<f64> {
        match kind {
            MetricKind::Cpu => &self.cpu,
            MetricKind::Ram => &self.ram,
            MetricKind::Disk => &self.disk,
        }
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}
