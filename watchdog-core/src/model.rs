use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub type LogId = i64;

/// A log record as served by `/logs/...` endpoints.
///
/// `time_created` is kept verbatim; it is only ever displayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: LogId,
    pub time_created: String,
    pub level_display_name: String,
    pub message: String,
}

/// Body of `/metrics/current`. Unknown fields (the server also sends its own
/// timestamp) are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsReading {
    pub cpu_usage: f64,
    pub ram_usage: f64,
    pub disk_usage: f64,
}

/// One metrics poll, stamped with the time it was received.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricSample {
    pub timestamp: DateTime<Local>,
    pub cpu: f64,
    pub ram: f64,
    pub disk: f64,
}

impl MetricSample {
    pub fn from_reading(reading: MetricsReading, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            cpu: reading.cpu_usage,
            ram: reading.ram_usage,
            disk: reading.disk_usage,
        }
    }
}

/// Which of the two log collections a view or request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogSource {
    /// Events read straight from the host log
    Live,
    /// Records persisted server-side by explicit user action
    Stored,
}

impl LogSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Live => "Logs",
            Self::Stored => "Stored Logs",
        }
    }

    /// Text shown when the view has nothing to display
    pub fn empty_message(&self) -> &'static str {
        match self {
            Self::Live => "No logs found.",
            Self::Stored => "No stored logs found.",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Live => "/logs",
            Self::Stored => "/logs/stored",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Id,
    Type,
}

impl QueryKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Type => "type",
        }
    }
}

/// A user-supplied lookup key: a log id or a log type.
///
/// Used both for searches and for "save to stored logs" requests. The key is
/// trimmed and never blank.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogQuery {
    kind: QueryKind,
    key: String,
}

impl LogQuery {
    /// Returns `None` for blank input, mirroring the dashboard ignoring empty
    /// search/save boxes.
    pub fn new(kind: QueryKind, input: &str) -> Option<Self> {
        let key = input.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            key: key.to_string(),
        })
    }

    pub fn by_id(input: &str) -> Option<Self> {
        Self::new(QueryKind::Id, input)
    }

    pub fn by_type(input: &str) -> Option<Self> {
        Self::new(QueryKind::Type, input)
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.kind.label(), self.key)
    }
}

/// An addressable thing on the remote service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// `/logs/` or `/logs/stored`
    Logs(LogSource),
    /// `/logs[/stored]/id/{id}` or `/logs[/stored]/type/{type}`
    Lookup(LogSource, LogQuery),
    /// `/logs/stored/id/{id}` addressed by a known record id
    StoredRecord(LogId),
    /// `/metrics/current`
    CurrentMetrics,
}

impl Resource {
    pub fn path(&self) -> String {
        match self {
            // The live listing is mounted at a trailing-slash route.
            Self::Logs(LogSource::Live) => "/logs/".to_string(),
            Self::Logs(LogSource::Stored) => "/logs/stored".to_string(),
            Self::Lookup(source, query) => format!(
                "{}/{}/{}",
                source.prefix(),
                query.kind().label(),
                urlencoding::encode(query.key())
            ),
            Self::StoredRecord(id) => format!("/logs/stored/id/{}", id),
            Self::CurrentMetrics => "/metrics/current".to_string(),
        }
    }
}
