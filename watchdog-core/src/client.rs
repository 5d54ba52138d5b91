//! Remote client for the Watchdog log/metrics service
//!
//! Every request outcome is folded into a plain value before it leaves this
//! module: list calls yield an empty `Vec`, point lookups yield `None`, and
//! mutations yield `MutationOutcome::Failure`. The failure kind is only kept
//! for logging.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::model::Resource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request as handed to the transport. `url` is absolute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
}

/// A raw response: status code and undecoded body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The transport could not produce a response at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError {
    pub reason: String,
}

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: {}", self.reason)
    }
}

impl std::error::Error for TransportError {}

/// Pluggable HTTP-ish backend.
///
/// - `HttpTransport` (in the CLI crate): real requests via reqwest
/// - `ScriptedTransport` (tests): canned responses, records every request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single request. Any status code is a successful transport
    /// round trip; only "no response" is an `Err`.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;

    /// Get the name of this transport implementation
    fn name(&self) -> &'static str;
}

/// Why a request produced no usable data. Never returned to callers outside
/// this module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    /// Unreachable service or non-2xx status other than 404
    Transport { reason: String },
    /// Explicit absence (404)
    NotFound,
    /// Body did not decode into the expected shape
    Malformed { reason: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { reason } => write!(f, "transport failure: {}", reason),
            Self::NotFound => write!(f, "not found"),
            Self::Malformed { reason } => write!(f, "malformed response: {}", reason),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<TransportError> for FetchError {
    fn from(e: TransportError) -> Self {
        FetchError::Transport { reason: e.reason }
    }
}

/// Result of a create/delete request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Success,
    Failure,
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

pub struct RemoteClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl RemoteClient {
    /// A trailing `/` on `base_url` is dropped; resource paths carry their own.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    pub fn url_for(&self, resource: &Resource) -> String {
        format!("{}{}", self.base_url, resource.path())
    }

    async fn exchange(&self, method: Method, resource: &Resource) -> Result<Response, FetchError> {
        let request = Request {
            method,
            url: self.url_for(resource),
        };
        let response = self.transport.send(request).await?;
        match response.status {
            s if (200..300).contains(&s) => Ok(response),
            404 => Err(FetchError::NotFound),
            s => Err(FetchError::Transport {
                reason: format!("HTTP {}", s),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &Resource) -> Result<T, FetchError> {
        let response = self.exchange(Method::Get, resource).await?;
        serde_json::from_str(&response.body).map_err(|e| FetchError::Malformed {
            reason: e.to_string(),
        })
    }

    /// List a collection. Failure of any kind yields an empty `Vec`.
    pub async fn fetch_collection<T: DeserializeOwned>(&self, resource: &Resource) -> Vec<T> {
        match self.get_json::<Vec<T>>(resource).await {
            Ok(items) => {
                debug!(path = %resource.path(), count = items.len(), "fetched collection");
                items
            }
            Err(e) => {
                warn!(path = %resource.path(), error = %e, "collection fetch folded to empty");
                Vec::new()
            }
        }
    }

    /// Fetch a single record. Failure of any kind yields `None`.
    pub async fn fetch_one<T: DeserializeOwned>(&self, resource: &Resource) -> Option<T> {
        match self.get_json::<T>(resource).await {
            Ok(item) => Some(item),
            Err(FetchError::NotFound) => {
                debug!(path = %resource.path(), "record not found");
                None
            }
            Err(e) => {
                warn!(path = %resource.path(), error = %e, "record fetch folded to none");
                None
            }
        }
    }

    /// Issue a write. Only a 2xx status counts as success; the body is ignored.
    pub async fn mutate(&self, method: Method, resource: &Resource) -> MutationOutcome {
        match self.exchange(method, resource).await {
            Ok(_) => MutationOutcome::Success,
            Err(e) => {
                warn!(%method, path = %resource.path(), error = %e, "mutation failed");
                MutationOutcome::Failure
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport for exercising the engine without a server.

    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    pub const BASE: &str = "http://watchdog.test";

    #[derive(Clone, Debug)]
    pub enum Scripted {
        Respond(Response),
        Fail(String),
        /// Respond after a delay (use with paused tokio time)
        Delayed(Duration, Response),
    }

    impl Scripted {
        pub fn ok(body: impl Into<String>) -> Self {
            Scripted::Respond(Response {
                status: 200,
                body: body.into(),
            })
        }

        pub fn status(status: u16) -> Self {
            Scripted::Respond(Response {
                status,
                body: String::new(),
            })
        }

        pub fn down() -> Self {
            Scripted::Fail("connection refused".into())
        }
    }

    /// Responses are keyed by `(method, path)`. Each key holds a queue; the
    /// last entry is sticky so a route keeps answering once the queue drains.
    /// Unscripted routes answer like an unreachable server.
    #[derive(Default)]
    pub struct ScriptedTransport {
        routes: Mutex<BTreeMap<(String, String), VecDeque<Scripted>>>,
        log: Mutex<Vec<Request>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn script(&self, method: Method, path: &str, response: Scripted) {
            self.routes
                .lock()
                .unwrap()
                .entry((method.to_string(), path.to_string()))
                .or_default()
                .push_back(response);
        }

        pub fn requests(&self) -> Vec<Request> {
            self.log.lock().unwrap().clone()
        }

        pub fn count(&self, method: Method, path: &str) -> usize {
            let url = format!("{}{}", BASE, path);
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.method == method && r.url == url)
                .count()
        }

        fn next(&self, request: &Request) -> Scripted {
            let path = request.url.trim_start_matches(BASE).to_string();
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(request.method.to_string(), path)) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) if !queue.is_empty() => queue[0].clone(),
                _ => Scripted::down(),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: Request) -> Result<Response, TransportError> {
            self.log.lock().unwrap().push(request.clone());
            match self.next(&request) {
                Scripted::Respond(response) => Ok(response),
                Scripted::Fail(reason) => Err(TransportError::new(reason)),
                Scripted::Delayed(delay, response) => {
                    tokio::time::sleep(delay).await;
                    Ok(response)
                }
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    pub fn client(transport: &Arc<ScriptedTransport>) -> Arc<RemoteClient> {
        Arc::new(RemoteClient::new(BASE, transport.clone()))
    }

    pub fn entry_json(id: i64, level: &str, message: &str) -> String {
        format!(
            r#"{{"id":{},"timeCreated":"2024-05-01T10:00:{:02}Z","levelDisplayName":"{}","message":"{}"}}"#,
            id,
            id % 60,
            level,
            message
        )
    }

    pub fn entries_json(entries: &[(i64, &str, &str)]) -> String {
        let items: Vec<String> = entries
            .iter()
            .map(|(id, level, message)| entry_json(*id, level, message))
            .collect();
        format!("[{}]", items.join(","))
    }
}
