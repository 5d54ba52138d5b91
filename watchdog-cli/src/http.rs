//! reqwest-backed transport for talking to a real Watchdog service

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use watchdog_core::client::{Method, Request, Response, Transport, TransportError};

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport. `timeout` applies to each whole request; `None`
    /// leaves reqwest's default (no timeout).
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("watchdog/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        trace!(method = %request.method, url = %request.url, "http request");

        let response = self
            .client
            .request(to_reqwest(request.method), &request.url)
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("reading body: {}", e)))?;

        Ok(Response { status, body })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest(Method::Post), reqwest::Method::POST);
        assert_eq!(to_reqwest(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn test_builds_with_and_without_timeout() {
        assert!(HttpTransport::new(None).is_ok());
        let transport = HttpTransport::new(Some(Duration::from_secs(3))).unwrap();
        assert_eq!(transport.name(), "http");
    }
}
