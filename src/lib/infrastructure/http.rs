//! HTTP transport

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::debug;

#[cfg(test)]
use mockall::mock;

use crate::domain::mail::TransportError;

/// An outgoing HTTP request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// The request method
    pub method: Method,

    /// The absolute request URL
    pub url: String,

    /// Request headers, in the order they are sent
    pub headers: Vec<(String, String)>,

    /// The request body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a `POST` request to `url` with no headers and an empty body
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Returns the first value of the header `name`, ignoring case
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response whose body has been read in full
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// The response status
    pub status: StatusCode,

    /// The response body
    pub body: Vec<u8>,
}

/// Sends HTTP requests
///
/// Timeouts and cancellation are the implementation's concern and must be
/// reported as a [`TransportError`].
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// Sends `request` and reads the whole response
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mock! {
    pub HttpTransport {}

    #[async_trait]
    impl HttpTransport for HttpTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
    }
}

/// [`HttpTransport`] backed by a pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests fail after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client })
    }

    /// Wraps an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self.client.request(request.method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();

        let body = response.bytes().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout(err.into())
            } else {
                TransportError::Body(err.into())
            }
        })?;

        debug!(%status, size = body.len(), "received response");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.into())
    } else if err.is_connect() {
        TransportError::Connect(err.into())
    } else {
        TransportError::Request(err.into())
    }
}
