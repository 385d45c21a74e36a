//! Signed HTTP transport for GS2 services
//!
//! `IdentifierClient` only describes calls as [`ApiRequest`] values; a [`Transport`]
//! turns them into authenticated HTTP round trips. [`HttpTransport`] is the
//! reqwest-backed implementation. It signs every request with the GSI
//! credentials and performs no retries.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use tracing::{debug, warn};

use crate::auth::Gs2Credentials;
use crate::config::ClientConfig;
use crate::error::TransportError;

pub const HEADER_CLIENT_ID: &str = "X-GS2-CLIENT-ID";
pub const HEADER_TIMESTAMP: &str = "X-GS2-REQUEST-TIMESTAMP";
pub const HEADER_SIGN: &str = "X-GS2-REQUEST-SIGN";

/// One REST call against a GS2 service
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Module name used for signing, e.g. `Gs2Identifier`
    pub module: &'static str,
    /// Action name used for signing, e.g. `GetUser`
    pub action: &'static str,
    pub method: Method,
    /// Service endpoint name, the first label of the host
    pub service: &'static str,
    /// Path segments, e.g. `["user", "alice"]`. Each one is sent as a single
    /// encoded segment, so a value containing `/` cannot reach another route.
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Unencoded path for logs and assertions, e.g. `/user/alice`
    pub fn path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the call and return the raw body of a 2xx response
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    credentials: Gs2Credentials,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(credentials: Gs2Credentials, config: ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("gs2-identifier-rust/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            credentials,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve the absolute URL; path segments and query values are percent-encoded.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        if let Some(bad) = request.path.iter().find(|s| s.is_empty() || *s == "." || *s == "..") {
            return Err(TransportError::Encode(format!("path segment {bad:?} cannot be sent")));
        }
        let base = self.config.endpoint_url(request.service);
        let mut url = Url::parse(&base)
            .map_err(|e| TransportError::Encode(format!("invalid endpoint {base}: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TransportError::Encode(format!("endpoint {base} cannot carry a path")))?;
            segments.pop_if_empty();
            // `/` and `%` inside a segment are encoded as %2F and %25
            segments.extend(request.path.iter());
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>, TransportError> {
        let url = self.url_for(&request)?;
        let timestamp = Utc::now().timestamp();
        let sign = self.credentials.sign(request.module, request.action, timestamp)?;

        let mut rb = self
            .client
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(HEADER_CLIENT_ID, self.credentials.client_id.as_str())
            .header(HEADER_TIMESTAMP, timestamp.to_string())
            .header(HEADER_SIGN, sign);
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| TransportError::Encode(e.to_string()))?;
            rb = rb.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        debug!(
            module = request.module,
            action = request.action,
            method = %request.method,
            path = %request.path(),
            "sending request"
        );
        let resp = rb.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();

        if !status.is_success() {
            let body_txt = String::from_utf8_lossy(&body).to_string();
            warn!(action = request.action, status = status.as_u16(), "request failed");
            return Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                body: body_txt,
            });
        }
        debug!(action = request.action, status = status.as_u16(), bytes = body.len(), "response received");
        Ok(body)
    }
}
