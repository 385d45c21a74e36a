use std::env;
use std::time::Duration;

pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// Connection settings for the identifier service
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub region: String,
    /// Base URL override (e.g. a local stand-in). When unset the URL is derived from service and region.
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    /// Read GS2_REGION, GS2_ENDPOINT and GS2_TIMEOUT_SECS. Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let region = env::var("GS2_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
        let endpoint = env::var("GS2_ENDPOINT").ok().filter(|e| !e.trim().is_empty());
        let timeout = env::var("GS2_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        Self { region, endpoint, timeout }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base URL for a service, without a trailing slash
    pub fn endpoint_url(&self, service: &str) -> String {
        match &self.endpoint {
            Some(e) => e.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}.gs2io.com", service, self.region),
        }
    }
}
