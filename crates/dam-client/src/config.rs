//! DAM API connection settings

use std::time::Duration;

use common::Secret;
use url::Url;

use crate::error::{Error, Result};

/// Default `x-mv-api-version` header value
pub const DEFAULT_API_VERSION: &str = "1.1";

/// Default per-request timeout (single attempt, no retry)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// DAM API root; relative request paths are joined onto it
    pub base_url: String,
    pub api_version: String,
    /// Sent as `Ocp-Apim-Subscription-Key` when present
    pub subscription_key: Option<Secret<String>>,
    pub timeout: Duration,
    /// Extra hosts (`host` or `host:port`) that serve asset renditions.
    /// Absolute URLs anywhere else never receive credentials.
    pub media_hosts: Vec<String>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            subscription_key: None,
            timeout: DEFAULT_TIMEOUT,
            media_hosts: Vec::new(),
        }
    }

    /// Resolve a request target. Relative targets are joined onto
    /// `base_url`; absolute ones must be http(s) on the API origin or a
    /// configured media host.
    pub fn resolve(&self, target: &str) -> Result<Url> {
        if !target.contains("://") {
            let joined = format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                target.trim_start_matches('/')
            );
            return Url::parse(&joined)
                .map_err(|e| Error::Config(format!("invalid base_url {:?}: {e}", self.base_url)));
        }

        let url = Url::parse(target)
            .map_err(|e| Error::InvalidRequest(format!("invalid URL {target:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidRequest(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }
        if !self.is_trusted(&url) {
            return Err(Error::InvalidRequest(format!(
                "host {} is not the DAM API or a media host",
                url.host_str().unwrap_or("<none>")
            )));
        }
        Ok(url)
    }

    fn is_trusted(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if let Ok(base) = Url::parse(&self.base_url) {
            if base.scheme() == url.scheme()
                && base.host_str() == Some(host)
                && base.port_or_known_default() == url.port_or_known_default()
            {
                return true;
            }
        }
        let with_port = url.port().map(|port| format!("{host}:{port}"));
        self.media_hosts.iter().any(|allowed| {
            allowed.eq_ignore_ascii_case(host)
                || with_port
                    .as_deref()
                    .is_some_and(|hp| allowed.eq_ignore_ascii_case(hp))
        })
    }
}
