//! Authenticated HTTP client for the DAM API
//!
//! One `DamClient` per response representation: the JSON client decodes
//! API envelopes, the binary client returns image bytes. Both run every
//! request through `AuthInterceptor`, make a single attempt bounded by the
//! configured timeout, and log request/response metadata (never header
//! values).

use std::time::Instant;

use bytes::Bytes;
use dam_auth::TokenStore;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::interceptor::{AuthInterceptor, ClientKind};
use crate::metrics;

/// Raw bytes of a fetched asset rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

#[derive(Clone)]
pub struct DamClient {
    http: reqwest::Client,
    config: ApiConfig,
    interceptor: AuthInterceptor,
}

impl DamClient {
    pub fn new(config: ApiConfig, store: TokenStore, kind: ClientKind) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("building HTTP client: {e}")))?;
        let interceptor = AuthInterceptor::new(store, &config, kind)?;
        Ok(Self {
            http,
            config,
            interceptor,
        })
    }

    /// Client for JSON API calls.
    pub fn json(config: ApiConfig, store: TokenStore) -> Result<Self> {
        Self::new(config, store, ClientKind::Json)
    }

    /// Client for image bytes.
    pub fn binary(config: ApiConfig, store: TokenStore) -> Result<Self> {
        Self::new(config, store, ClientKind::Binary)
    }

    pub fn kind(&self) -> ClientKind {
        self.interceptor.kind()
    }

    /// GET `path` and decode the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| self.failed(Error::Network(format!("reading response body: {e}"))))?;
        serde_json::from_slice(&body)
            .map_err(|e| self.failed(Error::MalformedResponse(format!("{path}: {e}"))))
    }

    /// GET `url` (absolute or base-relative) as raw bytes.
    pub async fn get_bytes(&self, url: &str) -> Result<Blob> {
        let response = self.get(url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.failed(Error::Network(format!("reading image body: {e}"))))?;
        Ok(Blob {
            bytes,
            content_type,
        })
    }

    #[instrument(skip_all, fields(request_id, client = self.kind().label(), target = %target))]
    async fn get(&self, target: &str) -> Result<reqwest::Response> {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
        tracing::Span::current().record("request_id", request_id.as_str());

        // Credentials go only to the API origin or a configured media host.
        let url = self.config.resolve(target).map_err(|e| self.failed(e))?;
        let mut headers = HeaderMap::new();
        self.interceptor
            .before_request(&mut headers)
            .await
            .map_err(|e| self.failed(e))?;

        debug!(
            url = %url,
            headers = ?headers.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            "request sent"
        );

        let started = Instant::now();
        let response = match self.http.get(url.clone()).headers(headers).send().await {
            Ok(response) => response,
            Err(e) => {
                let err = if e.is_timeout() {
                    Error::Network(format!(
                        "timed out after {}ms: {e}",
                        self.config.timeout.as_millis()
                    ))
                } else {
                    Error::Network(e.to_string())
                };
                warn!(error = %err, "request failed");
                return Err(self.failed(err));
            }
        };

        let status = response.status();
        let elapsed = started.elapsed();
        metrics::record_request(self.kind().label(), status.as_u16(), elapsed.as_secs_f64());
        debug!(
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "response received"
        );

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            warn!(status = status.as_u16(), "error response");
            let err = self.interceptor.after_response(status, body).await;
            return Err(self.failed(err));
        }

        Ok(response)
    }

    fn failed(&self, err: Error) -> Error {
        metrics::record_failure(self.kind().label(), err.kind());
        err
    }
}
