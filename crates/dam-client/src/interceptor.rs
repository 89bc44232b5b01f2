//! Request and response interception for DAM calls
//!
//! Before a request: resolve the current token and attach
//! `Authorization: Bearer`, the subscription key, the API version and (for
//! the JSON client) JSON content headers. A missing, expired or unparsable
//! token aborts the request and invalidates the store instead.
//!
//! After a response: 401 invalidates the store. Nothing is retried.

use dam_auth::{InvalidationCause, TokenStore};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

pub const API_VERSION_HEADER: &str = "x-mv-api-version";
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Which response representation a client is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// API calls with JSON bodies
    Json,
    /// Raw image bytes
    Binary,
}

impl ClientKind {
    pub fn label(&self) -> &'static str {
        match self {
            ClientKind::Json => "json",
            ClientKind::Binary => "binary",
        }
    }
}

/// Attaches credentials to outbound requests and reacts to 401s.
#[derive(Clone)]
pub struct AuthInterceptor {
    store: TokenStore,
    kind: ClientKind,
    static_headers: Vec<(HeaderName, HeaderValue)>,
}

impl AuthInterceptor {
    /// Build the interceptor, validating static header values once.
    ///
    /// An unusable subscription key is skipped with a warning rather than
    /// failing every request.
    pub fn new(store: TokenStore, config: &ApiConfig, kind: ClientKind) -> Result<Self> {
        let mut static_headers = Vec::new();

        let version = HeaderValue::from_str(&config.api_version)
            .map_err(|e| Error::Config(format!("invalid api_version: {e}")))?;
        static_headers.push((HeaderName::from_static(API_VERSION_HEADER), version));

        if kind == ClientKind::Json {
            static_headers.push((CONTENT_TYPE, HeaderValue::from_static("application/json")));
            static_headers.push((ACCEPT, HeaderValue::from_static("application/json")));
        }

        if let Some(key) = &config.subscription_key {
            match HeaderValue::from_str(key.expose()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    static_headers.push((
                        HeaderName::from_static("ocp-apim-subscription-key"),
                        value,
                    ));
                }
                Err(e) => {
                    warn!(header = SUBSCRIPTION_KEY_HEADER, error = %e, "skipping invalid subscription key");
                }
            }
        }

        Ok(Self {
            store,
            kind,
            static_headers,
        })
    }

    pub fn kind(&self) -> ClientKind {
        self.kind
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Populate `headers` for an outbound request, or abort it.
    pub async fn before_request(&self, headers: &mut HeaderMap) -> Result<()> {
        let token = match self.store.current_token().await {
            Ok(token) => token,
            Err(e) => {
                let cause = match e {
                    dam_auth::Error::Expired { .. } => InvalidationCause::Expired,
                    dam_auth::Error::MalformedToken(_) => InvalidationCause::Malformed,
                    _ => InvalidationCause::Missing,
                };
                warn!(error = %e, client = self.kind.label(), "no usable token, request not sent");
                self.store.invalidate(cause).await;
                return Err(Error::SessionInvalidated(cause));
            }
        };

        for (name, value) in &self.static_headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut bearer = match HeaderValue::from_str(&format!("Bearer {}", token.token)) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "stored token is not a valid header value");
                self.store.invalidate(InvalidationCause::Malformed).await;
                return Err(Error::SessionInvalidated(InvalidationCause::Malformed));
            }
        };
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        Ok(())
    }

    /// Turn a non-success response into its error. 401 also invalidates
    /// the session; other statuses are reported unchanged.
    pub async fn after_response(&self, status: StatusCode, body: String) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            warn!(client = self.kind.label(), "unauthorized, token might be expired");
            self.store.invalidate(InvalidationCause::Unauthorized).await;
            return Error::Unauthorized(body);
        }
        Error::Status {
            status: status.as_u16(),
            body,
        }
    }
}
