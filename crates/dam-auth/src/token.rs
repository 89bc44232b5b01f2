//! Authorization-code exchange against the provider's token endpoint
//!
//! The body is form-encoded and carries the client secret (confidential
//! client, no PKCE). A response only counts as a success when it carries
//! both `access_token` and `expires_in`.

use serde::Deserialize;
use tracing::debug;

use crate::config::AuthConfig;
use crate::constants::GRANT_TYPE;
use crate::error::{Error, Result};

/// Validated token endpoint response.
///
/// `expires_in` is a delta in seconds from the response time.
#[derive(Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: Option<String>,
}

/// Wire shape before validation; every field may be absent.
#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
}

impl TryFrom<RawTokenResponse> for TokenResponse {
    type Error = Error;

    fn try_from(raw: RawTokenResponse) -> Result<Self> {
        let access_token = raw
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::AuthExchange("response has no access_token".into()))?;
        let expires_in = raw
            .expires_in
            .ok_or_else(|| Error::AuthExchange("response has no expires_in".into()))?;
        Ok(Self {
            access_token,
            expires_in,
            token_type: raw.token_type,
        })
    }
}

/// Exchange an authorization code for an access token.
///
/// Single attempt. Transport failures map to `Error::Http`; a non-2xx status
/// or an incomplete body maps to `Error::AuthExchange`.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &AuthConfig,
    code: &str,
) -> Result<TokenResponse> {
    if code.trim().is_empty() {
        return Err(Error::AuthExchange("authorization code is empty".into()));
    }

    let token_url = config.token_url();
    debug!(url = %token_url, "exchanging authorization code");

    let response = client
        .post(&token_url)
        .form(&[
            ("grant_type", GRANT_TYPE),
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose().as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::AuthExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let raw = response
        .json::<RawTokenResponse>()
        .await
        .map_err(|e| Error::AuthExchange(format!("invalid token response: {e}")))?;

    TokenResponse::try_from(raw)
}
