//! Authorization URL construction
//!
//! The browser is sent to this URL to sign in with the provider. The
//! provider redirects back to `redirect_uri` with a `code` query parameter,
//! which is then exchanged for a token (see `token::exchange_code`).

use url::Url;

use crate::config::AuthConfig;
use crate::constants::{RESPONSE_TYPE, SCOPES};
use crate::error::{Error, Result};

/// Build the authorization URL for the configured client.
///
/// Parameters are appended in a fixed order and form-encoded, so the same
/// configuration always yields the same string.
pub fn build_authorization_url(config: &AuthConfig) -> Result<String> {
    let mut url = Url::parse(&config.authorize_base())
        .map_err(|e| Error::Config(format!("invalid authorization endpoint: {e}")))?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", RESPONSE_TYPE)
        .append_pair("scope", SCOPES);

    Ok(url.into())
}
