//! OAuth and token-lifetime constants for the DAM identity provider
//!
//! Endpoints and client credentials are deployment configuration (see
//! `AuthConfig`); only protocol-level values live here.

/// Scopes requested at authorization time
pub const SCOPES: &str = "openid api";

/// The authorization-code flow is the only grant this client speaks
pub const RESPONSE_TYPE: &str = "code";

/// Grant type sent to the token endpoint
pub const GRANT_TYPE: &str = "authorization_code";

/// Seconds subtracted from `expires_in` when computing the stored expiry,
/// so the token is treated as expired before the provider invalidates it.
pub const EXCHANGE_SAFETY_MARGIN_SECS: u64 = 60;

/// Seconds before the declared lifetime at which the expiry timer deletes
/// the stored token.
pub const EXPIRY_TIMER_MARGIN_SECS: u64 = 600;
