//! OAuth2 authorization-code flow and token lifecycle for the DAM provider
//!
//! Builds the authorization URL, exchanges callback codes for access
//! tokens, persists the single token in a `TokenSlot`, and invalidates it on
//! expiry, 401 or a bad read. No HTTP client for the DAM API lives here;
//! `dam-client` consults `TokenStore` before every request.
//!
//! Session flow:
//! 1. Entry route calls `TokenStore::enter(code)`
//! 2. No valid token, no code → redirect to `build_authorization_url()`
//! 3. Provider redirects back with `code` → `exchange_code_for_token()`
//! 4. Token stored via the slot, expiry timer scheduled
//! 5. Timer, 401 or bad read → `invalidate()` publishes an `Invalidation`

pub mod access_token;
pub mod authorize;
pub mod config;
pub mod constants;
pub mod error;
pub mod session;
pub mod slot;
pub mod store;
pub mod token;

pub use access_token::{AccessToken, now_millis};
pub use authorize::build_authorization_url;
pub use config::AuthConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use session::{AuthAction, AuthEvent, AuthState, InvalidationCause, handle_event};
pub use slot::{FileSlot, MemorySlot, TokenSlot};
pub use store::{Entry, Invalidation, TokenStore};
pub use token::{TokenResponse, exchange_code};
