//! Token store: the single owner of the access-token lifecycle
//!
//! Wraps one `TokenSlot` and drives the `session` state machine. Every
//! authenticated request reads the token through here; every path that
//! drops the token (401, expiry timer, bad read, sign-out) goes through
//! `invalidate`, which publishes an `Invalidation` on a broadcast channel.
//! The store never navigates: whoever subscribes decides what a dropped
//! session means for the user.
//!
//! At most one expiry timer is pending. Scheduling a new one aborts the
//! previous handle first. Slot writes and slot clears run under one
//! lifecycle lock, so a firing timer cannot delete a token written by a
//! concurrent exchange.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::access_token::{AccessToken, now_millis};
use crate::authorize::build_authorization_url;
use crate::config::AuthConfig;
use crate::constants::EXPIRY_TIMER_MARGIN_SECS;
use crate::error::{Error, Result};
use crate::session::{AuthAction, AuthEvent, AuthState, InvalidationCause, handle_event};
use crate::slot::TokenSlot;
use crate::token::exchange_code;

/// Capacity of the invalidation channel. Slow listeners see `Lagged`, which
/// is harmless: only the latest invalidation matters.
const INVALIDATION_CHANNEL_CAPACITY: usize = 16;

/// Published whenever the stored token is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub cause: InvalidationCause,
    pub at_ms: u64,
}

/// Outcome of a visit to the application entry route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A valid token is already stored
    Authenticated,
    /// Send the browser to this authorization URL
    RedirectToProvider(String),
    /// The callback code was exchanged; send the browser home
    SignedIn,
}

/// Cheaply cloneable handle to the shared token state.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Inner>,
}

struct Inner {
    config: AuthConfig,
    http: reqwest::Client,
    slot: Arc<dyn TokenSlot>,
    state: Mutex<AuthState>,
    /// Held across "persist + schedule" and across "clear + publish"
    lifecycle: Mutex<()>,
    expiry_timer: Mutex<Option<JoinHandle<()>>>,
    invalidations: broadcast::Sender<Invalidation>,
}

impl TokenStore {
    /// Create a store over `slot`. `http` is used for the token endpoint
    /// only and should carry the request timeout.
    pub fn new(config: AuthConfig, slot: Arc<dyn TokenSlot>, http: reqwest::Client) -> Self {
        let (invalidations, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                config,
                http,
                slot,
                state: Mutex::new(AuthState::Unauthenticated),
                lifecycle: Mutex::new(()),
                expiry_timer: Mutex::new(None),
                invalidations,
            }),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// Authorization URL for the configured client.
    pub fn authorization_url(&self) -> Result<String> {
        build_authorization_url(&self.inner.config)
    }

    /// Listen for dropped sessions.
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.inner.invalidations.subscribe()
    }

    pub async fn state(&self) -> AuthState {
        self.inner.state.lock().await.clone()
    }

    /// Read the stored token without checking expiry.
    pub async fn read_token(&self) -> Result<AccessToken> {
        let raw = self.inner.slot.read().await?.ok_or(Error::Missing)?;
        AccessToken::from_slot(&raw)
    }

    /// The stored token if present, parsable and not expired.
    pub async fn current_token(&self) -> Result<AccessToken> {
        let token = self.read_token().await?;
        if !token.is_valid_at(now_millis()) {
            return Err(Error::Expired {
                expires_at_ms: token.expires_at_ms,
            });
        }
        Ok(token)
    }

    /// Whether a usable token is stored. Read-only: an expired or
    /// unparsable value is reported as `false` but left in place.
    pub async fn has_valid_token(&self) -> bool {
        match self.current_token().await {
            Ok(_) => true,
            Err(Error::Io(msg)) => {
                warn!(error = %msg, "token slot unreadable");
                false
            }
            Err(_) => false,
        }
    }

    /// Handle a visit to the entry route, optionally carrying the OAuth
    /// callback `code`.
    pub async fn enter(&self, code: Option<&str>) -> Result<Entry> {
        let token_valid = self.has_valid_token().await;
        let action = self
            .dispatch(AuthEvent::EntryVisited {
                token_valid,
                code: code.map(str::to_owned),
            })
            .await;

        match action {
            AuthAction::None => Ok(Entry::Authenticated),
            AuthAction::RedirectToProvider => {
                Ok(Entry::RedirectToProvider(self.authorization_url()?))
            }
            AuthAction::ExchangeCode { code } => {
                self.exchange_code_for_token(&code).await?;
                Ok(Entry::SignedIn)
            }
            other => {
                error!(action = ?other, "unexpected action for entry visit");
                Ok(Entry::RedirectToProvider(self.authorization_url()?))
            }
        }
    }

    /// Exchange an authorization code, persist the resulting token and
    /// schedule its expiry invalidation.
    ///
    /// On any failure nothing is persisted and the error is an
    /// `AuthExchange`/`Http` error. Codes are not deduplicated here; a reused
    /// code is rejected by the provider.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<AccessToken> {
        let response = match exchange_code(&self.inner.http, &self.inner.config, code).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "authorization code exchange failed");
                self.dispatch(AuthEvent::ExchangeFailed(e.to_string())).await;
                return Err(e);
            }
        };

        let token = AccessToken::issue(response.access_token, response.expires_in, now_millis());
        let _lifecycle = self.inner.lifecycle.lock().await;
        let persisted = match token.to_slot() {
            Ok(raw) => self.inner.slot.write(&raw).await,
            Err(e) => Err(e),
        };
        if let Err(e) = persisted {
            warn!(error = %e, "failed to persist access token");
            self.dispatch(AuthEvent::ExchangeFailed(e.to_string())).await;
            return Err(e);
        }

        info!(
            expires_in = token.issued_expiry_secs,
            expires_at_ms = token.expires_at_ms,
            "access token issued"
        );

        let action = self
            .dispatch(AuthEvent::ExchangeSucceeded {
                expires_in: token.issued_expiry_secs,
            })
            .await;
        if let AuthAction::CompleteLogin { expires_in } = action {
            self.schedule_locked(expires_in).await;
        }

        Ok(token)
    }

    /// Schedule the one-shot expiry timer at `expires_in_secs - 600`
    /// seconds (not before now), replacing any pending timer.
    pub async fn schedule_expiry_invalidation(&self, expires_in_secs: u64) {
        let _lifecycle = self.inner.lifecycle.lock().await;
        self.schedule_locked(expires_in_secs).await;
    }

    /// Caller holds the lifecycle lock. A timer blocked on that lock is
    /// aborted here before it can clear the slot.
    async fn schedule_locked(&self, expires_in_secs: u64) {
        let delay = Duration::from_secs(expires_in_secs.saturating_sub(EXPIRY_TIMER_MARGIN_SECS));

        let mut timer = self.inner.expiry_timer.lock().await;
        if let Some(previous) = timer.take() {
            previous.abort();
            debug!("cancelled previous expiry timer");
        }

        // Weak: a pending timer must not keep a dropped store alive.
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                TokenStore { inner }.expire_from_timer().await;
            }
        }));

        debug!(delay_secs = delay.as_secs(), "scheduled expiry invalidation");
    }

    /// Drop the stored token unconditionally and publish the cause.
    pub async fn invalidate(&self, cause: InvalidationCause) {
        let _lifecycle = self.inner.lifecycle.lock().await;
        if let Some(timer) = self.inner.expiry_timer.lock().await.take() {
            timer.abort();
        }
        self.clear_and_publish(cause).await;
    }

    /// Timer path: the handle belongs to the running task, so it is released
    /// rather than aborted.
    async fn expire_from_timer(&self) {
        let _lifecycle = self.inner.lifecycle.lock().await;
        self.inner.expiry_timer.lock().await.take();
        self.clear_and_publish(InvalidationCause::ExpiryTimer).await;
    }

    async fn clear_and_publish(&self, cause: InvalidationCause) {
        if let Err(e) = self.inner.slot.remove().await {
            warn!(error = %e, cause = cause.label(), "failed to clear token slot");
        }

        let action = self.dispatch(AuthEvent::Invalidated(cause)).await;
        if let AuthAction::PublishInvalidation { cause } = action {
            warn!(cause = cause.label(), "session invalidated");
            // No subscribers is fine; the state change above still applies.
            let _ = self.inner.invalidations.send(Invalidation {
                cause,
                at_ms: now_millis(),
            });
        }
    }

    async fn dispatch(&self, event: AuthEvent) -> AuthAction {
        let mut state = self.inner.state.lock().await;
        let previous = state.clone();
        let (next, action) = handle_event(previous.clone(), event);
        if previous != next {
            debug!(from = ?previous, to = ?next, "auth state transition");
        }
        *state = next;
        action
    }
}
