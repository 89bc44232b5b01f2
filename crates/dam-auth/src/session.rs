//! Authentication state machine
//!
//! Pure state machine: receives events, returns (new_state, action).
//! `TokenStore` executes the I/O implied by each action; the web layer
//! decides how to navigate.

/// Why the stored token was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationCause {
    /// A downstream call returned 401
    Unauthorized,
    /// The scheduled expiry timer fired
    ExpiryTimer,
    /// A request-time read found the token past its expiry
    Expired,
    /// A request-time read found no token
    Missing,
    /// The stored value could not be parsed
    Malformed,
    /// The user signed out explicitly
    SignOut,
}

impl InvalidationCause {
    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            InvalidationCause::Unauthorized => "unauthorized",
            InvalidationCause::ExpiryTimer => "expiry_timer",
            InvalidationCause::Expired => "expired",
            InvalidationCause::Missing => "missing",
            InvalidationCause::Malformed => "malformed",
            InvalidationCause::SignOut => "sign_out",
        }
    }
}

/// Session states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No usable token
    Unauthenticated,
    /// Sent to the provider, or holding a callback code being exchanged
    AwaitingCallback,
    /// A valid token is stored
    Authenticated,
}

/// Events that drive state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The application entry route was visited
    EntryVisited {
        token_valid: bool,
        code: Option<String>,
    },
    /// The token endpoint returned a usable token
    ExchangeSucceeded { expires_in: u64 },
    /// The token endpoint call failed
    ExchangeFailed(String),
    /// The stored token was dropped
    Invalidated(InvalidationCause),
}

/// Actions the caller should execute after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// Send the browser to the authorization URL
    RedirectToProvider,
    /// Exchange the callback code for a token
    ExchangeCode { code: String },
    /// Schedule expiry invalidation and send the browser home
    CompleteLogin { expires_in: u64 },
    /// Notify listeners that the session ended
    PublishInvalidation { cause: InvalidationCause },
    /// No-op
    None,
}

/// Handle a state transition. Pure function: no I/O.
pub fn handle_event(state: AuthState, event: AuthEvent) -> (AuthState, AuthAction) {
    match (state, event) {
        // --- Entry route ---
        (_, AuthEvent::EntryVisited {
            token_valid: true, ..
        }) => (AuthState::Authenticated, AuthAction::None),

        (_, AuthEvent::EntryVisited {
            code: Some(code), ..
        }) if !code.trim().is_empty() => {
            (AuthState::AwaitingCallback, AuthAction::ExchangeCode { code })
        }

        (_, AuthEvent::EntryVisited { .. }) => {
            (AuthState::AwaitingCallback, AuthAction::RedirectToProvider)
        }

        // --- Exchange outcome ---
        // A new token replaces whatever was held before.
        (_, AuthEvent::ExchangeSucceeded { expires_in }) => (
            AuthState::Authenticated,
            AuthAction::CompleteLogin { expires_in },
        ),

        (AuthState::AwaitingCallback, AuthEvent::ExchangeFailed(_)) => {
            (AuthState::Unauthenticated, AuthAction::None)
        }

        // A failed exchange leaves an existing session untouched.
        (state, AuthEvent::ExchangeFailed(_)) => (state, AuthAction::None),

        // --- Invalidation ---
        (_, AuthEvent::Invalidated(cause)) => (
            AuthState::Unauthenticated,
            AuthAction::PublishInvalidation { cause },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(token_valid: bool, code: Option<&str>) -> AuthEvent {
        AuthEvent::EntryVisited {
            token_valid,
            code: code.map(String::from),
        }
    }

    #[test]
    fn valid_token_authenticates_without_action() {
        let (state, action) = handle_event(AuthState::Unauthenticated, visit(true, None));
        assert_eq!(state, AuthState::Authenticated);
        assert_eq!(action, AuthAction::None);
    }

    #[test]
    fn valid_token_wins_over_stale_callback_code() {
        let (state, action) =
            handle_event(AuthState::Unauthenticated, visit(true, Some("used-code")));
        assert_eq!(state, AuthState::Authenticated);
        assert_eq!(action, AuthAction::None);
    }

    #[test]
    fn no_token_no_code_redirects_to_provider() {
        let (state, action) = handle_event(AuthState::Unauthenticated, visit(false, None));
        assert_eq!(state, AuthState::AwaitingCallback);
        assert_eq!(action, AuthAction::RedirectToProvider);
    }

    #[test]
    fn blank_code_is_treated_as_absent() {
        let (_, action) = handle_event(AuthState::Unauthenticated, visit(false, Some(" ")));
        assert_eq!(action, AuthAction::RedirectToProvider);
    }

    #[test]
    fn callback_code_triggers_exchange() {
        let (state, action) =
            handle_event(AuthState::AwaitingCallback, visit(false, Some("abc123")));
        assert_eq!(state, AuthState::AwaitingCallback);
        assert_eq!(
            action,
            AuthAction::ExchangeCode {
                code: "abc123".into()
            }
        );
    }

    #[test]
    fn exchange_success_completes_login() {
        let (state, action) = handle_event(
            AuthState::AwaitingCallback,
            AuthEvent::ExchangeSucceeded { expires_in: 3600 },
        );
        assert_eq!(state, AuthState::Authenticated);
        assert_eq!(action, AuthAction::CompleteLogin { expires_in: 3600 });
    }

    #[test]
    fn exchange_failure_returns_to_unauthenticated() {
        let (state, action) = handle_event(
            AuthState::AwaitingCallback,
            AuthEvent::ExchangeFailed("400".into()),
        );
        assert_eq!(state, AuthState::Unauthenticated);
        assert_eq!(action, AuthAction::None);
    }

    #[test]
    fn exchange_failure_keeps_existing_session() {
        let (state, _) = handle_event(
            AuthState::Authenticated,
            AuthEvent::ExchangeFailed("code already used".into()),
        );
        assert_eq!(state, AuthState::Authenticated);
    }

    #[test]
    fn every_invalidation_cause_ends_session() {
        for cause in [
            InvalidationCause::Unauthorized,
            InvalidationCause::ExpiryTimer,
            InvalidationCause::Expired,
            InvalidationCause::Missing,
            InvalidationCause::Malformed,
            InvalidationCause::SignOut,
        ] {
            let (state, action) =
                handle_event(AuthState::Authenticated, AuthEvent::Invalidated(cause));
            assert_eq!(state, AuthState::Unauthenticated);
            assert_eq!(action, AuthAction::PublishInvalidation { cause });
        }
    }

    #[test]
    fn full_login_cycle() {
        let state = AuthState::Unauthenticated;
        let (state, _) = handle_event(state, visit(false, None));
        let (state, _) = handle_event(state, visit(false, Some("code")));
        let (state, _) = handle_event(state, AuthEvent::ExchangeSucceeded { expires_in: 60 });
        assert_eq!(state, AuthState::Authenticated);
        let (state, _) = handle_event(
            state,
            AuthEvent::Invalidated(InvalidationCause::ExpiryTimer),
        );
        assert_eq!(state, AuthState::Unauthenticated);
    }
}
