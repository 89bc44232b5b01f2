//! The persisted access-token record
//!
//! Serialized as `{"token": ..., "expiresIn": "<seconds>", "expiresInDateTime": <ms>}`.
//! `expiresIn` is written as a string but read as either string or number.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::EXCHANGE_SAFETY_MARGIN_SECS;
use crate::error::{Error, Result};

/// A bearer token with its provider lifetime and absolute expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    /// Lifetime declared by the provider at issuance, in seconds
    #[serde(
        rename = "expiresIn",
        serialize_with = "seconds_as_string",
        deserialize_with = "seconds_from_string_or_number"
    )]
    pub issued_expiry_secs: u64,
    /// Expiry as unix timestamp in milliseconds, safety margin applied
    #[serde(rename = "expiresInDateTime")]
    pub expires_at_ms: u64,
}

impl AccessToken {
    /// Build a token issued at `now_ms` with the provider's `expires_in`.
    ///
    /// The safety margin is capped below the declared lifetime so the
    /// computed expiry never lands before issuance. Absurd lifetimes
    /// saturate at `u64::MAX` instead of wrapping into the past.
    pub fn issue(token: String, expires_in_secs: u64, now_ms: u64) -> Self {
        let margin = EXCHANGE_SAFETY_MARGIN_SECS.min(expires_in_secs.saturating_sub(1));
        let lifetime_secs = expires_in_secs - margin;
        Self {
            token,
            issued_expiry_secs: expires_in_secs,
            expires_at_ms: now_ms.saturating_add(lifetime_secs.saturating_mul(1000)),
        }
    }

    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }

    /// Parse the raw slot value.
    pub fn from_slot(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::MalformedToken(e.to_string()))
    }

    pub fn to_slot(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Io(format!("serializing access token: {e}")))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("issued_expiry_secs", &self.issued_expiry_secs)
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn seconds_as_string<S: Serializer>(secs: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&secs.to_string())
}

fn seconds_from_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
