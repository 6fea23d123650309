use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bearer access token with optional expiry.
///
/// # Security
///
/// Tokens should never be logged. The `Debug` implementation redacts the
/// secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The bearer token used in `Authorization` headers
    pub secret: String,
    /// When the token expires (UTC); `None` means unknown/never
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Create a token expiring `expires_in` seconds from now.
    pub fn new(secret: String, expires_in: i64) -> Self {
        Self {
            secret,
            expires_at: Some(Utc::now() + chrono::Duration::seconds(expires_in)),
        }
    }

    /// Create a token with no known expiry.
    pub fn permanent(secret: String) -> Self {
        Self {
            secret,
            expires_at: None,
        }
    }

    /// Check if the token is expired or will expire within `buffer_seconds`.
    ///
    /// Tokens with no expiry are never considered expired.
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() >= expires_at - chrono::Duration::seconds(buffer_seconds)
            }
            None => false,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
