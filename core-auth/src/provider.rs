//! Identity token provider trait and caching wrapper.

use crate::error::{AuthError, Result};
use crate::types::AccessToken;
use async_trait::async_trait;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

/// Buffer time before token expiration to trigger refresh (5 minutes)
const TOKEN_REFRESH_BUFFER_SECS: i64 = 300;

/// Supplies bearer tokens on demand.
///
/// Implementations may prompt the user interactively, exchange a refresh
/// token, or return a fixture; the sync core does not care. Acquisition can
/// fail, most notably with [`AuthError::ConsentDeclined`] when the user
/// rejects an interactive prompt.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtain a bearer token valid for at least the next request.
    async fn access_token(&self) -> Result<AccessToken>;
}

/// A [`TokenProvider`] that caches tokens from an inner provider and
/// refreshes them shortly before expiry.
///
/// A single in-flight refresh is guaranteed: concurrent callers wait on the
/// same lock rather than each triggering a refresh. Auth events are emitted
/// to the bus so hosts can surface refresh activity.
pub struct CachedTokenProvider {
    inner: Arc<dyn TokenProvider>,
    cached: Mutex<Option<AccessToken>>,
    event_bus: Option<EventBus>,
}

impl CachedTokenProvider {
    pub fn new(inner: Arc<dyn TokenProvider>) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
            event_bus: None,
        }
    }

    /// Attach an event bus for auth state events.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn emit(&self, event: AuthEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Auth(event));
        }
    }
}

#[async_trait]
impl TokenProvider for CachedTokenProvider {
    #[instrument(skip(self))]
    async fn access_token(&self) -> Result<AccessToken> {
        // Lock held across the refresh to prevent concurrent refreshes.
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired_with_buffer(TOKEN_REFRESH_BUFFER_SECS) {
                debug!("Token is valid, no refresh needed");
                return Ok(token.clone());
            }
        }

        info!("Token missing or expiring soon, refreshing");
        self.emit(AuthEvent::TokenRefreshing);

        let token = self.inner.access_token().await.map_err(|e| {
            error!("Token refresh failed: {}", e);
            self.emit(AuthEvent::AuthError {
                message: e.to_string(),
                recoverable: !matches!(e, AuthError::ConsentDeclined),
            });
            e
        })?;

        if let Some(expires_at) = token.expires_at {
            self.emit(AuthEvent::TokenRefreshed {
                expires_at: expires_at.timestamp(),
            });
        }

        *cached = Some(token.clone());
        Ok(token)
    }
}
