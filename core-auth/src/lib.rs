//! # Authentication Module
//!
//! Identity token provider seam for the sync core.
//!
//! ## Overview
//!
//! The sync transport needs one thing from the identity layer: a valid bearer
//! token, asynchronously, with the possibility of failure (for example the
//! user declining an interactive consent prompt). The [`TokenProvider`] trait
//! captures exactly that contract; how tokens are minted (OAuth flow, system
//! account, test fixture) is the host's business.
//!
//! [`CachedTokenProvider`] wraps any provider with expiry-aware caching so
//! repeated requests during a sync burst do not hammer the identity backend,
//! refreshing shortly before expiration and emitting auth events on the bus.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{AuthError, Result};
pub use provider::{CachedTokenProvider, TokenProvider};
pub use types::AccessToken;
