//! # Desktop Bridge Implementations
//!
//! Desktop (native) implementations of the host bridge traits.
//!
//! Currently provides [`ReqwestHttpClient`], an `HttpClient` built on
//! `reqwest` with connection pooling and configurable retry.

pub mod http;

pub use http::ReqwestHttpClient;
