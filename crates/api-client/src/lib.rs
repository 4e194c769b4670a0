//! Outgoing request layer for the agent console.
//!
//! Every API call goes through [`ApiClient`], which attaches the bearer token
//! held by the [`CredentialStore`] and records a diagnostic for non-2xx
//! responses. Responses are never retried or rewritten.

mod client;
mod config;
mod credentials;
mod error;

pub use client::ApiClient;
pub use config::{browser_origin, resolve_base_url, ClientConfig, DEFAULT_TIMEOUT_SECS};
pub use credentials::CredentialStore;
pub use error::{ClientError, ClientResult};
