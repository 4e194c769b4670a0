//! Session authentication for the agent console.
//!
//! This module provides:
//! - the session gate middleware and its route table
//! - JWT session token verification behind the `TokenVerifier` capability
//! - the cookie relay for auth backend login responses

mod extract;
mod gate;
pub(crate) mod jwt;
mod relay;
mod routes;
pub mod types;
mod verifier;

pub use gate::{decide, session_gate, GateDecision, SessionGate, DASHBOARD_PATH, ENTRY_PATH};
pub use relay::{relay_cookies, upstream_set_cookies, CookieDirective, CookieParseError, RelayReport};
pub use routes::{RouteClass, RouteTable};
pub use verifier::{JwtVerifier, TokenVerifier};
