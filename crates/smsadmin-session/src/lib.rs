//! # smsadmin-session
//!
//! Owns the bearer-token lifecycle for the console: storage, decoding,
//! expiry detection, and the derived identity/role. Every other component
//! depends on this crate; no network round-trip is needed to check
//! validity.

pub mod guard;
pub mod jwt;
pub mod manager;
pub mod revalidate;
pub mod store;

pub use guard::{AccessDecision, check_access};
pub use jwt::claims::SessionClaims;
pub use manager::{AuthState, Session, SessionManager};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
