//! Client-side JWT handling.
//!
//! The console only *reads* tokens issued by the gateway. Signature
//! verification is the gateway's job on every request; the client-side
//! contract is limited to payload shape and expiry.

pub mod claims;
pub mod decoder;

pub use claims::SessionClaims;
pub use decoder::{decode_claims, is_token_expired, try_decode};
