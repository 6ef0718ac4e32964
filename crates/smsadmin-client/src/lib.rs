//! # smsadmin-client
//!
//! Protocol clients for the remote SMS gateway REST API. Each client is a
//! thin, typed layer over [`transport::ApiTransport`]: it owns the
//! endpoint paths, the wire types, and the client-side guards (state
//! machine checks, input validation) that avoid needless round-trips.
//!
//! The gateway is the system of record; every mutation here is followed
//! by an authoritative re-fetch on the caller's side, never trusted
//! optimistic state.

pub mod auth;
pub mod billing;
pub mod credits;
pub mod managers;
pub mod referentiel;
pub mod tenants;
pub mod transport;

pub use transport::ApiTransport;
