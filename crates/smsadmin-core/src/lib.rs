//! # smsadmin-core
//!
//! Core crate for the SMS Admin Console. Contains configuration schemas,
//! shared domain types (roles, pagination, search), and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other console crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
