//! Shared domain types.

pub mod filter;
pub mod pagination;
pub mod role;

pub use filter::Searchable;
pub use pagination::{Page, PageQuery};
pub use role::Role;
