//! Shared errors, domain types and traits

pub mod errors;
pub mod traits;
pub mod types;
