//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Only records, validation rules, trait definitions and domain error types.

pub mod errors;
pub mod records;
pub mod repositories;
pub mod validation;

pub use errors::DomainError;
pub use records::*;
pub use repositories::*;
