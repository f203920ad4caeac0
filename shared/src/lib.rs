//! Shared types and logic for the bean inspection client
//!
//! Pure domain code with no I/O: record shapes, report normalization,
//! advice selection and symptom-form validation. Used by the client crate
//! and exposed to the front end via WASM.

pub mod advice;
pub mod models;
pub mod normalize;
pub mod types;
pub mod validation;

pub use advice::*;
pub use models::*;
pub use normalize::*;
pub use types::*;
pub use validation::*;

/// Placeholder for values that are missing or unreadable
pub const UNKNOWN: &str = "Unknown";
