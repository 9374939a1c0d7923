//! Student data models and DTOs.
//!
//! Re-exports the student models from the `roster-models` crate.

pub use roster_models::students::*;
