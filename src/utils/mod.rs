//! Shared request utilities.
//!
//! - [`params`]: flat form parameters read from the query string and body

pub mod params;
