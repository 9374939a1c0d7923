//! # Roster Core
//!
//! Core types, errors, and utilities for the Roster API.
//!
//! - [`errors`]: [`AppError`], the status-carrying application error
//! - [`response`]: [`ApiResponse`], the `{code, message, data}` envelope
//! - [`pagination`]: [`PageRequest`] and [`PageResult`]
//! - [`text`]: lenient parsing of loose request strings
//! - [`serde`]: date/time wire formats
//!
//! # Example
//!
//! ```ignore
//! use roster_core::{ApiResponse, AppError, PageRequest};
//!
//! let page = PageRequest::new(0, 0).normalized();
//! assert_eq!(page.offset(), 0);
//!
//! let err = AppError::bad_request(anyhow::anyhow!("Student id is required"));
//! let ok = ApiResponse::<()>::ok("Student deleted successfully");
//! ```

pub mod errors;
pub mod pagination;
pub mod response;
pub mod serde;
pub mod text;

pub use errors::AppError;
pub use pagination::{PageRequest, PageResult};
pub use response::ApiResponse;
