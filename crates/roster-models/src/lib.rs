//! # Roster Models
//!
//! Domain models and DTOs for the Roster API.
//!
//! - [`students`]: the student row, its wire shape, the validated write form,
//!   and listing filters and ordering
//! - [`users`]: system users and their roles
//!
//! # Example
//!
//! ```ignore
//! use roster_models::{SortSpec, StudentFilter};
//!
//! let sort = SortSpec::from_params(Some("age"), Some("asc"));
//! assert_eq!(sort.to_sql(), "age ASC");
//! ```

pub mod students;
pub mod users;

pub use students::{
    Gender, SortColumn, SortDirection, SortSpec, Student, StudentFilter, StudentForm,
    StudentResponse, StudentStatus, is_mobile_number,
};
pub use users::{User, UserRole};
