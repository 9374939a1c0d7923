pub mod controller;
pub mod memory;
pub mod model;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

pub use memory::MemoryStudentRepository;
pub use model::*;
pub use repository::{PgStudentRepository, RepositoryError, StudentRepository};
pub use router::init_students_router;
