//! Administrative commands backing the `roster-cli` binary.

pub mod seeder;

pub use seeder::seed_students;
