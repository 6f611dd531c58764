mod error;
mod repository;

pub use error::*;
pub use repository::*;

/// SQL migration for initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Schema migrations in application order. Versions are never reused.
pub const MIGRATIONS: &[(i64, &str)] = &[(1, MIGRATION_001_INITIAL)];
