//! # Scribe Infrastructure
//!
//! Concrete implementations of the ports defined in `scribe-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory and file stores only
//! - `postgres` - PostgreSQL post store via SeaORM

pub mod clock;
pub mod database;
pub mod storage;

pub use clock::{SystemClock, UuidIdGenerator};
pub use database::DatabaseConfig;
pub use storage::{FilePostStore, FileStoreConfig, InMemoryPostStore};

#[cfg(feature = "postgres")]
pub use database::PostgresPostStore;
