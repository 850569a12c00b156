//! Post store implementations - in-memory and durable file-backed.

mod file;
mod memory;

pub use file::{FilePostStore, FileStoreConfig};
pub use memory::InMemoryPostStore;
