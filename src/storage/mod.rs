//! Durable storage backends
//!
//! Backends implement the `DurableStore` trait. `SqliteStore` is the
//! persistent implementation; `MemoryStore` lives only as long as the process.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{DurableStore, OpenStore, StorageError, StorageResult, StoredEntry};
