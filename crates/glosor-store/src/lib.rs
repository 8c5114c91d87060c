//! glosor-store: vocabulary storage backends and configuration.
//!
//! Implements the `CatalogueSource` and `MarkSink` traits from `glosor-core`
//! on top of SQLite, plus an in-memory store used by tests.

pub mod config;
pub mod error;
pub mod memory;
pub mod sqlite;

pub use config::{load_config, load_config_from, open_store, GlosorConfig};
pub use memory::MemoryStore;
pub use sqlite::{InsertedGroup, PruneSummary, SqliteStore};
