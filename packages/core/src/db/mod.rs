//! Database Layer
//!
//! Persistence for trees, nodes, and flashcards behind the [`TreeStore`] trait:
//!
//! - [`SqliteStore`] - libsql-backed local database file
//! - [`MemoryStore`] - in-process tables for tests and throwaway sessions
//!
//! The workflow layer only ever sees `Arc<dyn TreeStore>`.

mod error;
mod memory_store;
mod sqlite_store;
mod tree_store;

pub use error::DatabaseError;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use tree_store::TreeStore;
