//! History slot implementations.

mod codec;
mod file;
mod memory;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use codec::{decode_history, encode_history};
pub use file::JsonFileHistoryStore;
pub use lens_types::{AuditRecord, HistoryStore, StoreError, HISTORY_SLOT_KEY};
pub use memory::InMemoryHistoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteHistoryStore;
