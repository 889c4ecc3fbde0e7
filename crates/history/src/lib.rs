//! SQLite-backed conversation history.

pub mod store;

pub use store::SqliteHistoryStore;
