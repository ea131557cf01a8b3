#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryKeyValueStore, KeyValueStore, SESSION_TOKEN_KEY, StorageError};
