//! Key-value persistence for the two registry collections.
//!
//! Each collection lives under one key as a JSON array and is always read
//! and written whole. Backends only need to move opaque strings around.

pub mod collections;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use std::fmt;

use crate::error::Result;

pub use collections::{encode_all, read_all, write_all, Record};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// String key-value storage. A `set` replaces the previous value in a
/// single operation.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Writes every entry or none of them.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;
    /// Returns true if the key existed.
    fn remove(&self, key: &str) -> Result<bool>;
    fn keys(&self) -> Result<Vec<String>>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// The named collections kept by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Stalls,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Stalls, Collection::Reviews];

    /// Storage key. These match the keys the web client used.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Stalls => "foodStalls",
            Collection::Reviews => "reviews",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
