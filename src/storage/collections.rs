//! Whole-collection reads and writes with validation of stored content.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Collection, KeyValueStore};
use crate::error::{Result, StallError};
use crate::model::{Review, Stall, MAX_RATING, MIN_RATING};

/// A record type stored as one JSON array under a collection key.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Shape checks serde cannot express. Returns a reason on failure.
    fn check(&self) -> std::result::Result<(), String>;
}

impl Record for Stall {
    const COLLECTION: Collection = Collection::Stalls;

    fn id(&self) -> &str {
        &self.id
    }

    fn check(&self) -> std::result::Result<(), String> {
        if !self.approximate_price.is_finite() {
            return Err(format!("stall {} has a non-finite price", self.id));
        }
        if let Some(rating) = self.rating {
            if !rating.is_finite() || !(1.0..=5.0).contains(&rating) {
                return Err(format!("stall {} has rating {} outside 1..=5", self.id, rating));
            }
        }
        Ok(())
    }
}

impl Record for Review {
    const COLLECTION: Collection = Collection::Reviews;

    fn id(&self) -> &str {
        &self.id
    }

    fn check(&self) -> std::result::Result<(), String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "review {} has rating {} outside {}..={}",
                self.id, self.rating, MIN_RATING, MAX_RATING
            ));
        }
        Ok(())
    }
}

/// Reads every record of `R`'s collection. A missing key reads as empty.
pub fn read_all<R: Record>(store: &dyn KeyValueStore) -> Result<Vec<R>> {
    let collection = R::COLLECTION;
    let Some(raw) = store.get(collection.key())? else {
        return Ok(Vec::new());
    };

    let records: Vec<R> = serde_json::from_str(&raw)
        .map_err(|e| StallError::corrupt(collection.key(), e.to_string()))?;

    check_records(&records).map_err(|reason| StallError::corrupt(collection.key(), reason))?;
    Ok(records)
}

fn check_records<R: Record>(records: &[R]) -> std::result::Result<(), String> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let id = record.id();
        if id.is_empty() {
            return Err("record with empty id".to_string());
        }
        if !seen.insert(id) {
            return Err(format!("duplicate id {}", id));
        }
        record.check()?;
    }
    Ok(())
}

/// Serializes `records` after the same checks `read_all` applies, so
/// nothing is stored that could not be read back.
pub fn encode_all<R: Record>(records: &[R]) -> Result<String> {
    check_records(records).map_err(|reason| {
        StallError::validation(format!("refusing to write {}: {}", R::COLLECTION, reason))
    })?;
    Ok(serde_json::to_string(records)?)
}

/// Replaces `R`'s whole collection with `records` in one store write.
pub fn write_all<R: Record>(store: &dyn KeyValueStore, records: &[R]) -> Result<()> {
    let raw = encode_all(records)?;
    store.set(R::COLLECTION.key(), &raw)?;
    tracing::debug!("Wrote {} records to {}", records.len(), R::COLLECTION);
    Ok(())
}

/// Creates `collection` as an empty array if it is absent. Returns true
/// if it was created.
pub fn ensure_exists(store: &dyn KeyValueStore, collection: Collection) -> Result<bool> {
    if store.contains(collection.key())? {
        return Ok(false);
    }
    store.set(collection.key(), "[]")?;
    Ok(true)
}
