//! The stall registry: the one object through which stalls and reviews are
//! created and read.
//!
//! Every mutation is a read-modify-write of whole collections. Those cycles
//! run under `write_lock`, so concurrent callers on different threads cannot
//! lose each other's updates.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::error::{Result, StallError};
use crate::ids::{IdGenerator, RandomIds};
use crate::model::{NewReview, NewStall, Review, Stall};
use crate::query::{self, ReviewWithStall, StallFilter};
use crate::rating;
use crate::seed::SEED_STALLS;
use crate::storage::collections::ensure_exists;
use crate::storage::{
    encode_all, read_all, write_all, Collection, KeyValueStore, MemoryStore, SqliteStore,
};

/// What `initialize` did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Collections that were absent and got created empty.
    pub created: Vec<&'static str>,
    /// Number of example stalls written.
    pub seeded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub stalls: usize,
    pub rated_stalls: usize,
    pub reviews: usize,
    pub locations: usize,
}

pub struct StallRegistry {
    store: Box<dyn KeyValueStore>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    seed_examples: bool,
    write_lock: Mutex<()>,
}

impl StallRegistry {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            ids: Box::new(RandomIds),
            clock: Box::new(SystemClock),
            seed_examples: true,
            write_lock: Mutex::new(()),
        }
    }

    /// Registry over a SQLite file, created if missing.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(SqliteStore::new(db_path)?))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        Ok(Self::open(&config.database)?.with_seeding(config.seed_examples))
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Whether `initialize` writes example stalls into an empty registry.
    pub fn with_seeding(mut self, enabled: bool) -> Self {
        self.seed_examples = enabled;
        self
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StallError::Storage("registry write lock poisoned".into()))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Creates missing collections and seeds an empty stall collection.
    /// Safe to call any number of times; a non-empty collection is never
    /// re-seeded.
    pub fn initialize(&self) -> Result<InitReport> {
        let _guard = self.lock_writes()?;
        let mut report = InitReport::default();

        for collection in Collection::ALL {
            if ensure_exists(self.store(), collection)? {
                report.created.push(collection.key());
            }
        }

        let mut stalls: Vec<Stall> = read_all(self.store())?;
        if stalls.is_empty() && self.seed_examples {
            for new in SEED_STALLS.iter() {
                stalls.push(Stall::from_new(self.ids.next_id(), new.clone(), self.clock.now()));
            }
            write_all(self.store(), &stalls)?;
            report.seeded = stalls.len();
            tracing::info!("Seeded {} example stalls", report.seeded);
        }

        Ok(report)
    }

    /// Removes both collections. The next `initialize` starts from scratch.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock_writes()?;
        for collection in Collection::ALL {
            self.store.remove(collection.key())?;
        }
        tracing::info!("Cleared all collections");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stalls
    // ------------------------------------------------------------------

    pub fn all_stalls(&self) -> Result<Vec<Stall>> {
        read_all(self.store())
    }

    pub fn stall_by_id(&self, id: &str) -> Result<Option<Stall>> {
        Ok(query::find_stall(self.all_stalls()?, id))
    }

    pub fn list_stalls(&self, filter: &StallFilter) -> Result<Vec<Stall>> {
        Ok(query::filter_stalls(self.all_stalls()?, filter))
    }

    pub fn locations(&self) -> Result<Vec<String>> {
        Ok(query::distinct_locations(&self.all_stalls()?))
    }

    /// Case-insensitive name check for callers enforcing unique names.
    pub fn is_name_taken(&self, name: &str) -> Result<bool> {
        Ok(self.all_stalls()?.iter().any(|s| s.has_name(name)))
    }

    /// Stores `new` under a fresh id. Does not check name uniqueness.
    pub fn add_stall(&self, new: NewStall) -> Result<Stall> {
        new.validate()?;
        let _guard = self.lock_writes()?;

        let mut stalls: Vec<Stall> = read_all(self.store())?;
        let stall = Stall::from_new(self.ids.next_id(), new, self.clock.now());
        stalls.push(stall.clone());
        write_all(self.store(), &stalls)?;

        tracing::debug!("Added stall {} ({})", stall.id, stall.name);
        Ok(stall)
    }

    // ------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------

    pub fn all_reviews(&self) -> Result<Vec<Review>> {
        read_all(self.store())
    }

    pub fn reviews_by_stall_id(&self, stall_id: &str) -> Result<Vec<Review>> {
        Ok(query::reviews_for_stall(self.all_reviews()?, stall_id))
    }

    pub fn reviews_by_user_id(&self, user_id: &str) -> Result<Vec<Review>> {
        Ok(query::reviews_for_user(self.all_reviews()?, user_id))
    }

    /// The user's reviews, each with its stall when the stall still exists.
    pub fn reviews_with_stalls(&self, user_id: &str) -> Result<Vec<ReviewWithStall>> {
        let reviews = self.reviews_by_user_id(user_id)?;
        Ok(query::join_stalls(reviews, &self.all_stalls()?))
    }

    /// Stores `new` and refreshes the reviewed stall's rating.
    ///
    /// Both collections are read and validated before anything is written,
    /// and the review and the new rating are committed in one store write.
    /// A review for an unknown stall is kept; only the rating update is
    /// skipped.
    pub fn add_review(&self, new: NewReview) -> Result<Review> {
        new.validate()?;
        let _guard = self.lock_writes()?;

        let mut reviews: Vec<Review> = read_all(self.store())?;
        let mut stalls: Vec<Stall> = read_all(self.store())?;

        let review = Review::from_new(self.ids.next_id(), new, self.clock.now());
        reviews.push(review.clone());
        let reviews_raw = encode_all(&reviews)?;

        if rating::recompute(&mut stalls, &reviews, &review.stall_id) {
            let stalls_raw = encode_all(&stalls)?;
            self.store.set_many(&[
                (Collection::Reviews.key(), reviews_raw.as_str()),
                (Collection::Stalls.key(), stalls_raw.as_str()),
            ])?;
        } else {
            self.store.set(Collection::Reviews.key(), &reviews_raw)?;
            tracing::warn!(
                "Review {} references unknown stall {}",
                review.id,
                review.stall_id
            );
        }

        tracing::debug!("Added review {} for stall {}", review.id, review.stall_id);
        Ok(review)
    }

    pub fn stats(&self) -> Result<RegistryStats> {
        let stalls = self.all_stalls()?;
        let reviews = self.all_reviews()?;
        Ok(RegistryStats {
            stalls: stalls.len(),
            rated_stalls: stalls.iter().filter(|s| s.rating.is_some()).count(),
            reviews: reviews.len(),
            locations: query::distinct_locations(&stalls).len(),
        })
    }
}
