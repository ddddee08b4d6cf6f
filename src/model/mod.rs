//! Record shapes persisted by the registry.
//!
//! Field names serialize in camelCase so stored collections keep the
//! layout used by the web front end (`mustTryDish`, `stallId`, ...).

pub mod review;
pub mod stall;
pub mod user;

pub use review::{NewReview, Review, MAX_RATING, MIN_RATING};
pub use stall::{NewStall, Stall};
pub use user::{CurrentUser, CURRENT_USER};

use crate::error::{Result, StallError};

/// Rejects blank text for a required field.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StallError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}
