use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, CurrentUser};
use crate::error::{Result, StallError};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A review as stored in the `reviews` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    /// May point at a stall that no longer exists.
    pub stall_id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn from_new(id: String, new: NewReview, now: DateTime<Utc>) -> Self {
        Self {
            id,
            stall_id: new.stall_id,
            user_id: new.user_id,
            user_name: new.user_name,
            rating: new.rating,
            comment: new.comment,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Five-character star bar, e.g. `★★★☆☆`.
    pub fn stars(&self) -> String {
        let filled = self.rating.min(MAX_RATING) as usize;
        let empty = MAX_RATING as usize - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

/// Caller-supplied data for a review that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub stall_id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewReview {
    pub fn new(
        stall_id: impl Into<String>,
        author: &CurrentUser,
        rating: u8,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            stall_id: stall_id.into(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            rating,
            comment: comment.into(),
            image_url: None,
        }
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(StallError::validation(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, self.rating
            )));
        }
        require_text("comment", &self.comment)?;
        require_text("stall id", &self.stall_id)?;
        Ok(())
    }
}
