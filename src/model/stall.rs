use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::require_text;
use crate::error::{Result, StallError};

/// A food stall as stored in the `foodStalls` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stall {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub must_try_dish: String,
    pub approximate_price: f64,
    /// Remote URL or an embedded `data:` URI.
    pub image_url: String,
    /// Mean review rating. Absent until the first review lands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stall {
    /// Builds the stored record for `new`. Both timestamps are `now`.
    pub fn from_new(id: String, new: NewStall, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            location: new.location,
            description: new.description,
            must_try_dish: new.must_try_dish,
            approximate_price: new.approximate_price,
            image_url: new.image_url,
            rating: new.rating,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rating formatted for display, `"New"` when unrated.
    pub fn rating_label(&self) -> String {
        match self.rating {
            Some(rating) => format!("{:.1}", rating),
            None => "New".to_string(),
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// Caller-supplied data for a stall that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStall {
    pub name: String,
    pub location: String,
    pub description: String,
    pub must_try_dish: String,
    pub approximate_price: f64,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl NewStall {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
        must_try_dish: impl Into<String>,
        approximate_price: f64,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            description: description.into(),
            must_try_dish: must_try_dish.into(),
            approximate_price,
            image_url: image_url.into(),
            rating: None,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Trims surrounding whitespace from every text field.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self.description.trim().to_string(),
            must_try_dish: self.must_try_dish.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            ..self
        }
    }

    /// Form-level checks. The registry does not run these; callers do
    /// before `add_stall`.
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("location", &self.location)?;
        require_text("description", &self.description)?;
        require_text("must-try dish", &self.must_try_dish)?;
        require_text("image", &self.image_url)?;

        if !self.approximate_price.is_finite() || self.approximate_price <= 0.0 {
            return Err(StallError::validation(format!(
                "approximate price must be positive, got {}",
                self.approximate_price
            )));
        }

        if let Some(rating) = self.rating {
            if !(1.0..=5.0).contains(&rating) {
                return Err(StallError::validation(format!(
                    "rating must be between 1 and 5, got {}",
                    rating
                )));
            }
        }

        Ok(())
    }
}
