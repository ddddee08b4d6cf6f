//! Derived read views over the stall and review collections.
//!
//! Everything here is a pure function of the collections passed in; the
//! registry reads the collections and hands them over.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;

use crate::error::StallError;
use crate::model::{Review, Stall};

/// Ordering for stall listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StallSort {
    /// Highest rating first. Unrated stalls count as 0.
    #[default]
    Rating,
    /// Alphabetical, case-insensitive.
    Name,
}

impl StallSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            StallSort::Rating => "rating",
            StallSort::Name => "name",
        }
    }
}

impl FromStr for StallSort {
    type Err = StallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rating" => Ok(StallSort::Rating),
            "name" => Ok(StallSort::Name),
            other => Err(StallError::validation(format!(
                "unknown sort '{}', expected 'rating' or 'name'",
                other
            ))),
        }
    }
}

/// Listing options: an optional exact location plus an ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StallFilter {
    pub location: Option<String>,
    pub sort: StallSort,
}

impl StallFilter {
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn sorted_by(mut self, sort: StallSort) -> Self {
        self.sort = sort;
        self
    }

    fn matches(&self, stall: &Stall) -> bool {
        match &self.location {
            Some(location) => &stall.location == location,
            None => true,
        }
    }
}

pub fn find_stall(stalls: Vec<Stall>, id: &str) -> Option<Stall> {
    stalls.into_iter().find(|s| s.id == id)
}

/// Applies `filter`. Sorting is stable, so ties keep insertion order.
pub fn filter_stalls(stalls: Vec<Stall>, filter: &StallFilter) -> Vec<Stall> {
    let mut stalls: Vec<Stall> = stalls.into_iter().filter(|s| filter.matches(s)).collect();

    match filter.sort {
        StallSort::Rating => stalls.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0))
        }),
        StallSort::Name => stalls.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
    }

    stalls
}

/// Distinct stall locations in alphabetical order.
pub fn distinct_locations(stalls: &[Stall]) -> Vec<String> {
    stalls
        .iter()
        .map(|s| s.location.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn reviews_for_stall(reviews: Vec<Review>, stall_id: &str) -> Vec<Review> {
    reviews.into_iter().filter(|r| r.stall_id == stall_id).collect()
}

pub fn reviews_for_user(reviews: Vec<Review>, user_id: &str) -> Vec<Review> {
    reviews.into_iter().filter(|r| r.user_id == user_id).collect()
}

/// A review alongside the stall it belongs to, if that stall still exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewWithStall {
    pub review: Review,
    pub stall: Option<Stall>,
}

pub fn join_stalls(reviews: Vec<Review>, stalls: &[Stall]) -> Vec<ReviewWithStall> {
    reviews
        .into_iter()
        .map(|review| {
            let stall = stalls.iter().find(|s| s.id == review.stall_id).cloned();
            ReviewWithStall { review, stall }
        })
        .collect()
}
