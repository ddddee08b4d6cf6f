//! Keeps each stall's `rating` equal to the mean of its reviews.

use crate::model::{Review, Stall};

/// Mean rating of the reviews for `stall_id`, `None` if there are none.
pub fn mean_rating<'a, I>(reviews: I, stall_id: &str) -> Option<f64>
where
    I: IntoIterator<Item = &'a Review>,
{
    let (sum, count) = reviews
        .into_iter()
        .filter(|r| r.stall_id == stall_id)
        .fold((0u64, 0u64), |(sum, count), r| (sum + r.rating as u64, count + 1));

    if count == 0 {
        return None;
    }
    Some(sum as f64 / count as f64)
}

/// Recomputes the rating of `stall_id` inside `stalls`.
///
/// Returns true when the stall exists and has reviews, meaning the
/// collection changed and needs writing back. A stall with no reviews
/// keeps whatever rating it had.
pub fn recompute(stalls: &mut [Stall], reviews: &[Review], stall_id: &str) -> bool {
    let Some(stall) = stalls.iter_mut().find(|s| s.id == stall_id) else {
        return false;
    };
    match mean_rating(reviews, stall_id) {
        Some(mean) => {
            stall.rating = Some(mean);
            true
        }
        None => false,
    }
}
