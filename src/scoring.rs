//! NPS score and confidence-weighted average.

use crate::metrics::{classify_for_nps, NpsSide, RatingDistribution};

/// Sample size at which the confidence factor starts rising from zero.
pub const MIN_RESPONSES: u64 = 1;
/// Sample size at which a survey gets its full, unpenalised average.
pub const MAX_RESPONSES: u64 = 30;
/// Weight applied to the average when the confidence factor is zero.
pub const MIN_WEIGHT: f64 = 0.3;

/// Plain mean of all ratings, 0 for an empty distribution.
pub fn simple_average(distribution: &RatingDistribution) -> f64 {
    if distribution.is_empty() {
        return 0.0;
    }
    distribution.total as f64 / distribution.count as f64
}

/// `((promoters - detractors) / count) * 100`, using the two-sided NPS
/// classification. Always within [-100, 100]; 0 for an empty distribution.
pub fn nps_score(distribution: &RatingDistribution) -> f64 {
    if distribution.is_empty() {
        return 0.0;
    }

    let mut promoters: u64 = 0;
    let mut detractors: u64 = 0;
    for (rating, n) in distribution.iter() {
        match classify_for_nps(rating) {
            Some(NpsSide::Promoter) => promoters += n,
            Some(NpsSide::Detractor) => detractors += n,
            None => {}
        }
    }

    (promoters as f64 - detractors as f64) / distribution.count as f64 * 100.0
}

/// Linear ramp from 0 at `MIN_RESPONSES` to 1 at `MAX_RESPONSES`, clamped.
pub fn confidence_factor(count: u64) -> f64 {
    let raw = (count as f64 - MIN_RESPONSES as f64) / (MAX_RESPONSES - MIN_RESPONSES) as f64;
    raw.clamp(0.0, 1.0)
}

/// Weight in [`MIN_WEIGHT`, 1] applied to the simple average.
pub fn response_weight(count: u64) -> f64 {
    MIN_WEIGHT + (1.0 - MIN_WEIGHT) * confidence_factor(count)
}

/// Simple average discounted by the response weight, so a handful of perfect
/// ratings cannot outrank a large sample with a slightly lower mean.
pub fn weighted_average(distribution: &RatingDistribution) -> f64 {
    if distribution.is_empty() {
        return 0.0;
    }
    simple_average(distribution) * response_weight(distribution.count)
}
