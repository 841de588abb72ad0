//! Rating distribution and promoter/passive/detractor tallies.
//!
//! Two classifications live here on purpose. [`classify_for_summary`] is the
//! three-way split shown on the dashboard, while [`classify_for_nps`] is the
//! two-sided split the score formula uses, where 7 and 8 count for neither
//! side. They agree on promoters and detractors today but are kept apart so
//! either can change without touching the other.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring;

/// A single extracted rating. Nominally 0-10 but never clamped.
pub type Rating = i64;

/// Bucket a rating falls into for the summary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryClass {
    Promoter,
    Passive,
    Detractor,
}

/// Side of the NPS formula a rating counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpsSide {
    Promoter,
    Detractor,
}

/// Summary classification: 9 and up promote, 7-8 are passive, the rest detract.
pub fn classify_for_summary(rating: Rating) -> SummaryClass {
    if rating >= 9 {
        SummaryClass::Promoter
    } else if rating >= 7 {
        SummaryClass::Passive
    } else {
        SummaryClass::Detractor
    }
}

/// NPS classification: 9 and up promote, 6 and below detract, 7-8 are ignored.
pub fn classify_for_nps(rating: Rating) -> Option<NpsSide> {
    if rating >= 9 {
        Some(NpsSide::Promoter)
    } else if rating <= 6 {
        Some(NpsSide::Detractor)
    } else {
        None
    }
}

/// Frequency distribution of valid ratings.
///
/// `count` always equals the sum of `values`, and `total` the sum of
/// `rating * occurrences`. Ratings are unbounded `i64`s, so `total` is kept
/// as `i128` and saturates rather than wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDistribution {
    pub count: u64,
    pub values: BTreeMap<Rating, u64>,
    pub total: i128,
}

impl RatingDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, rating: Rating) {
        self.count += 1;
        self.total = self.total.saturating_add(i128::from(rating));
        *self.values.entry(rating).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates `(rating, occurrences)` in ascending rating order.
    pub fn iter(&self) -> impl Iterator<Item = (Rating, u64)> + '_ {
        self.values.iter().map(|(rating, n)| (*rating, *n))
    }
}

impl FromIterator<Rating> for RatingDistribution {
    fn from_iter<I: IntoIterator<Item = Rating>>(iter: I) -> Self {
        let mut distribution = RatingDistribution::new();
        for rating in iter {
            distribution.record(rating);
        }
        distribution
    }
}

/// Promoter/passive/detractor counts using the summary classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassTally {
    pub promoters: u64,
    pub passives: u64,
    pub detractors: u64,
}

impl ClassTally {
    pub fn from_distribution(distribution: &RatingDistribution) -> Self {
        let mut tally = ClassTally::default();
        for (rating, n) in distribution.iter() {
            match classify_for_summary(rating) {
                SummaryClass::Promoter => tally.promoters += n,
                SummaryClass::Passive => tally.passives += n,
                SummaryClass::Detractor => tally.detractors += n,
            }
        }
        tally
    }
}

/// Metrics derived from a [`RatingDistribution`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NpsMetrics {
    pub average: f64,
    pub nps_score: f64,
    pub weighted_average: f64,
    pub promoters: u64,
    pub passives: u64,
    pub detractors: u64,
}

impl NpsMetrics {
    pub fn compute(distribution: &RatingDistribution) -> Self {
        let tally = ClassTally::from_distribution(distribution);
        Self {
            average: scoring::simple_average(distribution),
            nps_score: scoring::nps_score(distribution),
            weighted_average: scoring::weighted_average(distribution),
            promoters: tally.promoters,
            passives: tally.passives,
            detractors: tally.detractors,
        }
    }
}
