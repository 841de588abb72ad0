use crate::metrics::{NpsMetrics, RatingDistribution};
use crate::models::{NpsData, ResponseSummary, SurveyResponseRecord};
use crate::normalizer::extract_rating;

/// Builds the rating distribution for a set of enriched responses.
///
/// Responses without an extractable rating are skipped.
pub fn rating_distribution(records: &[SurveyResponseRecord]) -> RatingDistribution {
    records.iter().filter_map(extract_rating).collect()
}

/// Folds enriched responses into the dashboard summary.
///
/// `last_response` is the raw creation time of the first record, which is the
/// most recent one in the API's listing order.
pub fn summarize(records: &[SurveyResponseRecord]) -> ResponseSummary {
    let distribution = rating_distribution(records);
    let metrics = NpsMetrics::compute(&distribution);
    let finished = records.iter().filter(|r| r.finished).count();

    ResponseSummary {
        total: records.len(),
        finished,
        unfinished: records.len() - finished,
        last_response: records.first().and_then(|r| r.created_at.clone()),
        nps_data: NpsData::new(distribution, metrics),
    }
}
