//! Pulls the scored answer out of an enriched response.
//!
//! The scored question is assumed to be the first real answer in the detail
//! payload. Welcome-card entries and "clicked" call-to-action markers are not
//! answers and are skipped before picking it. Whatever remains first must be a
//! number, otherwise the response simply has no rating.

use serde_json::{Map, Value};

use crate::metrics::Rating;
use crate::models::SurveyResponseRecord;

const WELCOME_CARD_MARKER: &str = "welcomeCard";
const CLICKED_MARKER: &str = "clicked";

/// Rating carried by an enriched record, if any.
pub fn extract_rating(record: &SurveyResponseRecord) -> Option<Rating> {
    record
        .details
        .as_ref()
        .and_then(|details| first_answer(&details.data))
        .and_then(parse_rating)
}

/// First entry that is neither a welcome card nor a "clicked" marker, in the
/// order the API sent them.
pub fn first_answer(data: &Map<String, Value>) -> Option<&Value> {
    data.iter()
        .find(|(key, value)| !is_excluded(key, value))
        .map(|(_, value)| value)
}

fn is_excluded(key: &str, value: &Value) -> bool {
    key.contains(WELCOME_CARD_MARKER) || value.as_str() == Some(CLICKED_MARKER)
}

/// Accepts JSON numbers and numeric strings whose value is a finite integer.
pub fn parse_rating(value: &Value) -> Option<Rating> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };

    // Ratings key an integer distribution, so "7.5" is not a rating.
    if !number.is_finite() || number.fract() != 0.0 {
        return None;
    }
    if number < Rating::MIN as f64 || number > Rating::MAX as f64 {
        return None;
    }
    Some(number as Rating)
}
