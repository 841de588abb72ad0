use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::metrics::{NpsMetrics, Rating, RatingDistribution};

// ============ Survey API Models ============

/// One response item as listed by the survey API.
///
/// Fields the pipeline does not look at are kept in `extra` untouched. A
/// single odd item must not fail the whole listing, so the known fields are
/// read leniently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponseRecord {
    /// Response identifier used for the detail lookup. Empty when the API
    /// omitted it.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Whether the respondent completed the survey. Null or missing is false.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub finished: bool,
    /// Creation timestamp exactly as the API sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    /// Expanded record, present only after a successful detail lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ResponseDetail>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Expanded response record returned by the detail endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseDetail {
    /// Answers keyed by question id, in the order the API sent them.
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of the paginated response listing.
#[derive(Debug, Clone, Default)]
pub struct ResponsePage {
    pub items: Vec<SurveyResponseRecord>,
}

impl ResponsePage {
    /// A full page means there may be more; a short page is the last one.
    pub fn has_more(&self, limit: usize) -> bool {
        self.items.len() >= limit
    }
}

/// Survey as listed by the management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Strings that may arrive as numbers or null. Null becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Loosely typed flag, read by truthiness. Null is false.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    })
}

// ============ Summary Models ============

/// Flattened rating distribution plus derived metrics, as served to the
/// dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpsData {
    pub total: i128,
    pub count: u64,
    pub values: BTreeMap<Rating, u64>,
    pub average: f64,
    pub weighted_average: f64,
    pub nps_score: f64,
    pub promoters: u64,
    pub passives: u64,
    pub detractors: u64,
}

impl NpsData {
    pub fn new(distribution: RatingDistribution, metrics: NpsMetrics) -> Self {
        Self {
            total: distribution.total,
            count: distribution.count,
            values: distribution.values,
            average: metrics.average,
            weighted_average: metrics.weighted_average,
            nps_score: metrics.nps_score,
            promoters: metrics.promoters,
            passives: metrics.passives,
            detractors: metrics.detractors,
        }
    }
}

/// Per-survey summary returned by `GET /api/responses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSummary {
    /// Number of response records fetched.
    pub total: usize,
    pub finished: usize,
    pub unfinished: usize,
    /// Raw `createdAt` of the first listed (most recent) response.
    pub last_response: Option<Value>,
    pub nps_data: NpsData,
}

// ============ API Request/Response Models ============

/// Query parameters for `GET /api/responses`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsesQuery {
    pub survey_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryEnvelope {
    pub summary: ResponseSummary,
}

#[derive(Debug, Serialize)]
pub struct SurveysEnvelope {
    pub surveys: Vec<Survey>,
}

#[derive(Debug, Serialize)]
pub struct SurveyEnvelope {
    pub survey: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_detail_order_and_unknown_fields() {
        let record: SurveyResponseRecord = serde_json::from_value(json!({
            "id": "r1",
            "finished": true,
            "createdAt": "2024-09-01T12:00:00.000Z",
            "surveyId": "s1",
            "details": {
                "data": { "zeta": "9", "alpha": "clicked" },
                "ttc": {}
            }
        }))
        .unwrap();

        assert!(record.finished);
        assert_eq!(record.extra["surveyId"], "s1");
        let keys: Vec<&String> = record.details.as_ref().unwrap().data.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_record_defaults_when_fields_missing() {
        let record: SurveyResponseRecord = serde_json::from_value(json!({ "id": "r2" })).unwrap();
        assert!(!record.finished);
        assert!(record.created_at.is_none());
        assert!(record.details.is_none());
    }

    #[test]
    fn test_record_tolerates_odd_fields() {
        let record: SurveyResponseRecord = serde_json::from_value(json!({
            "finished": null,
            "createdAt": "2024-10-01 09:30:00"
        }))
        .unwrap();
        assert_eq!(record.id, "");
        assert!(!record.finished);
        assert_eq!(record.created_at, Some(json!("2024-10-01 09:30:00")));

        let record: SurveyResponseRecord =
            serde_json::from_value(json!({ "id": 42, "finished": 1 })).unwrap();
        assert_eq!(record.id, "42");
        assert!(record.finished);
    }

    #[test]
    fn test_created_at_kept_verbatim() {
        let record: SurveyResponseRecord = serde_json::from_value(json!({
            "id": "r3",
            "createdAt": "2024-09-01T12:00:00.000Z"
        }))
        .unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["createdAt"], "2024-09-01T12:00:00.000Z");
    }

    #[test]
    fn test_page_has_more_only_when_full() {
        let page = ResponsePage {
            items: vec![SurveyResponseRecord::default(); 3],
        };
        assert!(page.has_more(3));
        assert!(!page.has_more(4));
    }
}
