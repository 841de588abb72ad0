use crate::config::Config;
use crate::errors::{AppError, FetchError, ResultExt};
use crate::fetcher::ResponseFetcher;
use crate::formbricks_client::FormbricksClient;
use crate::models::*;
use crate::summary::summarize;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Formbricks client used for the survey catalogue.
    pub client: FormbricksClient,
    /// Paginating fetcher over the same client, used for metrics.
    pub fetcher: ResponseFetcher<FormbricksClient>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let client = FormbricksClient::from_config(&config)?;
        let fetcher = ResponseFetcher::from_config(client.clone(), &config);
        Ok(Self {
            config,
            client,
            fetcher,
        })
    }
}

/// Routes served under `/api`, without the security middleware.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/responses", get(get_responses_summary))
        .route("/api/surveys", get(list_surveys))
        .route("/api/surveys/:id", get(get_survey))
        .route("/api/webhook", post(webhook))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "nps-dashboard",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/responses?surveyId=...
///
/// Fetches every response of the survey, enriches them and returns the NPS
/// summary. Any listing failure fails the whole request; failed detail lookups
/// only reduce the number of rated responses.
pub async fn get_responses_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResponsesQuery>,
) -> Result<Json<SummaryEnvelope>, AppError> {
    let survey_id = params
        .survey_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Survey ID is required".to_string()))?;

    tracing::info!("Fetching responses for survey: {}", survey_id);

    let records = state.fetcher.fetch_all(&survey_id).await?;
    let summary = summarize(&records);

    tracing::info!(
        "Survey {}: {} responses, {} rated, NPS {:.2}",
        survey_id,
        summary.total,
        summary.nps_data.count,
        summary.nps_data.nps_score
    );

    Ok(Json(SummaryEnvelope { summary }))
}

/// GET /api/surveys
pub async fn list_surveys(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SurveysEnvelope>, AppError> {
    let surveys = state
        .client
        .list_surveys()
        .await
        .context("Failed to list surveys")?;
    Ok(Json(SurveysEnvelope { surveys }))
}

/// GET /api/surveys/:id
///
/// An upstream 404 is passed on as 404; any other failure is a 502.
pub async fn get_survey(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SurveyEnvelope>, AppError> {
    match state.client.get_survey(&id).await {
        Ok(survey) => Ok(Json(SurveyEnvelope { survey })),
        Err(FetchError::Status { status: 404, .. }) => {
            Err(AppError::NotFound(format!("Survey {} not found", id)))
        }
        Err(e) => Err(e).context(format!("Failed to fetch survey {}", id)),
    }
}

/// POST /api/webhook
///
/// Acknowledges survey webhooks. The payload is only logged.
pub async fn webhook(Json(payload): Json<Value>) -> (StatusCode, Json<Value>) {
    tracing::info!("Webhook payload received: {}", payload);
    (StatusCode::OK, Json(json!({ "success": true })))
}
