/// Router-level tests: handlers wired to a mocked Formbricks API
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use nps_dashboard::config::Config;
use nps_dashboard::handlers::{api_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(base_url: String) -> Config {
    Config {
        port: 8080,
        formbricks_api_key: "test_key".to_string(),
        formbricks_base_url: base_url,
        page_size: 100,
        detail_concurrency: 8,
        http_timeout_secs: 5,
        excluded_survey_ids: Vec::new(),
    }
}

fn app_for(server: &MockServer) -> axum::Router {
    let config = create_test_config(format!("{}/api/v1", server.uri()));
    api_router(Arc::new(AppState::new(config).unwrap()))
}

async fn call(app: axum::Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_responses_requires_survey_id() {
    let server = MockServer::start().await;
    let (status, body) = call(app_for(&server), "GET", "/api/responses", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Survey ID is required");
}

#[tokio::test]
async fn test_responses_summary_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/management/responses"))
        .and(query_param("surveyId", "s1"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "r1", "finished": true, "createdAt": "2024-10-02T10:00:00Z" },
                { "id": "r2", "finished": false, "createdAt": "2024-10-01T10:00:00Z" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/management/responses/r1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "data": { "nps": 9, "why": "fast" } } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/management/responses/r2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "data": { "nps": "7" } } })),
        )
        .mount(&server)
        .await;

    let (status, body) = call(
        app_for(&server),
        "GET",
        "/api/responses?surveyId=s1",
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let summary = &body["summary"];
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["finished"], 1);
    assert_eq!(summary["unfinished"], 1);
    assert_eq!(summary["lastResponse"], "2024-10-02T10:00:00Z");
    assert_eq!(summary["npsData"]["count"], 2);
    assert_eq!(summary["npsData"]["total"], 16);
    assert_eq!(summary["npsData"]["values"], json!({ "7": 1, "9": 1 }));
    assert_eq!(summary["npsData"]["promoters"], 1);
    assert_eq!(summary["npsData"]["passives"], 1);
    assert_eq!(summary["npsData"]["detractors"], 0);
    assert_eq!(summary["npsData"]["npsScore"], 50.0);
    assert_eq!(summary["npsData"]["average"], 8.0);
}

#[tokio::test]
async fn test_responses_fetch_failure_reports_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/management/responses"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let (status, body) = call(
        app_for(&server),
        "GET",
        "/api/responses?surveyId=s1",
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch responses");
    assert!(body["details"].as_str().unwrap().contains("503"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_get_survey_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/management/surveys/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (status, _) = call(
        app_for(&server),
        "GET",
        "/api/surveys/missing",
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_survey_passthrough() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/management/surveys/s1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": "s1", "name": "NPS" } })),
        )
        .mount(&server)
        .await;

    let (status, body) = call(app_for(&server), "GET", "/api/surveys/s1", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["survey"]["data"]["name"], "NPS");
}

#[tokio::test]
async fn test_list_surveys_upstream_failure_is_bad_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/management/surveys"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (status, body) = call(app_for(&server), "GET", "/api/surveys", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "External service error");
    assert!(body["details"].as_str().unwrap().contains("500"));
    assert!(body.get("timestamp").is_none());
}

#[tokio::test]
async fn test_get_survey_upstream_failure_is_bad_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/management/surveys/s1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (status, body) = call(app_for(&server), "GET", "/api/surveys/s1", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_ne!(body["error"], "Failed to fetch responses");
    assert_eq!(body["error"], "External service error");
}

#[tokio::test]
async fn test_webhook_acknowledges() {
    let server = MockServer::start().await;
    let (status, body) = call(
        app_for(&server),
        "POST",
        "/api/webhook",
        Body::from(r#"{"event":"responseFinished"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let (status, body) = call(app_for(&server), "GET", "/health", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
