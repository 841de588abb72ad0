use crate::config::Config;
use crate::errors::FetchError;
use crate::fetcher::ResponseSource;
use crate::models::{ResponseDetail, ResponsePage, Survey, SurveyResponseRecord};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

/// Client for the Formbricks management API.
///
/// Every call is authenticated with the `x-api-key` header and bounded by the
/// client-wide timeout.
#[derive(Clone)]
pub struct FormbricksClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    excluded_survey_ids: HashSet<String>,
}

impl FormbricksClient {
    /// Creates a new `FormbricksClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Management API root, e.g. `https://host/api/v1`.
    /// * `api_key` - Key sent in the `x-api-key` header.
    /// * `timeout` - Wall-clock limit for each request.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                FetchError::Transport(format!("Failed to create Formbricks client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            excluded_survey_ids: HashSet::new(),
        })
    }

    /// Builds a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::new(
            config.formbricks_base_url.clone(),
            config.formbricks_api_key.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?
        .with_excluded_surveys(config.excluded_survey_ids.iter().cloned()))
    }

    /// Survey ids that `list_surveys` never returns.
    pub fn with_excluded_surveys<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.excluded_survey_ids.extend(ids);
        self
    }

    /// Lists all surveys, minus the excluded ones.
    ///
    /// A payload without a `data` array yields an empty list.
    pub async fn list_surveys(&self) -> Result<Vec<Survey>, FetchError> {
        let url = format!("{}/management/surveys", self.base_url);
        tracing::info!("Fetching surveys from Formbricks");

        let payload = self.get_json(&url).await?;
        let surveys: Vec<Survey> = match payload.get("data") {
            Some(Value::Array(items)) => serde_json::from_value(Value::Array(items.clone()))
                .map_err(|e| FetchError::MalformedPayload(format!("survey list: {}", e)))?,
            _ => Vec::new(),
        };

        let total = surveys.len();
        let kept: Vec<Survey> = surveys
            .into_iter()
            .filter(|survey| !self.excluded_survey_ids.contains(&survey.id))
            .collect();
        tracing::debug!("Listed {} surveys ({} excluded)", kept.len(), total - kept.len());

        Ok(kept)
    }

    /// Fetches one survey and returns the payload untouched.
    pub async fn get_survey(&self, survey_id: &str) -> Result<Value, FetchError> {
        let url = format!("{}/management/surveys/{}", self.base_url, survey_id);
        tracing::info!("Fetching survey {} from Formbricks", survey_id);
        self.get_json(&url).await
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("Formbricks request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        response.json().await.map_err(|e| {
            FetchError::MalformedPayload(format!("Failed to parse Formbricks response: {}", e))
        })
    }
}

#[async_trait]
impl ResponseSource for FormbricksClient {
    async fn list_responses(
        &self,
        survey_id: &str,
        page: u32,
        limit: usize,
    ) -> Result<ResponsePage, FetchError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/management/responses", self.base_url),
            &[
                ("surveyId", survey_id.to_string()),
                ("limit", limit.to_string()),
                ("page", page.to_string()),
            ],
        )
        .map_err(|e| FetchError::Transport(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Fetching page {} of responses for survey {}", page, survey_id);
        let payload = self.get_json(url.as_str()).await?;

        let items = match payload.get("data") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(FetchError::MalformedPayload(
                    "expected a `data` array of responses".to_string(),
                ))
            }
        };
        let items: Vec<SurveyResponseRecord> = serde_json::from_value(Value::Array(items))
            .map_err(|e| FetchError::MalformedPayload(format!("response item: {}", e)))?;

        Ok(ResponsePage { items })
    }

    async fn get_response_detail(&self, response_id: &str) -> Result<ResponseDetail, FetchError> {
        let url = format!("{}/management/responses/{}", self.base_url, response_id);
        let mut payload = self.get_json(&url).await?;

        let detail = payload
            .get_mut("data")
            .filter(|data| data.is_object())
            .map(Value::take)
            .ok_or_else(|| {
                FetchError::MalformedPayload(format!(
                    "detail for response {} has no `data` object",
                    response_id
                ))
            })?;

        serde_json::from_value(detail)
            .map_err(|e| FetchError::MalformedPayload(format!("response detail: {}", e)))
    }
}
