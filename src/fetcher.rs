//! Paginated response retrieval with best-effort detail enrichment.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::errors::FetchError;
use crate::models::{ResponseDetail, ResponsePage, SurveyResponseRecord};

/// Pages fetched per survey before giving up on completeness.
pub const MAX_PAGES: u32 = 10;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 16;

/// Where survey responses come from.
#[async_trait]
pub trait ResponseSource: Send + Sync {
    /// Lists one page of responses. Pages start at 1.
    async fn list_responses(
        &self,
        survey_id: &str,
        page: u32,
        limit: usize,
    ) -> Result<ResponsePage, FetchError>;

    /// Fetches the expanded record for one response.
    async fn get_response_detail(&self, response_id: &str) -> Result<ResponseDetail, FetchError>;
}

/// Collects every response of a survey and attaches its detail record.
#[derive(Clone)]
pub struct ResponseFetcher<S> {
    source: S,
    page_size: usize,
    detail_concurrency: usize,
}

impl<S: ResponseSource> ResponseFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
        }
    }

    pub fn from_config(source: S, config: &Config) -> Self {
        Self::new(source)
            .with_page_size(config.page_size)
            .with_detail_concurrency(config.detail_concurrency)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_detail_concurrency(mut self, concurrency: usize) -> Self {
        self.detail_concurrency = concurrency.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Lists all responses of the survey and enriches each one.
    pub async fn fetch_all(
        &self,
        survey_id: &str,
    ) -> Result<Vec<SurveyResponseRecord>, FetchError> {
        let listed = self.list_all(survey_id).await?;
        tracing::info!(
            "Total responses fetched for survey {}: {}",
            survey_id,
            listed.len()
        );
        Ok(self.enrich(listed).await)
    }

    /// Walks the listing page by page until a short page or the page cap.
    ///
    /// Results past `MAX_PAGES * page_size` are silently dropped.
    pub async fn list_all(
        &self,
        survey_id: &str,
    ) -> Result<Vec<SurveyResponseRecord>, FetchError> {
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let batch = self
                .source
                .list_responses(survey_id, page, self.page_size)
                .await?;
            let more = batch.has_more(self.page_size);
            records.extend(batch.items);

            if !more {
                break;
            }

            page += 1;
            if page > MAX_PAGES {
                tracing::warn!(
                    "Reached maximum page limit ({}) for survey {}, results truncated",
                    MAX_PAGES,
                    survey_id
                );
                break;
            }
        }

        Ok(records)
    }

    /// Attaches detail records concurrently, keeping the listing order.
    ///
    /// A failed lookup leaves that record unenriched; it never fails the batch.
    pub async fn enrich(&self, records: Vec<SurveyResponseRecord>) -> Vec<SurveyResponseRecord> {
        let source = &self.source;

        let enriched: Vec<SurveyResponseRecord> = stream::iter(records)
            .map(|mut record| async move {
                if record.id.is_empty() {
                    tracing::debug!("Skipping detail lookup for response without id");
                    return record;
                }
                let lookup = source.get_response_detail(&record.id).await;
                match lookup {
                    Ok(detail) => record.details = Some(detail),
                    Err(e) => {
                        tracing::warn!("Failed to fetch details for response {}: {}", record.id, e);
                    }
                }
                record
            })
            .buffered(self.detail_concurrency)
            .collect()
            .await;

        let missing = enriched.iter().filter(|r| r.details.is_none()).count();
        if missing > 0 {
            tracing::debug!("{} of {} responses left unenriched", missing, enriched.len());
        }

        enriched
    }
}
