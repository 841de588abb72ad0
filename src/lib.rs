//! NPS Dashboard Library
//!
//! Fetches survey responses from the Formbricks management API and turns them
//! into Net Promoter Score metrics for the dashboard.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `fetcher`: Paginated response retrieval and detail enrichment.
//! - `formbricks_client`: Formbricks management API client.
//! - `handlers`: HTTP request handlers.
//! - `metrics`: Rating distribution and classification.
//! - `models`: API and summary data models.
//! - `normalizer`: Rating extraction from response details.
//! - `scoring`: NPS score and confidence-weighted average.
//! - `summary`: Per-survey summary builder.

pub mod config;
pub mod errors;
pub mod fetcher;
pub mod formbricks_client;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod normalizer;
pub mod scoring;
pub mod summary;
