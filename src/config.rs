use serde::Deserialize;

/// Runtime configuration, read once at start-up and handed to the clients that
/// need it.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub formbricks_api_key: String,
    pub formbricks_base_url: String,
    pub page_size: usize,
    pub detail_concurrency: usize,
    pub http_timeout_secs: u64,
    pub excluded_survey_ids: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            formbricks_api_key: std::env::var("FORMBRICKS_API_KEY")
                .or_else(|_| std::env::var("NEXT_PUBLIC_FORMBRICKS_API_KEY"))
                .map_err(|_| {
                    anyhow::anyhow!(
                        "FORMBRICKS_API_KEY or NEXT_PUBLIC_FORMBRICKS_API_KEY environment variable required"
                    )
                })
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("FORMBRICKS_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            formbricks_base_url: std::env::var("FORMBRICKS_URL")
                .or_else(|_| std::env::var("NEXT_PUBLIC_FORMBRICKS_URL"))
                .map_err(|_| {
                    anyhow::anyhow!(
                        "FORMBRICKS_URL or NEXT_PUBLIC_FORMBRICKS_URL environment variable required"
                    )
                })
                .and_then(|raw| validate_base_url(&raw))?,
            page_size: parse_positive("RESPONSES_PAGE_SIZE", 100)?,
            detail_concurrency: parse_positive("DETAIL_CONCURRENCY", 16)?,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a number of seconds"))?,
            excluded_survey_ids: std::env::var("EXCLUDED_SURVEY_IDS")
                .map(|raw| parse_id_list(&raw))
                .unwrap_or_default(),
        };

        // Never log the API key
        tracing::debug!("Formbricks Base URL: {}", config.formbricks_base_url);
        tracing::debug!(
            "Page size: {}, detail concurrency: {}, timeout: {}s",
            config.page_size,
            config.detail_concurrency,
            config.http_timeout_secs
        );
        tracing::debug!("Excluded surveys: {:?}", config.excluded_survey_ids);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// Checks that the base URL is an absolute http(s) URL and strips any trailing
/// slash so paths can be appended with `format!`.
fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("FORMBRICKS_URL cannot be empty");
    }
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| anyhow::anyhow!("FORMBRICKS_URL is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("FORMBRICKS_URL must start with http:// or https://");
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_positive(name: &str, default: usize) -> anyhow::Result<usize> {
    let value: usize = match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a positive integer", name))?,
        Err(_) => default,
    };
    if value == 0 {
        anyhow::bail!("{} must be at least 1", name);
    }
    Ok(value)
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}
