//! HTTP calendar adapter
//!
//! Reads scheduled posts from the scheduling API. Requests carry an
//! optional bearer key and are retried with exponential backoff on
//! transport failures, 5xx and 429 responses.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use crate::config::CalendarConfig;
use crate::models::RawPost;
use crate::utils::retry::{with_retry_if, RetryConfig};

use super::{CalendarAdapter, CalendarError, CalendarResult, PostsEnvelope};

// ============================================================================
// Client Configuration
// ============================================================================

/// Connection settings for [`HttpCalendar`]
#[derive(Debug, Clone)]
pub struct HttpCalendarConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Bearer token
    pub api_key: Option<String>,

    /// Path of the posts listing endpoint
    pub posts_path: String,

    /// Path requested by the connectivity check
    pub health_path: String,

    /// Request timeout
    pub timeout: Duration,

    /// Backoff policy
    pub retry: RetryConfig,
}

impl HttpCalendarConfig {
    /// Create a config with default paths and timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            posts_path: "/posts".to_string(),
            health_path: "/health".to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }

    /// Set bearer key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl From<&CalendarConfig> for HttpCalendarConfig {
    fn from(config: &CalendarConfig) -> Self {
        let mut http = Self::new(config.base_url.clone())
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
            .with_retry(RetryConfig::with_delays(
                config.max_retries,
                config.retry_base_delay_ms,
                config.retry_base_delay_ms.saturating_mul(16),
            ));
        http.api_key = config.api_key.clone().filter(|k| !k.is_empty());
        http.posts_path = config.posts_path.clone();
        http.health_path = config.health_path.clone();
        http
    }
}

// ============================================================================
// HTTP Calendar
// ============================================================================

/// Calendar adapter backed by the scheduling API
pub struct HttpCalendar {
    config: HttpCalendarConfig,
    http_client: Client,
}

impl HttpCalendar {
    /// Create an adapter
    pub fn new(config: HttpCalendarConfig) -> CalendarResult<Self> {
        if config.base_url.is_empty() {
            return Err(CalendarError::InvalidConfig(
                "calendar base_url is empty".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("cadence/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CalendarError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.config.base_url, path)
        } else {
            format!("{}/{}", self.config.base_url, path)
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn fetch_posts_once(&self, start: NaiveDate, end: NaiveDate) -> CalendarResult<Vec<RawPost>> {
        let request = self
            .http_client
            .get(self.url(&self.config.posts_path))
            .query(&[
                ("startDate", start.format("%Y-%m-%d").to_string()),
                ("endDate", end.format("%Y-%m-%d").to_string()),
            ]);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| CalendarError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: PostsEnvelope = response
            .json()
            .await
            .map_err(|e| CalendarError::Decode(e.to_string()))?;

        Ok(envelope.into_posts())
    }

    async fn check_health_once(&self) -> CalendarResult<()> {
        let request = self.http_client.get(self.url(&self.config.health_path));
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| CalendarError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CalendarError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl CalendarAdapter for HttpCalendar {
    fn name(&self) -> &str {
        "http"
    }

    async fn test_connection(&self) -> CalendarResult<()> {
        with_retry_if(&self.config.retry, || self.check_health_once(), CalendarError::is_transient)
            .await
            .map_err(|e| CalendarError::Unavailable(e.to_string()))
    }

    async fn get_scheduled_posts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CalendarResult<Vec<RawPost>> {
        let posts = with_retry_if(
            &self.config.retry,
            || self.fetch_posts_once(start, end),
            CalendarError::is_transient,
        )
        .await?;

        tracing::debug!(
            start = %start,
            end = %end,
            count = posts.len(),
            "Fetched scheduled posts"
        );
        Ok(posts)
    }
}

// ============================================================================
// Tests
// ============================================================================
