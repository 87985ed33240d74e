//! HTTP transport
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building one shared HTTP client with uniform headers and timeouts
//! - GET and form-encoded POST requests
//! - Bounded exponential-backoff retries for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single logical request, after any retries
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a status that is not worth retrying
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Every allowed attempt failed with a transient error
    #[error("gave up on {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

impl FetchError {
    /// The HTTP status, when the failure was a non-retryable status
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Exhausted { .. } => None,
        }
    }
}

/// A successful response with its body read
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub body: String,
    /// Attempts used, including the successful one
    pub attempts: u32,
}

/// Retry budget and backoff schedule
///
/// Attempt *k* (0-based) that fails transiently is followed by a wait of
/// `backoff_base * 2^k` before attempt *k + 1*.
///
/// # Backoff schedule (example with `backoff_base = 1s`, `max_retries = 3`)
///
/// | Failed attempt | Wait before next attempt |
/// |----------------|--------------------------|
/// | 0 (initial)    | 1 s                      |
/// | 1              | 2 s                      |
/// | 2              | 4 s                      |
/// | 3              | — (exhausted)            |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.max_retries, config.backoff_base())
    }

    /// Upper bound on requests issued for one logical fetch
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Wait after failed attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(1u32 << attempt.min(31))
    }

    /// All waits a fully exhausted fetch goes through, in order
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries).map(|k| self.delay_for(k)).collect()
    }

    /// Total time spent waiting by a fully exhausted fetch
    pub fn total_backoff(&self) -> Duration {
        self.schedule().into_iter().sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Returns true for HTTP statuses that signal a transient server condition
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Outcome of one attempt that did not succeed
enum AttemptFailure {
    Transient(String),
    Fatal(u16),
}

/// Builds an HTTP client with proper configuration
///
/// The client keeps a cookie store: stateful listing widgets bind their
/// continuation token to the server-side session cookie.
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::UserAgentConfig;
/// use catalog_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(config.value.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues requests with uniform headers, a timeout, and bounded retries
///
/// Stateless across calls apart from connection reuse and the session cookie
/// jar held by the client.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    policy: RetryPolicy,
}

impl Transport {
    /// Creates a transport from the crawler and user agent configuration
    pub fn new(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler.request_timeout())?;
        Ok(Self::with_client(client, RetryPolicy::from_config(crawler)))
    }

    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL with a plain GET
    pub async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.fetch(url, Method::GET, None, None).await
    }

    /// Submits a form-encoded POST
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
        headers: &HeaderMap,
    ) -> Result<FetchResponse, FetchError> {
        self.fetch(url, Method::POST, Some(form), Some(headers)).await
    }

    /// Fetches a URL with full error handling and retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the response |
    /// | 408, 429, 500, 502, 503, 504 | Retry with backoff |
    /// | Timeout, connection error, body read error | Retry with backoff |
    /// | Any other status | Immediate `FetchError::Status` |
    /// | Retries exhausted | `FetchError::Exhausted` |
    ///
    /// No more than `max_retries + 1` requests are sent.
    pub async fn fetch(
        &self,
        url: &str,
        method: Method,
        form: Option<&[(String, String)]>,
        headers: Option<&HeaderMap>,
    ) -> Result<FetchResponse, FetchError> {
        let mut attempt = 0u32;

        loop {
            let last_error = match self.send_once(url, &method, form, headers).await {
                Ok(mut response) => {
                    response.attempts = attempt + 1;
                    return Ok(response);
                }
                Err(AttemptFailure::Fatal(status)) => {
                    tracing::debug!("{} {} -> HTTP {} (not retried)", method, url, status);
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                Err(AttemptFailure::Transient(error)) => error,
            };

            if attempt >= self.policy.max_retries {
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts: attempt + 1,
                    last_error,
                });
            }

            let delay = self.policy.delay_for(attempt);
            tracing::warn!(
                attempt,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %last_error,
                "Transient error for {}, retrying after backoff",
                url
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        url: &str,
        method: &Method,
        form: Option<&[(String, String)]>,
        headers: Option<&HeaderMap>,
    ) -> Result<FetchResponse, AttemptFailure> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }
        if let Some(form) = form {
            request = request.form(form);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AttemptFailure::Transient(classify_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(if is_retryable_status(status) {
                AttemptFailure::Transient(format!("HTTP {}", status.as_u16()))
            } else {
                AttemptFailure::Fatal(status.as_u16())
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptFailure::Transient(classify_error(&e)))?;

        Ok(FetchResponse {
            url: final_url,
            status: status.as_u16(),
            body,
            attempts: 0,
        })
    }
}

/// Describes a transport-level error for logs and reports
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}
