//! HTTP client with bounded retries.
//!
//! Server errors (5xx), 429 responses and connect failures are retried with
//! exponential backoff; everything else is returned to the caller as-is.

use std::time::Duration;

use interconnect_domain::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS};
use interconnect_domain::InterconnectError;
use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with built-in retry and timeout support.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: u32,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying transient failures.
    ///
    /// The last response is returned whatever its status; only transport
    /// failures become errors.
    ///
    /// # Errors
    ///
    /// `Network`/`Timeout` when no attempt produced a response, `Internal`
    /// when the request body cannot be replayed.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, InterconnectError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 1..=attempts {
            let last = attempt == attempts;
            let request = replay(&builder)?;
            let target = format!("{} {}", request.method(), request.url());

            match self.client.execute(request).await {
                Ok(response) if !last && is_retryable_status(response.status()) => {
                    debug!(attempt, %target, status = %response.status(), "retrying after status");
                }
                Ok(response) => {
                    debug!(attempt, %target, status = %response.status(), "response received");
                    return Ok(response);
                }
                Err(err) if !last && is_retryable_transport(&err) => {
                    debug!(attempt, %target, error = %err, "retrying after transport error");
                }
                Err(err) => return Err(InfraError::from(err).into()),
            }

            let delay = self.backoff_delay(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Err(InterconnectError::Internal("retry loop ended without an outcome".into()))
    }

    /// Delay before retry number `retry` (1-based), doubling each time
    fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(8);
        self.base_backoff.saturating_mul(2u32.pow(exponent))
    }
}

fn replay(builder: &RequestBuilder) -> Result<reqwest::Request, InterconnectError> {
    builder
        .try_clone()
        .ok_or_else(|| InterconnectError::Internal("request body cannot be replayed".into()))?
        .build()
        .map_err(|err| InfraError::from(err).into())
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(200),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts (initial try + retries), at least 1.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub const fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Headers sent with every request
    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// # Errors
    ///
    /// Returns an error when the TLS backend cannot be initialised.
    pub fn build(self) -> Result<HttpClient, InterconnectError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| InterconnectError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn is_retryable_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
