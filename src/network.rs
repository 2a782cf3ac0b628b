use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

/// Fetch capability consumed by the worker pool. The crawl core never opens
/// sockets itself; everything it knows about the network arrives through this
/// seam, which also makes workers testable against canned responses.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResult, FetchError>> + Send;
}

/// Materialized outcome of one HTTP fetch. Non-2xx statuses are returned
/// here rather than as errors; page admission decides what to do with them.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors that can occur during HTTP fetching. All of them are per-URL
/// failures: the URL is retired without retry and the crawl continues.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection refused - server not accepting connections")]
    ConnectionRefused,

    #[error("DNS resolution failed")]
    DnsError,

    #[error("SSL/TLS error - certificate or encryption issue")]
    SslError,

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to read response body: {0}")]
    BodyError(String),

    #[error("Content too large: {0} bytes (max: {1} bytes)")]
    ContentTooLarge(usize, usize),
}

/// HTTP client for making web requests
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout_duration: Duration,
    max_content_size: usize,
}

impl HttpClient {
    const DEFAULT_MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024; // 10MB

    /// Create a new HTTP client with settings tuned for crawling
    pub fn new(user_agent: String, timeout_secs: u64) -> Self {
        Self::with_content_limit(user_agent, timeout_secs, Self::DEFAULT_MAX_CONTENT_SIZE)
    }

    /// Create a new HTTP client with a custom content size limit
    pub fn with_content_limit(
        user_agent: String,
        timeout_secs: u64,
        max_content_size: usize,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout_duration: Duration::from_secs(timeout_secs),
            max_content_size,
        }
    }

    /// Fetch a URL once and buffer its body. Failed fetches are terminal for
    /// that URL; the frontier treats "attempted" as complete, so there is no
    /// retry loop here.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchResult, FetchError> {
        let response = timeout(
            self.timeout_duration,
            self.client
                .get(url)
                .header(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header("Accept-Language", "en-US,en;q=0.5")
                .send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(Self::classify_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        // Reject oversized bodies from the header before downloading them.
        if let Some(content_length) = response.headers().get("content-length") {
            if let Ok(length) = content_length
                .to_str()
                .unwrap_or_default()
                .parse::<usize>()
            {
                if length > self.max_content_size {
                    return Err(FetchError::ContentTooLarge(length, self.max_content_size));
                }
            }
        }

        let body = timeout(self.timeout_duration, response.text())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| FetchError::BodyError(e.to_string()))?;

        if body.len() > self.max_content_size {
            return Err(FetchError::ContentTooLarge(body.len(), self.max_content_size));
        }

        Ok(FetchResult {
            status,
            content_type,
            body,
        })
    }

    /// Classify reqwest errors into our FetchError types
    fn classify_error(error: reqwest::Error) -> FetchError {
        let error_msg = error.to_string().to_lowercase();

        if error_msg.contains("connection refused") {
            return FetchError::ConnectionRefused;
        }

        if error_msg.contains("dns") || error_msg.contains("name resolution") {
            return FetchError::DnsError;
        }

        if error_msg.contains("ssl") || error_msg.contains("tls") || error_msg.contains("certificate")
        {
            return FetchError::SslError;
        }

        if error.is_timeout() {
            return FetchError::Timeout;
        }

        FetchError::NetworkError(error.to_string())
    }
}

impl Fetcher for HttpClient {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResult, FetchError>> + Send {
        self.fetch_page(url)
    }
}
