//! Outbound HTTP shared by every source adapter.
//!
//! Requests carry a browser-like header set, follow redirects and give up
//! after a fixed per-request timeout. Any non-2xx status is a [`FetchError`].

use crate::utils::error::FetchError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::{redirect, Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

#[derive(Debug, Clone)]
pub struct FetchClientBuilder {
    timeout: Duration,
    user_agent: String,
    extra_headers: Vec<(String, String)>,
}

impl Default for FetchClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: BROWSER_USER_AGENT.to_string(),
            extra_headers: Vec::new(),
        }
    }
}

impl FetchClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header on top of the browser defaults (e.g. a site-specific Referer).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<FetchClient, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        for (name, value) in &self.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::Client {
                message: format!("invalid header name '{}': {}", name, e),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| FetchError::Client {
                message: format!("invalid value for header '{}': {}", name, e),
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .default_headers(headers)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Client {
                message: e.to_string(),
            })?;

        Ok(FetchClient { client })
    }
}

impl FetchClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::builder().build()
    }

    pub fn builder() -> FetchClientBuilder {
        FetchClientBuilder::default()
    }

    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.send(url, self.client.get(url)).await
    }

    /// GETs `url` with `params` appended as a query string and returns the body on 2xx.
    pub async fn get_text_with_params<P>(&self, url: &str, params: &P) -> Result<String, FetchError>
    where
        P: Serialize + ?Sized,
    {
        self.send(url, self.client.get(url).query(params)).await
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);
        let response = request.send().await.map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(url, e))
    }
}

fn classify(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
