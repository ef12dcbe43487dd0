//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with timeouts and compression
//! - Building per-page listing URLs
//! - GET requests carrying a fresh identity header set
//! - Error classification

use crate::config::HarvestConfig;
use crate::identity::HeaderSet;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Query parameter carrying the page number
pub const PAGE_PARAM: &str = "page";

/// Result of a fetch that reached the server
#[derive(Debug)]
pub enum FetchResult {
    /// The page answered 200
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Page body content
        body: String,
    },

    /// The page answered with any other status
    NonSuccess {
        /// The HTTP status code
        status_code: u16,
    },
}

/// Transport-level failures; any of these ends the run
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Invalid request header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Builds an HTTP client with proper configuration
///
/// No default User-Agent is set; every request supplies its own header set.
///
/// # Arguments
///
/// * `config` - The harvest configuration (for the request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HarvestConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the URL for a listing page
///
/// Page 1 is the base URL unchanged. Later pages carry `page=<n>`, replacing
/// any page parameter already present in the base URL and keeping the rest
/// of its query.
///
/// # Example
///
/// ```
/// use listing_harvest::harvester::page_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/lawyers/civil-rights").unwrap();
/// assert_eq!(page_url(&base, 1).as_str(), "https://example.com/lawyers/civil-rights");
/// assert_eq!(page_url(&base, 3).as_str(), "https://example.com/lawyers/civil-rights?page=3");
/// ```
pub fn page_url(base: &Url, page: u32) -> Url {
    if page <= 1 {
        return base.clone();
    }

    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        query.append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}

/// Fetches one listing page
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200 | `Ok(Success)` with the body |
/// | Any other status | `Ok(NonSuccess)`, body not read |
/// | Timeout | `Err(Timeout)` |
/// | Connection refused / DNS / TLS | `Err(Connect)` |
/// | Body read failure | `Err(Body)` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The page URL
/// * `headers` - The identity header set for this request
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    headers: &HeaderSet,
) -> Result<FetchResult, FetchError> {
    let header_map = headers.to_header_map()?;

    let response = client
        .get(url.clone())
        .headers(header_map)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Ok(FetchResult::NonSuccess {
            status_code: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    Ok(FetchResult::Success { final_url, body })
}

/// Maps a reqwest send error onto the fetch error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
