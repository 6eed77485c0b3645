//! HTTP fetcher for catalog pages
//!
//! Builds the HTTP client with a proper user agent string and performs
//! single-page GET requests. There is no retry logic here: a failed page
//! ends the crawl at the coordinator, because pagination cannot be resolved
//! without the page body.

use crate::config::UserAgentConfig;
use crate::ScavaError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed up to reqwest's default limit; the catalog target
/// redirects freely between path layouts and nothing downstream needs to see
/// the hops.
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single page and returns its body as text
///
/// # Returns
///
/// * `Ok(String)` - Response body on a 2xx status
/// * `Err(ScavaError::HttpStatus)` - Non-success status
/// * `Err(ScavaError::Fetch)` - Transport-level failure (timeout, DNS,
///   connection refused)
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, ScavaError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ScavaError::Fetch {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScavaError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| ScavaError::Fetch {
        url: url.to_string(),
        source: e,
    })
}
