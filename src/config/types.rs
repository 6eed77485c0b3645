use serde::Deserialize;

/// Main configuration structure for scava
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// First catalog page to fetch; item and pagination links are resolved
    /// relative to the page they appear on
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Hard cap on pages fetched per run, independent of pagination signals
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Fixed pause between successive page fetches (milliseconds)
    #[serde(rename = "courtesy-delay-ms", default = "default_courtesy_delay_ms")]
    pub courtesy_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_pages() -> u32 {
    50
}

fn default_courtesy_delay_ms() -> u64 {
    100
}

fn default_request_timeout() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the full user agent string sent with every request
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}
