use serde::Deserialize;

/// Main configuration structure for Listing-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// What to harvest and how far to go
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Listing URL for page 1; later pages add a `page` query parameter
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Hard upper bound on the number of pages requested
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Jurisdiction attached to every record, and the fallback address
    pub jurisdiction: String,

    /// Origin site label attached to every record
    pub source: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional wall-clock budget for the whole run (seconds)
    #[serde(rename = "max-run-secs", default)]
    pub max_run_secs: Option<u64>,

    /// Number of pages the listing is expected to have; a zero-card page
    /// before this point is reported as possible markup drift
    #[serde(rename = "expected-pages", default)]
    pub expected_pages: Option<u32>,
}

/// Randomized delay between page requests
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Lower bound of the delay window (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the delay window (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON file written at the end of the run
    pub path: String,
}

/// CSS selectors describing the listing card markup
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_card_selector")]
    pub card: String,

    #[serde(default = "default_name_selector")]
    pub name: String,

    #[serde(default = "default_organization_selector")]
    pub organization: String,

    /// The site has used both `phone` and `-phone` classes
    #[serde(default = "default_phone_selector")]
    pub phone: String,

    #[serde(default = "default_address_selector")]
    pub address: String,

    /// Container whose links are collected as tags
    #[serde(default = "default_tags_selector")]
    pub tags: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: default_card_selector(),
            name: default_name_selector(),
            organization: default_organization_selector(),
            phone: default_phone_selector(),
            address: default_address_selector(),
            tags: default_tags_selector(),
        }
    }
}

/// Static parts of the outbound header set
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(default = "default_accept")]
    pub accept: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            referer: default_referer(),
            accept: default_accept(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_min_delay_ms() -> u64 {
    2000
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_card_selector() -> String {
    "div.jcard".to_string()
}

fn default_name_selector() -> String {
    "strong.name".to_string()
}

fn default_organization_selector() -> String {
    "span.law-firm-name".to_string()
}

fn default_phone_selector() -> String {
    "a.phone, a.-phone".to_string()
}

fn default_address_selector() -> String {
    "span.address".to_string()
}

fn default_tags_selector() -> String {
    "div.practices".to_string()
}

fn default_referer() -> String {
    "https://www.google.com/".to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string()
}
