//! Listing-Harvest: a polite directory listing harvester
//!
//! This crate walks the paginated listing pages of a single directory site,
//! extracts one structured record per listing card, and writes the whole
//! collection to disk once the run ends.

pub mod config;
pub mod harvester;
pub mod identity;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for Listing-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for '{field}': {selector}")]
    InvalidSelector { field: &'static str, selector: String },
}

/// Result type alias for Listing-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvester::{harvest, Harvester};
pub use output::{Collection, HarvestReport};
pub use record::Record;
pub use state::{AbortReason, HarvestState, StopReason};
