//! Harvester module for listing page fetching and extraction
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching of listing pages
//! - Card extraction from page markup
//! - Randomized pacing between requests
//! - The pagination state machine that ties them together

mod controller;
mod extractor;
mod fetcher;
mod pacing;

pub use controller::Harvester;
pub use extractor::{CardError, CardExtractor, PageExtraction};
pub use fetcher::{build_http_client, fetch_page, page_url, FetchError, FetchResult, PAGE_PARAM};
pub use pacing::Pacer;

use crate::config::Config;
use crate::output::HarvestReport;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client and compile the card selectors
/// 2. Request listing pages in order, starting at page 1
/// 3. Extract records from each page's cards
/// 4. Pause for a randomized delay between pages
/// 5. Stop on a non-success status, an empty page, the page limit, or a transport failure
/// 6. Write every collected record to the configured output file
///
/// # Arguments
///
/// * `config` - The harvest configuration
///
/// # Returns
///
/// * `Ok(HarvestReport)` - The run finished and its records were written
/// * `Err(HarvestError)` - Setup failed, or the output could not be written
///
/// # Example
///
/// ```no_run
/// use listing_harvest::config::load_config;
/// use listing_harvest::harvester::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = harvest(config).await?;
/// println!("{} records", report.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: Config) -> Result<HarvestReport, HarvestError> {
    Harvester::new(config)?.run().await
}
