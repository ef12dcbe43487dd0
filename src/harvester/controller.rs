//! Harvest controller - pagination and run orchestration
//!
//! This module contains the main harvest loop, which:
//! - Requests listing pages one at a time, in ascending order
//! - Hands each page to the card extractor
//! - Appends each page's records to the run's collection
//! - Paces requests with a randomized delay
//! - Writes the collection once when the run reaches a terminal state

use crate::config::Config;
use crate::harvester::extractor::{CardExtractor, PageExtraction};
use crate::harvester::fetcher::{build_http_client, fetch_page, page_url, FetchResult};
use crate::harvester::pacing::Pacer;
use crate::identity::{IdentityProvider, RotatingIdentity};
use crate::output::{Collection, HarvestReport, JsonFileSink, RecordSink};
use crate::state::{AbortReason, HarvestState, StopReason};
use crate::{ConfigError, HarvestError};
use chrono::Utc;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Mutable bookkeeping for one run
///
/// Owned by [`Harvester::run_with_sink`] and lent to each state transition.
#[derive(Debug, Default)]
struct RunProgress {
    collection: Collection,
    pages_visited: u32,
    cards_skipped: usize,
}

/// Main harvest controller
pub struct Harvester {
    config: Config,
    base_url: Url,
    client: Client,
    identity: Box<dyn IdentityProvider>,
    extractor: CardExtractor,
    pacer: Pacer,
}

impl Harvester {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Client built and selectors compiled
    /// * `Err(HarvestError)` - Invalid base URL or selector, or the client failed to build
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&config.harvest.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.harvest.base_url, e))
        })?;

        let client = build_http_client(&config.harvest)?;
        let extractor = CardExtractor::from_config(&config)?;
        let pacer = Pacer::from_config(&config.pacing);
        let identity = Box::new(RotatingIdentity::new(&config.identity));

        Ok(Self {
            config,
            base_url,
            client,
            identity,
            extractor,
            pacer,
        })
    }

    /// Replaces the identity provider used for outbound headers
    pub fn with_identity(mut self, identity: impl IdentityProvider + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }

    /// Runs the harvest and writes the result to the configured JSON file
    pub async fn run(&self) -> Result<HarvestReport, HarvestError> {
        let sink = JsonFileSink::new(&self.config.output.path);
        self.run_with_sink(&sink).await
    }

    /// Runs the harvest and writes the result to the given sink
    ///
    /// Fetch failures, non-success statuses, and malformed cards never
    /// surface as errors; they end (or are skipped within) the run, and
    /// whatever was collected is still written. The only error is a failed
    /// write to the sink.
    pub async fn run_with_sink(&self, sink: &dyn RecordSink) -> Result<HarvestReport, HarvestError> {
        let started_at = Utc::now();
        let deadline = self
            .config
            .harvest
            .max_run_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        tracing::info!(
            "Starting harvest of {} (max {} pages)",
            self.base_url,
            self.config.harvest.max_pages
        );

        let mut progress = RunProgress::default();
        let mut state = HarvestState::initial();

        while !state.is_terminal() {
            let next = self.step(state, &mut progress, deadline).await;
            tracing::debug!("State -> {}", next);
            state = next;
        }

        let pages_visited = progress.pages_visited;
        let cards_skipped = progress.cards_skipped;
        let records_written = progress.collection.flush(sink)?;

        match &state {
            HarvestState::Aborted(reason) => tracing::warn!(
                "Harvest {}. {} records saved to {}",
                reason,
                records_written,
                self.config.output.path
            ),
            _ => tracing::info!(
                "Harvest complete ({}). {} records saved to {}",
                state,
                records_written,
                self.config.output.path
            ),
        }

        Ok(HarvestReport {
            outcome: state,
            pages_visited,
            records_written,
            cards_skipped,
            output_path: PathBuf::from(&self.config.output.path),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Performs one state transition
    async fn step(
        &self,
        state: HarvestState,
        progress: &mut RunProgress,
        deadline: Option<Instant>,
    ) -> HarvestState {
        match state {
            HarvestState::Fetching { page } => self.fetch(page, progress, deadline).await,
            HarvestState::Extracting { page, url, body } => {
                self.extract(page, &url, &body, progress)
            }
            HarvestState::Pacing { page } => {
                let delay = self.pacer.pause().await;
                tracing::debug!("Paced {:?} after page {}", delay, page);
                HarvestState::Fetching { page: page + 1 }
            }
            terminal => terminal,
        }
    }

    /// FETCHING: request one page and classify the response
    async fn fetch(
        &self,
        page: u32,
        progress: &mut RunProgress,
        deadline: Option<Instant>,
    ) -> HarvestState {
        let max_pages = self.config.harvest.max_pages;
        if page > max_pages {
            return HarvestState::Done(StopReason::MaxPagesReached { max_pages });
        }

        if let (Some(deadline), Some(budget_secs)) = (deadline, self.config.harvest.max_run_secs) {
            if Instant::now() >= deadline {
                return HarvestState::Aborted(AbortReason::DeadlineExceeded { page, budget_secs });
            }
        }

        let url = page_url(&self.base_url, page);
        progress.pages_visited += 1;
        tracing::info!("Harvesting page {}...", page);
        tracing::debug!("GET {}", url);

        let headers = self.identity.next_header_set();
        match fetch_page(&self.client, &url, &headers).await {
            Ok(FetchResult::Success { final_url, body }) => HarvestState::Extracting {
                page,
                url: final_url,
                body,
            },
            Ok(FetchResult::NonSuccess { status_code }) => {
                tracing::warn!("Failed to load page {}: status {}", page, status_code);
                HarvestState::Done(StopReason::NonSuccessStatus {
                    page,
                    status: status_code,
                })
            }
            Err(e) => {
                tracing::error!("Transport failure on page {}: {}", page, e);
                HarvestState::Aborted(AbortReason::Transport {
                    page,
                    error: e.to_string(),
                })
            }
        }
    }

    /// EXTRACTING: map cards to records and decide whether to continue
    fn extract(
        &self,
        page: u32,
        url: &Url,
        body: &str,
        progress: &mut RunProgress,
    ) -> HarvestState {
        match self.extractor.extract(body, url) {
            PageExtraction::Exhausted => {
                self.report_exhausted(page);
                HarvestState::Done(StopReason::PageExhausted { page })
            }
            PageExtraction::Cards { records, skipped } => {
                if records.is_empty() {
                    tracing::warn!(
                        "All {} cards on page {} were malformed; continuing",
                        skipped.len(),
                        page
                    );
                } else {
                    tracing::info!(
                        "Page {}: {} records ({} cards skipped)",
                        page,
                        records.len(),
                        skipped.len()
                    );
                }

                progress.cards_skipped += skipped.len();
                progress.collection.append_batch(records);

                let max_pages = self.config.harvest.max_pages;
                if page >= max_pages {
                    HarvestState::Done(StopReason::MaxPagesReached { max_pages })
                } else {
                    HarvestState::Pacing { page }
                }
            }
        }
    }

    /// Logs a zero-card page, flagging likely markup drift
    ///
    /// A zero-card first page, or one before the expected page count, more
    /// often means the selectors stopped matching than that the listing ended.
    fn report_exhausted(&self, page: u32) {
        let expected = self.config.harvest.expected_pages;

        if is_premature_exhaustion(page, expected) {
            tracing::warn!(
                "No listings found on page {} (expected {}); the card selector '{}' may no longer match the site markup",
                page,
                expected.map_or_else(|| "at least one".to_string(), |e| format!("{} pages", e)),
                self.config.selectors.card
            );
        } else {
            tracing::info!("No listings found on page {}. Stopping.", page);
        }
    }
}

/// Whether a zero-card page arrived earlier than the listing should end
fn is_premature_exhaustion(page: u32, expected_pages: Option<u32>) -> bool {
    page == 1 || expected_pages.map_or(false, |expected| page < expected)
}
