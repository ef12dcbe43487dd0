//! Listing card extraction
//!
//! This module turns one listing page into records:
//! - Locates every card matching the card selector
//! - Maps each card to a [`Record`] independently
//! - Skips (and reports) cards that cannot be mapped, without affecting the rest
//!
//! A page with no matching cards is reported as [`PageExtraction::Exhausted`],
//! which the pagination loop treats as the end of the listing.

use crate::config::validation::compile_selector;
use crate::config::{Config, SelectorConfig};
use crate::record::{Record, UNKNOWN_NAME};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Why a single card was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("card {position}: profile link has no href")]
    MissingProfileHref { position: usize },

    #[error("card {position}: profile link '{href}' is not usable: {reason}")]
    InvalidProfileUrl {
        position: usize,
        href: String,
        reason: String,
    },
}

/// Outcome of extracting one page
#[derive(Debug, Clone, PartialEq)]
pub enum PageExtraction {
    /// No card matched the card selector
    Exhausted,

    /// At least one card matched
    Cards {
        /// Records built from well-formed cards, in page order
        records: Vec<Record>,
        /// One entry per card that was skipped
        skipped: Vec<CardError>,
    },
}

impl PageExtraction {
    /// Number of cards that matched the card selector
    pub fn cards_found(&self) -> usize {
        match self {
            Self::Exhausted => 0,
            Self::Cards { records, skipped } => records.len() + skipped.len(),
        }
    }
}

/// Compiled selectors for the card structure
#[derive(Debug, Clone)]
struct CardSelectors {
    card: Selector,
    name: Selector,
    organization: Selector,
    phone: Selector,
    address: Selector,
    tags: Selector,
    tag_link: Selector,
}

impl CardSelectors {
    fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            card: compile_selector("card", &config.card)?,
            name: compile_selector("name", &config.name)?,
            organization: compile_selector("organization", &config.organization)?,
            phone: compile_selector("phone", &config.phone)?,
            address: compile_selector("address", &config.address)?,
            tags: compile_selector("tags", &config.tags)?,
            tag_link: compile_selector("tags", "a")?,
        })
    }
}

/// Maps listing cards to records for one jurisdiction and source
#[derive(Debug, Clone)]
pub struct CardExtractor {
    selectors: CardSelectors,
    jurisdiction: String,
    source: String,
}

impl CardExtractor {
    /// Compiles the card selectors
    ///
    /// # Returns
    ///
    /// * `Ok(CardExtractor)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector is not valid CSS
    pub fn new(
        selectors: &SelectorConfig,
        jurisdiction: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            selectors: CardSelectors::compile(selectors)?,
            jurisdiction: jurisdiction.into(),
            source: source.into(),
        })
    }

    /// Builds an extractor from the full configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(
            &config.selectors,
            config.harvest.jurisdiction.clone(),
            config.harvest.source.clone(),
        )
    }

    /// Extracts all records from one page of markup
    ///
    /// # Arguments
    ///
    /// * `html` - The raw page body
    /// * `page_url` - The URL the page was served from, for resolving profile links
    ///
    /// # Example
    ///
    /// ```
    /// use listing_harvest::config::SelectorConfig;
    /// use listing_harvest::harvester::{CardExtractor, PageExtraction};
    /// use url::Url;
    ///
    /// let extractor =
    ///     CardExtractor::new(&SelectorConfig::default(), "South Carolina", "Justia").unwrap();
    /// let page = Url::parse("https://example.com/lawyers").unwrap();
    ///
    /// let html = r#"<div class="jcard"><strong class="name">Jane Roe</strong></div>"#;
    /// match extractor.extract(html, &page) {
    ///     PageExtraction::Cards { records, .. } => assert_eq!(records[0].name, "Jane Roe"),
    ///     PageExtraction::Exhausted => unreachable!(),
    /// }
    /// ```
    pub fn extract(&self, html: &str, page_url: &Url) -> PageExtraction {
        let document = Html::parse_document(html);

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        let mut matched = 0;

        for (index, card) in document.select(&self.selectors.card).enumerate() {
            matched += 1;
            match self.parse_card(card, index + 1, page_url) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed card on {}: {}", page_url, e);
                    skipped.push(e);
                }
            }
        }

        if matched == 0 {
            return PageExtraction::Exhausted;
        }

        PageExtraction::Cards { records, skipped }
    }

    /// Maps one card to a record
    ///
    /// `position` is the 1-based index of the card on its page and only
    /// appears in error messages.
    fn parse_card(
        &self,
        card: ElementRef<'_>,
        position: usize,
        page_url: &Url,
    ) -> Result<Record, CardError> {
        let name_element = card.select(&self.selectors.name).next();

        let name = name_element
            .and_then(inline_text)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let organization = card
            .select(&self.selectors.organization)
            .next()
            .and_then(inline_text);

        let phone = card
            .select(&self.selectors.phone)
            .next()
            .and_then(displayed_text);

        let address = card
            .select(&self.selectors.address)
            .next()
            .and_then(block_text)
            .unwrap_or_else(|| self.jurisdiction.clone());

        let profile_url = match name_element.and_then(enclosing_link) {
            Some(link) => Some(resolve_profile_link(link, position, page_url)?),
            None => None,
        };

        let tags = card
            .select(&self.selectors.tags)
            .next()
            .map(|container| {
                container
                    .select(&self.selectors.tag_link)
                    .filter_map(inline_text)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Record {
            name,
            organization,
            phone,
            address,
            profile_url,
            tags,
            jurisdiction: self.jurisdiction.clone(),
            source: self.source.clone(),
        })
    }
}

/// Concatenated text with whitespace runs collapsed; `None` if blank
fn inline_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    non_empty(collapse_whitespace(&text))
}

/// Text nodes joined by a space with whitespace runs collapsed; `None` if blank
///
/// Keeps line-broken fragments such as `street<br>city` apart.
fn block_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    non_empty(collapse_whitespace(&text))
}

/// Concatenated text trimmed at both ends only; `None` if blank
///
/// Interior spacing, tabs, and non-breaking spaces are kept as displayed.
fn displayed_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    non_empty(text.trim().to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Nearest `<a>` ancestor of an element
fn enclosing_link(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "a")
}

/// Resolves a profile anchor's href to an absolute http(s) URL
fn resolve_profile_link(
    link: ElementRef<'_>,
    position: usize,
    page_url: &Url,
) -> Result<String, CardError> {
    let href = link
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(CardError::MissingProfileHref { position })?;

    let resolved = page_url
        .join(href)
        .map_err(|e| CardError::InvalidProfileUrl {
            position,
            href: href.to_string(),
            reason: e.to_string(),
        })?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(CardError::InvalidProfileUrl {
            position,
            href: href.to_string(),
            reason: format!("unsupported scheme '{}'", resolved.scheme()),
        });
    }

    Ok(resolved.to_string())
}
