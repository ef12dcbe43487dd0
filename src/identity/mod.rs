//! Outbound request identity
//!
//! Every page request carries a fresh header set obtained from an
//! [`IdentityProvider`]. The default provider rotates through a small pool of
//! desktop browser User-Agent strings; the Accept and Referer headers come
//! from configuration.

use crate::config::IdentityConfig;
use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, REFERER, USER_AGENT,
};

const DESKTOP_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// One request's worth of identifying headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSet {
    pub user_agent: String,
    pub accept: String,
    pub referer: String,
}

impl HeaderSet {
    /// Converts the set into a reqwest header map
    ///
    /// Fails if any value contains characters not allowed in a header.
    pub fn to_header_map(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_str(&self.accept)?);
        headers.insert(REFERER, HeaderValue::from_str(&self.referer)?);
        Ok(headers)
    }
}

/// Supplies the header set for each outbound request
pub trait IdentityProvider: Send + Sync {
    fn next_header_set(&self) -> HeaderSet;
}

/// Picks a random browser User-Agent on every call
#[derive(Debug, Clone)]
pub struct RotatingIdentity {
    accept: String,
    referer: String,
}

impl RotatingIdentity {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            accept: config.accept.clone(),
            referer: config.referer.clone(),
        }
    }
}

impl IdentityProvider for RotatingIdentity {
    fn next_header_set(&self) -> HeaderSet {
        let user_agent = DESKTOP_USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DESKTOP_USER_AGENTS[0]);

        HeaderSet {
            user_agent: user_agent.to_string(),
            accept: self.accept.clone(),
            referer: self.referer.clone(),
        }
    }
}

/// Returns the same header set for every request
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub HeaderSet);

impl IdentityProvider for FixedIdentity {
    fn next_header_set(&self) -> HeaderSet {
        self.0.clone()
    }
}
