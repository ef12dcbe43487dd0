//! The harvested listing record
//!
//! A `Record` is only ever built whole by the card extractor; there is no
//! partially-populated form. Serialized keys follow the JSON shape consumed
//! by the seed tooling (`firm`, `website`, `specialties`, `state`).

use serde::{Deserialize, Serialize};

/// Placeholder used when a card carries no readable name
pub const UNKNOWN_NAME: &str = "Unknown";

/// One professional listing extracted from a directory card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Display name, or [`UNKNOWN_NAME`] when the card has none
    pub name: String,

    /// Firm or organization the listing belongs to
    #[serde(rename = "firm")]
    pub organization: Option<String>,

    /// Phone number exactly as displayed
    pub phone: Option<String>,

    /// Address text, or the jurisdiction when the card has none
    pub address: String,

    /// Absolute URL of the listing's profile page
    #[serde(rename = "website")]
    pub profile_url: Option<String>,

    /// Secondary classification labels, in page order
    #[serde(rename = "specialties")]
    pub tags: Vec<String>,

    /// Jurisdiction of the run
    #[serde(rename = "state")]
    pub jurisdiction: String,

    /// Origin site label
    pub source: String,
}
