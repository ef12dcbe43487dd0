/// Harvest run state definitions
///
/// The pagination loop moves through these states one page at a time.
use std::fmt;
use url::Url;

/// Why a run finished cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page answered with a non-200 status
    NonSuccessStatus { page: u32, status: u16 },

    /// A page returned 200 but no card matched the card selector
    PageExhausted { page: u32 },

    /// The configured page ceiling was reached
    MaxPagesReached { max_pages: u32 },
}

/// Why a run was cut short
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Network, timeout, or connection failure while fetching a page
    Transport { page: u32, error: String },

    /// The overall wall-clock budget ran out before the next fetch
    DeadlineExceeded { page: u32, budget_secs: u64 },
}

/// Represents the current state of a harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestState {
    // ===== Active States =====
    /// About to request the given page
    Fetching { page: u32 },

    /// Page body received and waiting to be parsed
    Extracting { page: u32, url: Url, body: String },

    /// Waiting out the pacing delay after the given page
    Pacing { page: u32 },

    // ===== Terminal States =====
    /// Run finished on an expected end-of-data signal
    Done(StopReason),

    /// Run was cut short; collected records are still written
    Aborted(AbortReason),
}

impl HarvestState {
    /// The state every run starts in
    pub fn initial() -> Self {
        Self::Fetching { page: 1 }
    }

    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Aborted(_))
    }

    /// Returns true if the run was cut short
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// The page this state refers to, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Fetching { page } | Self::Extracting { page, .. } | Self::Pacing { page } => {
                Some(*page)
            }
            Self::Done(StopReason::NonSuccessStatus { page, .. })
            | Self::Done(StopReason::PageExhausted { page })
            | Self::Aborted(AbortReason::Transport { page, .. })
            | Self::Aborted(AbortReason::DeadlineExceeded { page, .. }) => Some(*page),
            Self::Done(StopReason::MaxPagesReached { .. }) => None,
        }
    }

    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetching { .. } => "fetching",
            Self::Extracting { .. } => "extracting",
            Self::Pacing { .. } => "pacing",
            Self::Done(_) => "done",
            Self::Aborted(_) => "aborted",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonSuccessStatus { page, status } => {
                write!(f, "stopped, non-success status {} on page {}", status, page)
            }
            Self::PageExhausted { page } => write!(f, "stopped, no listings on page {}", page),
            Self::MaxPagesReached { max_pages } => {
                write!(f, "stopped, reached page limit of {}", max_pages)
            }
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { page, error } => {
                write!(f, "aborted, transport failure on page {}: {}", page, error)
            }
            Self::DeadlineExceeded { page, budget_secs } => write!(
                f,
                "aborted, run budget of {}s exhausted before page {}",
                budget_secs, page
            ),
        }
    }
}

impl fmt::Display for HarvestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching { page } | Self::Extracting { page, .. } | Self::Pacing { page } => {
                write!(f, "{}(page={})", self.label(), page)
            }
            Self::Done(reason) => write!(f, "{}", reason),
            Self::Aborted(reason) => write!(f, "{}", reason),
        }
    }
}
