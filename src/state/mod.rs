//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `HarvestState`: where the pagination loop currently is (fetching, extracting, pacing, done, aborted)
//! - `StopReason`: the clean end-of-data signals that finish a run
//! - `AbortReason`: the failures that cut a run short

mod harvest_state;

// Re-export main types
pub use harvest_state::{AbortReason, HarvestState, StopReason};
