//! Output module for harvest results
//!
//! This module handles:
//! - Accumulating records across pages (`Collection`)
//! - Writing the final collection once, atomically (`RecordSink`, `JsonFileSink`)
//! - Reporting what a run did (`HarvestReport`)

mod collection;
mod report;
mod sink;

pub use collection::Collection;
pub use report::{format_report, print_report, HarvestReport};
pub use sink::{JsonFileSink, OutputError, OutputResult, RecordSink};
