//! Record sinks
//!
//! This module defines the trait interface for writing the final collection
//! and the JSON file sink used by the binary.

use crate::record::Record;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to move output into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the final record collection
///
/// `write_records` is called exactly once per run, with every record.
pub trait RecordSink {
    fn write_records(&self, records: &[Record]) -> OutputResult<()>;
}

/// Writes records as an indented JSON array
///
/// The array is written to a temporary file next to the target and renamed
/// over it, so the target is either the previous file or the complete new one.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for JsonFileSink {
    fn write_records(&self, records: &[Record]) -> OutputResult<()> {
        let json = serde_json::to_string_pretty(records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;

        file.persist(&self.path).map_err(|e| OutputError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;

        tracing::debug!(
            "Wrote {} records ({} bytes) to {}",
            records.len(),
            json.len() + 1,
            self.path.display()
        );

        Ok(())
    }
}
