//! Errors surfaced by the ingestion and statistics commands.

use std::path::PathBuf;
use thiserror::Error;
use wx_db::StorageError;
use wx_records::ParseError;

/// A fatal failure of an ingestion or recomputation run.
///
/// Duplicate keys are not errors and never appear here. When a run fails,
/// every batch flushed before the failure remains committed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record in {} at line {line}: {source}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        #[source]
        source: ParseError,
    },

    #[error("cannot derive a station id from file name {}", .path.display())]
    InvalidFileName { path: PathBuf },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, line: u64, source: ParseError) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            line,
            source,
        }
    }
}
