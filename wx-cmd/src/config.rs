//! Run configuration for the ingestion and statistics commands.

use crate::error::IngestError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Rows buffered before a weather batch is written.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Database file used when neither `--database` nor `DATABASE_URL` is set.
pub const DEFAULT_DATABASE_PATH: &str = "weather.db";

/// What to do with a weather line that fails to parse, or a weather file
/// whose name yields no station id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum MalformedLinePolicy {
    /// Stop the run with the parse error. Batches already flushed stay committed.
    #[default]
    Abort,
    /// Log a warning, count the line or file and keep going.
    Skip,
}

/// How the yearly statistics are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum AggregationMode {
    /// `GROUP BY` with `AVG`/`SUM` inside SQLite.
    #[default]
    Sql,
    /// Full ordered scan folded in process.
    InMemory,
}

/// Settings for a weather ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Rows per insert transaction.
    pub batch_size: usize,

    /// Handling of unparseable lines.
    pub on_malformed: MalformedLinePolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            on_malformed: MalformedLinePolicy::default(),
        }
    }
}

impl IngestConfig {
    /// Set the number of rows per insert transaction.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the handling of unparseable lines.
    pub fn with_malformed_policy(mut self, policy: MalformedLinePolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    /// Reject settings that cannot work before any file is touched.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.batch_size == 0 {
            return Err(IngestError::Configuration(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
