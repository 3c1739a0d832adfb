//! Filter and pagination types for the read queries.

use crate::{Result, StorageError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one.
pub const PAGE_SIZE_DEFAULT: u32 = 50;

/// Largest page a caller may request.
pub const PAGE_SIZE_MAX: u32 = 500;

/// One-based offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    /// Validate a page request: `number >= 1` and `1 <= size <= PAGE_SIZE_MAX`.
    pub fn new(number: u32, size: u32) -> Result<Self> {
        if number < 1 {
            return Err(StorageError::InvalidPage(format!(
                "page must be >= 1, got {}",
                number
            )));
        }
        if !(1..=PAGE_SIZE_MAX).contains(&size) {
            return Err(StorageError::InvalidPage(format!(
                "page size must be between 1 and {}, got {}",
                PAGE_SIZE_MAX, size
            )));
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// `LIMIT` for the SQL query.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// `OFFSET` for the SQL query.
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: PAGE_SIZE_DEFAULT,
        }
    }
}

/// Optional filters for raw weather reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherFilter {
    pub station_id: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Optional filters for station statistics reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsFilter {
    pub station_id: Option<String>,
    pub year: Option<i32>,
}
