//! Yearly crop-yield totals.

use crate::ParseError;
use serde::{Deserialize, Serialize};

/// Total harvest for one year, as stored in the `crop_yield` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldRecord {
    pub year: i32,
    pub total_yield: i64,
}

impl YieldRecord {
    /// Parse a `<year> <total>` line. Any run of whitespace separates the
    /// two fields.
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(ParseError::FieldCount {
                expected: 2,
                found: fields.len(),
            });
        }
        let year = fields[0].parse().map_err(|_| ParseError::InvalidNumber {
            field: "year",
            value: fields[0].to_string(),
        })?;
        let total_yield = fields[1].parse().map_err(|_| ParseError::InvalidNumber {
            field: "total_yield",
            value: fields[1].to_string(),
        })?;
        Ok(Self { year, total_yield })
    }

    /// Parse the whole contents of a yield file, skipping blank lines.
    ///
    /// On failure the 1-based line number is returned with the error.
    pub fn parse_all(contents: &str) -> Result<Vec<Self>, (usize, ParseError)> {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| Self::parse_line(line).map_err(|e| (idx + 1, e)))
            .collect()
    }
}
