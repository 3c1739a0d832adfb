//! Daily weather observations.

use crate::reading::parse_reading;
use crate::ParseError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format of the first field of a weather line.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Number of tab-separated fields on a weather line.
pub const WEATHER_FIELD_COUNT: usize = 4;

/// One day of readings for one station, as stored in the `weather` table.
///
/// `(station_id, date)` identifies the record. Temperatures are as read
/// from the source files (no rescaling), precipitation is in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWeatherRecord {
    pub station_id: String,
    pub date: NaiveDate,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub precip_mm: Option<f64>,
}

impl RawWeatherRecord {
    /// Build a record from already split fields: date, max temp, min temp,
    /// precipitation.
    ///
    /// Whitespace-only fields at either end are dropped first, so stray
    /// leading or trailing tabs on a line do not count as fields.
    pub fn from_fields<'a, I>(station_id: &str, fields: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let all: Vec<&str> = fields.into_iter().collect();
        let blank = |field: &&str| field.trim().is_empty();
        let start = all.iter().position(|f| !blank(f)).unwrap_or(all.len());
        let end = all.iter().rposition(|f| !blank(f)).map_or(start, |i| i + 1);
        let fields = &all[start..end];
        if fields.len() != WEATHER_FIELD_COUNT {
            return Err(ParseError::FieldCount {
                expected: WEATHER_FIELD_COUNT,
                found: fields.len(),
            });
        }

        let date_str = fields[0].trim();
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|_| {
            ParseError::InvalidDate {
                value: date_str.to_string(),
            }
        })?;

        Ok(Self {
            station_id: station_id.to_string(),
            date,
            max_temp_c: parse_reading("max_temp", fields[1])?,
            min_temp_c: parse_reading("min_temp", fields[2])?,
            precip_mm: parse_reading("precip", fields[3])?,
        })
    }

    /// Parse one raw line of a weather file.
    ///
    /// Surrounding whitespace, including stray tabs and line terminators,
    /// is ignored. The rest must hold exactly four tab-separated fields.
    pub fn parse_line(station_id: &str, line: &str) -> Result<Self, ParseError> {
        Self::from_fields(station_id, line.trim().split('\t'))
    }
}

/// Derive the station id from a weather file name: everything before the
/// first `.`. Returns `None` when that part is empty.
///
/// ```
/// use wx_records::weather::station_id_from_file_name;
///
/// assert_eq!(station_id_from_file_name("USC00110072.txt"), Some("USC00110072"));
/// assert_eq!(station_id_from_file_name(".txt"), None);
/// ```
pub fn station_id_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .split('.')
        .next()
        .filter(|stem| !stem.is_empty())
}
