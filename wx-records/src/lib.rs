//! Record types and line parsers for raw weather and crop-yield files.
//!
//! Weather files hold one station each (the station id is the file stem)
//! with one tab-separated line per day:
//!
//! ```text
//! 19850101	-22	-128	94
//! ```
//!
//! Readings are integers, `-9999` marks a missing value. Yield files hold
//! one whitespace-separated `<year> <total>` pair per line.
//!
//! The derived [`StationYearStat`] type and its in-process fold live here as
//! well so the storage layer and the aggregation command share one
//! definition of the yearly statistics.

pub mod crop_yield;
pub mod error;
pub mod reading;
pub mod station_year;
pub mod weather;

pub use crop_yield::YieldRecord;
pub use error::ParseError;
pub use station_year::{StationYearFold, StationYearStat};
pub use weather::RawWeatherRecord;
