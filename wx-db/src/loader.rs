//! Bulk insert-or-ignore for raw weather and crop-yield rows.
//!
//! Rows whose natural key is already present are skipped silently by
//! SQLite's `INSERT OR IGNORE`; they are neither overwritten nor reported
//! as errors. Each function returns the number of rows actually inserted,
//! so `rows.len() - inserted` is the number of ignored duplicates.

use crate::{Database, Result};
use rusqlite::{params, Connection};
use wx_records::{RawWeatherRecord, YieldRecord};

/// Insert weather rows, skipping any `(station_id, date)` already stored.
///
/// Runs on whatever transaction state `conn` is in; see
/// [`Database::insert_weather_batch`] for the self-committing variant.
pub fn insert_weather_ignore_conflict(conn: &Connection, rows: &[RawWeatherRecord]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO weather (station_id, date, max_temp_c, min_temp_c, precip_mm)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let mut inserted = 0;
    for row in rows {
        inserted += stmt.execute(params![
            row.station_id,
            row.date,
            row.max_temp_c,
            row.min_temp_c,
            row.precip_mm
        ])?;
    }
    Ok(inserted)
}

/// Insert yield rows, skipping any year already stored.
pub fn insert_yields_ignore_conflict(conn: &Connection, rows: &[YieldRecord]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO crop_yield (year, total_yield) VALUES (?1, ?2)",
    )?;
    let mut inserted = 0;
    for row in rows {
        inserted += stmt.execute(params![row.year, row.total_yield])?;
    }
    Ok(inserted)
}

impl Database {
    /// Insert one batch of weather rows in its own transaction and commit.
    ///
    /// Either the whole batch is committed or none of it is.
    pub fn insert_weather_batch(&mut self, rows: &[RawWeatherRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let inserted = insert_weather_ignore_conflict(&tx, rows)?;
        tx.commit()?;
        log::debug!(
            "weather batch committed: {} rows, {} inserted",
            rows.len(),
            inserted
        );
        Ok(inserted)
    }

    /// Insert yield rows in one transaction and commit.
    pub fn insert_yield_batch(&mut self, rows: &[YieldRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let inserted = insert_yields_ignore_conflict(&tx, rows)?;
        tx.commit()?;
        log::debug!(
            "yield batch committed: {} rows, {} inserted",
            rows.len(),
            inserted
        );
        Ok(inserted)
    }
}
