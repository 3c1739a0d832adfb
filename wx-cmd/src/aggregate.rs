//! Recompute the `weather_stats` table from the stored weather rows.

use crate::config::AggregationMode;
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::time::Instant;
use wx_db::{stats, Database};
use wx_records::StationYearFold;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecomputeSummary {
    /// Station-year rows written.
    pub station_years: usize,
    pub elapsed_secs: f64,
}

/// Rebuild the statistics in a single transaction.
///
/// Either the previous table contents survive untouched or they are fully
/// replaced by the new rows. Running it twice on unchanged weather data
/// yields identical contents.
pub fn recompute_stats(db: &mut Database, mode: AggregationMode) -> wx_db::Result<RecomputeSummary> {
    let started = Instant::now();
    info!("Statistics recomputation started ({:?})", mode);

    let tx = db.transaction()?;
    let station_years = recompute_stats_in(&tx, mode)?;
    tx.commit()?;

    let elapsed_secs = started.elapsed().as_secs_f64();
    info!(
        "Statistics recomputation finished in {:.3}s: {} station-years",
        elapsed_secs, station_years
    );
    Ok(RecomputeSummary {
        station_years,
        elapsed_secs,
    })
}

/// Compute and replace the statistics on `conn` without committing.
///
/// Pass a transaction to make the replacement atomic with whatever else
/// the caller does on it.
pub fn recompute_stats_in(conn: &Connection, mode: AggregationMode) -> wx_db::Result<usize> {
    let rows = match mode {
        AggregationMode::Sql => stats::query_grouped_aggregates(conn)?,
        AggregationMode::InMemory => {
            let mut fold = StationYearFold::new();
            let scanned = stats::for_each_weather(conn, |record| fold.push(&record))?;
            log::debug!("folded {} weather rows into {} station-years", scanned, fold.len());
            fold.finish()
        }
    };
    stats::replace_stats(conn, &rows)
}
