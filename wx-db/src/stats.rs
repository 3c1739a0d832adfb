//! Gateway primitives used by the statistics recomputation.
//!
//! All functions take a `&Connection` and do not commit, so the caller
//! decides the transaction boundary. Passing a [`rusqlite::Transaction`]
//! makes `delete_all` + `insert_stats` atomic.

use crate::{Result, Table};
use rusqlite::{params, Connection, OptionalExtension};
use wx_records::{RawWeatherRecord, StationYearStat};

/// Whether `table` currently exists in the database.
pub fn table_exists(conn: &Connection, table: Table) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table.name()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Create `table` and its indexes.
pub fn create_table(conn: &Connection, table: Table) -> Result<()> {
    conn.execute_batch(table.ddl())?;
    Ok(())
}

/// Remove every row of `table`. Returns the number of rows deleted.
pub fn delete_all(conn: &Connection, table: Table) -> Result<usize> {
    // Table names come from the closed `Table` enum, never from input.
    let deleted = conn.execute(&format!("DELETE FROM {}", table.name()), [])?;
    Ok(deleted)
}

/// SQL-side aggregation of the `weather` table per station and calendar year.
///
/// `AVG` and `SUM` ignore NULLs and return NULL when nothing contributes,
/// which maps directly onto the `None` fields of [`StationYearStat`].
/// Rows are ordered by `(station_id, year)`.
pub fn query_grouped_aggregates(conn: &Connection) -> Result<Vec<StationYearStat>> {
    let mut stmt = conn.prepare(
        "SELECT station_id,
                CAST(strftime('%Y', date) AS INTEGER) AS year,
                AVG(max_temp_c),
                AVG(min_temp_c),
                SUM(precip_mm)
         FROM weather
         GROUP BY station_id, year
         ORDER BY station_id, year",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StationYearStat::from_aggregates(
                row.get::<_, String>(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    log::debug!("grouped aggregation produced {} station-years", rows.len());
    Ok(rows)
}

/// Stream every stored weather row, ordered by `(station_id, date)`.
///
/// Rows are handed to `f` one at a time so a full scan never has to be
/// materialised. Returns the number of rows visited.
pub fn for_each_weather<F>(conn: &Connection, mut f: F) -> Result<usize>
where
    F: FnMut(RawWeatherRecord),
{
    let mut stmt = conn.prepare(
        "SELECT station_id, date, max_temp_c, min_temp_c, precip_mm
         FROM weather
         ORDER BY station_id, date",
    )?;
    let mut rows = stmt.query([])?;
    let mut visited = 0;
    while let Some(row) = rows.next()? {
        f(RawWeatherRecord {
            station_id: row.get(0)?,
            date: row.get(1)?,
            max_temp_c: row.get(2)?,
            min_temp_c: row.get(3)?,
            precip_mm: row.get(4)?,
        });
        visited += 1;
    }
    Ok(visited)
}

/// Insert freshly computed stat rows. Expects an empty stats table.
pub fn insert_stats(conn: &Connection, rows: &[StationYearStat]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO weather_stats (station_id, year, avg_max_temp_c, avg_min_temp_c, total_precip_cm)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for row in rows {
        stmt.execute(params![
            row.station_id,
            row.year,
            row.avg_max_temp_c,
            row.avg_min_temp_c,
            row.total_precip_cm
        ])?;
    }
    Ok(rows.len())
}

/// Replace the whole stats table with `rows`.
///
/// Creates the table if it is missing, otherwise clears it, then inserts.
/// Atomic only when `conn` is a transaction.
pub fn replace_stats(conn: &Connection, rows: &[StationYearStat]) -> Result<usize> {
    if table_exists(conn, Table::WeatherStats)? {
        let deleted = delete_all(conn, Table::WeatherStats)?;
        log::debug!("cleared {} previous stat rows", deleted);
    } else {
        log::info!("creating missing {} table", Table::WeatherStats.name());
        create_table(conn, Table::WeatherStats)?;
    }
    insert_stats(conn, rows)
}
