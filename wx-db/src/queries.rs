//! Typed read queries over the stored tables.
//!
//! These back the reporting side: they read committed rows only and never
//! write. Optional filters are bound as `NULL`-able parameters so one
//! prepared statement serves every filter combination.

use crate::models::{Page, StatsFilter, WeatherFilter};
use crate::{Database, Result, Table};
use rusqlite::params;
use wx_records::{RawWeatherRecord, StationYearStat, YieldRecord};

impl Database {
    /// Number of rows currently in `table`.
    pub fn count(&self, table: Table) -> Result<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Raw weather rows, ordered by date then station.
    pub fn query_weather(&self, filter: &WeatherFilter, page: Page) -> Result<Vec<RawWeatherRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT station_id, date, max_temp_c, min_temp_c, precip_mm
             FROM weather
             WHERE (?1 IS NULL OR station_id = ?1)
               AND (?2 IS NULL OR date = ?2)
             ORDER BY date, station_id
             LIMIT ?3 OFFSET ?4",
        )?;
        let rows = stmt
            .query_map(
                params![filter.station_id, filter.date, page.limit(), page.offset()],
                |row| {
                    Ok(RawWeatherRecord {
                        station_id: row.get(0)?,
                        date: row.get(1)?,
                        max_temp_c: row.get(2)?,
                        min_temp_c: row.get(3)?,
                        precip_mm: row.get(4)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!("query_weather returned {} records", rows.len());
        Ok(rows)
    }

    /// Yearly station statistics, ordered by year then station.
    pub fn query_weather_stats(&self, filter: &StatsFilter, page: Page) -> Result<Vec<StationYearStat>> {
        let mut stmt = self.conn.prepare(
            "SELECT station_id, year, avg_max_temp_c, avg_min_temp_c, total_precip_cm
             FROM weather_stats
             WHERE (?1 IS NULL OR station_id = ?1)
               AND (?2 IS NULL OR year = ?2)
             ORDER BY year, station_id
             LIMIT ?3 OFFSET ?4",
        )?;
        let rows = stmt
            .query_map(
                params![filter.station_id, filter.year, page.limit(), page.offset()],
                |row| {
                    Ok(StationYearStat {
                        station_id: row.get(0)?,
                        year: row.get(1)?,
                        avg_max_temp_c: row.get(2)?,
                        avg_min_temp_c: row.get(3)?,
                        total_precip_cm: row.get(4)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!("query_weather_stats returned {} records", rows.len());
        Ok(rows)
    }

    /// Crop-yield rows, ordered by year.
    pub fn query_yields(&self, page: Page) -> Result<Vec<YieldRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT year, total_yield FROM crop_yield
             ORDER BY year
             LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
            .query_map(params![page.limit(), page.offset()], |row| {
                Ok(YieldRecord {
                    year: row.get(0)?,
                    total_yield: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
