//! Derived per-station, per-year statistics.

use crate::reading::round_to;
use crate::RawWeatherRecord;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decimal places kept for every stored statistic. Ties round half away
/// from zero, so `0.125` becomes `0.13`.
pub const STAT_DECIMALS: i32 = 2;

/// Yearly summary for one station, as stored in the `weather_stats` table.
///
/// A field is `None` only when no non-missing reading contributed to it.
/// A genuine zero (e.g. a dry year) is stored as `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationYearStat {
    pub station_id: String,
    pub year: i32,
    pub avg_max_temp_c: Option<f64>,
    pub avg_min_temp_c: Option<f64>,
    pub total_precip_cm: Option<f64>,
}

impl StationYearStat {
    /// Build a stat row from unrounded aggregates: the two temperature
    /// means and the precipitation sum in millimetres.
    pub fn from_aggregates(
        station_id: impl Into<String>,
        year: i32,
        avg_max_temp_c: Option<f64>,
        avg_min_temp_c: Option<f64>,
        precip_sum_mm: Option<f64>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            year,
            avg_max_temp_c: avg_max_temp_c.map(|v| round_to(v, STAT_DECIMALS)),
            avg_min_temp_c: avg_min_temp_c.map(|v| round_to(v, STAT_DECIMALS)),
            total_precip_cm: precip_sum_mm.map(|mm| round_to(mm / 10.0, STAT_DECIMALS)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Running {
    sum: f64,
    count: u64,
}

impl Running {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    fn total(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct YearAccumulator {
    max_temp: Running,
    min_temp: Running,
    precip: Running,
}

/// In-process equivalent of the SQL `GROUP BY station_id, year` aggregation.
///
/// Feed every raw record through [`push`](Self::push), then call
/// [`finish`](Self::finish). Output is ordered by `(station_id, year)`.
#[derive(Debug, Default)]
pub struct StationYearFold {
    groups: BTreeMap<(String, i32), YearAccumulator>,
}

impl StationYearFold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &RawWeatherRecord) {
        let acc = self
            .groups
            .entry((record.station_id.clone(), record.date.year()))
            .or_default();
        acc.max_temp.push(record.max_temp_c);
        acc.min_temp.push(record.min_temp_c);
        acc.precip.push(record.precip_mm);
    }

    /// Number of distinct (station, year) groups seen so far.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn finish(self) -> Vec<StationYearStat> {
        self.groups
            .into_iter()
            .map(|((station_id, year), acc)| {
                StationYearStat::from_aggregates(
                    station_id,
                    year,
                    acc.max_temp.mean(),
                    acc.min_temp.mean(),
                    acc.precip.total(),
                )
            })
            .collect()
    }
}

impl<'a> FromIterator<&'a RawWeatherRecord> for StationYearFold {
    fn from_iter<T: IntoIterator<Item = &'a RawWeatherRecord>>(iter: T) -> Self {
        let mut fold = Self::new();
        for record in iter {
            fold.push(record);
        }
        fold
    }
}
