//! Paginated read commands printed as JSON on stdout.

use serde::Serialize;
use wx_db::{Database, Page, StatsFilter, WeatherFilter};
use wx_records::{RawWeatherRecord, StationYearStat, YieldRecord};

/// One page of query results.
#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}

impl<T> Report<T> {
    fn new(page: Page, items: Vec<T>) -> Self {
        Self {
            page: page.number(),
            page_size: page.size(),
            items,
        }
    }
}

pub fn weather_report(
    db: &Database,
    filter: &WeatherFilter,
    page: Page,
) -> wx_db::Result<Report<RawWeatherRecord>> {
    Ok(Report::new(page, db.query_weather(filter, page)?))
}

pub fn stats_report(
    db: &Database,
    filter: &StatsFilter,
    page: Page,
) -> wx_db::Result<Report<StationYearStat>> {
    Ok(Report::new(page, db.query_weather_stats(filter, page)?))
}

pub fn yield_report(db: &Database, page: Page) -> wx_db::Result<Report<YieldRecord>> {
    Ok(Report::new(page, db.query_yields(page)?))
}

/// Pretty-print any serializable value to stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_page_metadata() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_yield_batch(&[
            YieldRecord { year: 1985, total_yield: 1 },
            YieldRecord { year: 1986, total_yield: 2 },
            YieldRecord { year: 1987, total_yield: 3 },
        ])
        .unwrap();

        let report = yield_report(&db, Page::new(2, 2).unwrap()).unwrap();
        assert_eq!(report.page, 2);
        assert_eq!(report.page_size, 2);
        assert_eq!(report.items, vec![YieldRecord { year: 1987, total_yield: 3 }]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["items"][0]["total_yield"], 3);
    }

    #[test]
    fn missing_readings_serialize_as_null() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_weather_batch(&[RawWeatherRecord::parse_line("S", "19850101\t-9999\t-5\t0").unwrap()])
            .unwrap();

        let report = weather_report(&db, &WeatherFilter::default(), Page::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["items"][0]["max_temp_c"].is_null());
        assert_eq!(json["items"][0]["min_temp_c"], -5.0);
        assert_eq!(json["items"][0]["precip_mm"], 0.0);
    }
}
