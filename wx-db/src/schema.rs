//! SQL schema definitions.
//!
//! Every table carries a surrogate `id` plus a UNIQUE constraint on its
//! natural key. The UNIQUE constraints are what make `INSERT OR IGNORE`
//! drop duplicate rows on re-ingestion.

const WEATHER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS weather (
        id INTEGER PRIMARY KEY,
        station_id TEXT NOT NULL,
        date TEXT NOT NULL,
        max_temp_c REAL,
        min_temp_c REAL,
        precip_mm REAL,
        UNIQUE (station_id, date)
    );
    CREATE INDEX IF NOT EXISTS idx_weather_station ON weather(station_id);
    CREATE INDEX IF NOT EXISTS idx_weather_date ON weather(date);
"#;

const CROP_YIELD_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS crop_yield (
        id INTEGER PRIMARY KEY,
        year INTEGER NOT NULL UNIQUE,
        total_yield INTEGER NOT NULL
    );
"#;

const WEATHER_STATS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS weather_stats (
        id INTEGER PRIMARY KEY,
        station_id TEXT NOT NULL,
        year INTEGER NOT NULL,
        avg_max_temp_c REAL,
        avg_min_temp_c REAL,
        total_precip_cm REAL,
        UNIQUE (station_id, year)
    );
    CREATE INDEX IF NOT EXISTS idx_weather_stats_year ON weather_stats(year);
"#;

/// The tables owned by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Weather,
    CropYield,
    WeatherStats,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Weather, Table::CropYield, Table::WeatherStats];

    pub fn name(self) -> &'static str {
        match self {
            Table::Weather => "weather",
            Table::CropYield => "crop_yield",
            Table::WeatherStats => "weather_stats",
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` statement plus the table's indexes.
    pub fn ddl(self) -> &'static str {
        match self {
            Table::Weather => WEATHER_DDL,
            Table::CropYield => CROP_YIELD_DDL,
            Table::WeatherStats => WEATHER_STATS_DDL,
        }
    }
}

/// Returns the full SQL schema as a single batch string.
///
/// Applying it is idempotent. The stats table is included so a fresh
/// database can be read before the first recomputation; the aggregator
/// still recreates it if it has been dropped since.
pub fn create_schema() -> String {
    Table::ALL.iter().map(|table| table.ddl()).collect()
}
