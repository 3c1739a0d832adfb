//! Command implementations for the weather CLI.
//!
//! Provides subcommands to load raw station files and yearly crop yields
//! into SQLite, rebuild the per-station yearly statistics and page
//! through the stored tables.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use wx_db::models::PAGE_SIZE_DEFAULT;
use wx_db::{Database, Page, StatsFilter, WeatherFilter};

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod report;

use config::{AggregationMode, IngestConfig, MalformedLinePolicy, DEFAULT_BATCH_SIZE};

#[derive(Subcommand)]
pub enum Command {
    /// Create the database file and its tables
    InitDb,

    /// Load every *.txt station file in a directory into the weather table
    IngestWeather {
        /// Directory of tab-separated station files
        path: PathBuf,

        /// Rows per insert transaction
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// What to do with a line that cannot be parsed
        #[arg(long, value_enum, default_value_t = MalformedLinePolicy::Abort)]
        on_malformed: MalformedLinePolicy,
    },

    /// Load a tab-separated year/yield file into the crop_yield table
    IngestYield {
        /// Path to the yield file
        file: PathBuf,
    },

    /// Recompute per-station yearly statistics from the weather table
    Stats {
        /// Where the aggregation runs
        #[arg(long, value_enum, default_value_t = AggregationMode::Sql)]
        mode: AggregationMode,
    },

    /// Page through raw weather rows
    Weather {
        #[arg(long)]
        station_id: Option<String>,

        /// Day in YYYY-MM-DD form
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = PAGE_SIZE_DEFAULT)]
        page_size: u32,
    },

    /// Page through the computed yearly statistics
    WeatherStats {
        #[arg(long)]
        station_id: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = PAGE_SIZE_DEFAULT)]
        page_size: u32,
    },

    /// Page through crop yields
    Yields {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = PAGE_SIZE_DEFAULT)]
        page_size: u32,
    },
}

/// Run `command` against the database at `database`.
///
/// SQLite work is blocking, so it runs on tokio's blocking pool.
pub async fn run(database: PathBuf, command: Command) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || execute(&database, command)).await?
}

fn execute(database: &Path, command: Command) -> anyhow::Result<()> {
    let mut db = Database::open(database)
        .with_context(|| format!("opening database {}", database.display()))?;

    match command {
        Command::InitDb => {
            log::info!("schema ready in {}", database.display());
            Ok(())
        }
        Command::IngestWeather {
            path,
            batch_size,
            on_malformed,
        } => {
            let config = IngestConfig::default()
                .with_batch_size(batch_size)
                .with_malformed_policy(on_malformed);
            let summary = ingest::ingest_weather_dir(&mut db, &path, &config)
                .with_context(|| format!("ingesting weather from {}", path.display()))?;
            report::print_json(&summary)
        }
        Command::IngestYield { file } => {
            let summary = ingest::ingest_yield_file(&mut db, &file)
                .with_context(|| format!("ingesting yields from {}", file.display()))?;
            report::print_json(&summary)
        }
        Command::Stats { mode } => {
            let summary = aggregate::recompute_stats(&mut db, mode)
                .context("recomputing weather statistics")?;
            report::print_json(&summary)
        }
        Command::Weather {
            station_id,
            date,
            page,
            page_size,
        } => {
            let filter = WeatherFilter { station_id, date };
            let page = Page::new(page, page_size)?;
            report::print_json(&report::weather_report(&db, &filter, page)?)
        }
        Command::WeatherStats {
            station_id,
            year,
            page,
            page_size,
        } => {
            let filter = StatsFilter { station_id, year };
            let page = Page::new(page, page_size)?;
            report::print_json(&report::stats_report(&db, &filter, page)?)
        }
        Command::Yields { page, page_size } => {
            let page = Page::new(page, page_size)?;
            report::print_json(&report::yield_report(&db, page)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wx_db::Table;

    #[tokio::test]
    async fn full_pipeline_through_commands() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("wx_data");
        std::fs::create_dir(&data).unwrap();
        std::fs::write(data.join("TEST1.txt"), "20000101\t10\t0\t1\n20000102\t20\t5\t2\n").unwrap();
        let yields = dir.path().join("yield.txt");
        std::fs::write(&yields, "2000\t100\n").unwrap();
        let db_path = dir.path().join("weather.db");

        run(db_path.clone(), Command::InitDb).await.unwrap();
        run(
            db_path.clone(),
            Command::IngestWeather {
                path: data,
                batch_size: 1,
                on_malformed: MalformedLinePolicy::Abort,
            },
        )
        .await
        .unwrap();
        run(db_path.clone(), Command::IngestYield { file: yields }).await.unwrap();
        run(db_path.clone(), Command::Stats { mode: AggregationMode::Sql }).await.unwrap();

        let db = Database::open(&db_path).unwrap();
        assert_eq!(db.count(Table::Weather).unwrap(), 2);
        assert_eq!(db.count(Table::CropYield).unwrap(), 1);
        assert_eq!(db.count(Table::WeatherStats).unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_page_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = run(
            dir.path().join("weather.db"),
            Command::Yields { page: 0, page_size: 10 },
        )
        .await;
        assert!(result.is_err());
    }
}
