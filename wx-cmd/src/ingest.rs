//! Batch loading of weather directories and yield files.
//!
//! Weather files are read in ascending file-name order. Parsed rows are
//! buffered and written in batches of [`IngestConfig::batch_size`] rows,
//! each batch in its own committed transaction. Because every insert
//! ignores rows whose key already exists, a run that dies half way can
//! simply be started again.

use crate::config::{IngestConfig, MalformedLinePolicy};
use crate::error::IngestError;
use log::{info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use wx_db::Database;
use wx_records::weather::station_id_from_file_name;
use wx_records::{ParseError, RawWeatherRecord, YieldRecord};

/// Outcome of a weather directory run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestSummary {
    /// Files fully read.
    pub files: usize,
    /// Lines parsed into records.
    pub records: usize,
    /// Records actually inserted; the rest were duplicates.
    pub inserted: usize,
    /// Malformed lines skipped under [`MalformedLinePolicy::Skip`].
    pub skipped_lines: usize,
    /// Files without a usable station id skipped under [`MalformedLinePolicy::Skip`].
    pub skipped_files: usize,
    /// Insert transactions committed.
    pub batches: usize,
    pub elapsed_secs: f64,
}

impl IngestSummary {
    /// Records dropped because their key was already stored.
    pub fn ignored(&self) -> usize {
        self.records - self.inserted
    }
}

/// Outcome of a yield file run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YieldSummary {
    pub records: usize,
    pub inserted: usize,
}

/// Accumulates rows and flushes them as one transaction per full batch.
struct BatchBuffer<'a> {
    db: &'a mut Database,
    rows: Vec<RawWeatherRecord>,
    batch_size: usize,
    inserted: usize,
    batches: usize,
}

impl<'a> BatchBuffer<'a> {
    fn new(db: &'a mut Database, batch_size: usize) -> Self {
        Self {
            db,
            rows: Vec::with_capacity(batch_size),
            batch_size,
            inserted: 0,
            batches: 0,
        }
    }

    fn push(&mut self, record: RawWeatherRecord) -> Result<(), IngestError> {
        self.rows.push(record);
        if self.rows.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IngestError> {
        if self.rows.is_empty() {
            return Ok(());
        }
        self.inserted += self.db.insert_weather_batch(&self.rows)?;
        self.batches += 1;
        self.rows.clear();
        Ok(())
    }
}

/// List the `*.txt` regular files directly inside `dir`, sorted by name.
pub fn list_weather_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| IngestError::io(dir, e))? {
        let entry = entry.map_err(|e| IngestError::io(dir, e))?;
        let path = entry.path();
        let is_txt = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(".txt"));
        if is_txt && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every weather file in `dir` into the `weather` table.
pub fn ingest_weather_dir(
    db: &mut Database,
    dir: &Path,
    config: &IngestConfig,
) -> Result<IngestSummary, IngestError> {
    config.validate()?;
    let started = Instant::now();
    info!("Ingestion started: {}", dir.display());

    let files = list_weather_files(dir)?;
    let mut summary = IngestSummary::default();
    let mut buffer = BatchBuffer::new(db, config.batch_size);

    for path in &files {
        let Some(station_id) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(station_id_from_file_name)
        else {
            match config.on_malformed {
                MalformedLinePolicy::Abort => {
                    return Err(IngestError::InvalidFileName { path: path.clone() });
                }
                MalformedLinePolicy::Skip => {
                    warn!("skipping {}: no station id in file name", path.display());
                    summary.skipped_files += 1;
                    continue;
                }
            }
        };
        let file_records =
            load_weather_file(&mut buffer, path, station_id, config, &mut summary)?;
        summary.files += 1;
        info!("loaded {} ({} records)", path.display(), file_records);
    }
    buffer.flush()?;

    summary.inserted = buffer.inserted;
    summary.batches = buffer.batches;
    summary.elapsed_secs = started.elapsed().as_secs_f64();
    info!(
        "Ingestion finished in {:.3}s: {} files, {} records, {} inserted, {} duplicates ignored, {} lines skipped, {} files skipped",
        summary.elapsed_secs,
        summary.files,
        summary.records,
        summary.inserted,
        summary.ignored(),
        summary.skipped_lines,
        summary.skipped_files
    );
    Ok(summary)
}

/// Stream one weather file into the buffer. Returns the records parsed.
fn load_weather_file(
    buffer: &mut BatchBuffer<'_>,
    path: &Path,
    station_id: &str,
    config: &IngestConfig,
    summary: &mut IngestSummary,
) -> Result<usize, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(BufReader::new(file));

    let mut record = csv::StringRecord::new();
    let mut parsed = 0;
    loop {
        let outcome = match rdr.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                if is_blank(&record) {
                    continue;
                }
                RawWeatherRecord::from_fields(station_id, record.iter())
            }
            Err(err) => Err(read_failure(path, err)?),
        };
        let line = record.position().map_or(0, |pos| pos.line());

        match outcome {
            Ok(row) => {
                buffer.push(row)?;
                parsed += 1;
            }
            Err(source) => match config.on_malformed {
                MalformedLinePolicy::Abort => {
                    return Err(IngestError::malformed(path, line, source));
                }
                MalformedLinePolicy::Skip => {
                    warn!("skipping {} line {}: {}", path.display(), line, source);
                    summary.skipped_lines += 1;
                }
            },
        }
    }

    summary.records += parsed;
    Ok(parsed)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

/// Split csv reader failures into fatal I/O and a per-line parse failure.
fn read_failure(path: &Path, err: csv::Error) -> Result<ParseError, IngestError> {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Err(IngestError::io(path, e)),
        csv::ErrorKind::Utf8 { .. } => Ok(ParseError::InvalidEncoding),
        other => Err(IngestError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:?}", other)),
        )),
    }
}

/// Load a yield file into the `crop_yield` table in one transaction.
///
/// The file is small, so it is parsed completely before anything is
/// written; a malformed line therefore leaves the table untouched.
pub fn ingest_yield_file(db: &mut Database, path: &Path) -> Result<YieldSummary, IngestError> {
    info!("Yield ingestion started: {}", path.display());
    let contents = fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    let rows = YieldRecord::parse_all(&contents)
        .map_err(|(line, source)| IngestError::malformed(path, line as u64, source))?;

    let inserted = if rows.is_empty() {
        0
    } else {
        db.insert_yield_batch(&rows)?
    };
    info!(
        "Yield ingestion finished: {} records, {} inserted",
        rows.len(),
        inserted
    );
    Ok(YieldSummary {
        records: rows.len(),
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wx_db::{Page, Table, WeatherFilter};

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn weather_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(&dir, "USC00110072.txt", "19850101\t-22\t-128\t94\n19850102\t-122\t-217\t0\n");
        write(&dir, "USC00110187.txt", "19850101\t-9999\t-9999\t-9999\n");
        write(&dir, "README.md", "not weather data\n");
        dir
    }

    #[test]
    fn loads_all_txt_files() {
        let dir = weather_dir();
        let mut db = Database::open_in_memory().unwrap();

        let summary = ingest_weather_dir(&mut db, dir.path(), &IngestConfig::default()).unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.batches, 1, "small input fits in one final batch");
        assert_eq!(db.count(Table::Weather).unwrap(), 3);
    }

    #[test]
    fn station_id_comes_from_file_name() {
        let dir = weather_dir();
        let mut db = Database::open_in_memory().unwrap();
        ingest_weather_dir(&mut db, dir.path(), &IngestConfig::default()).unwrap();

        let filter = WeatherFilter {
            station_id: Some("USC00110187".to_string()),
            date: None,
        };
        let rows = db.query_weather(&filter, Page::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].max_temp_c, None, "sentinel must be stored as NULL");
        assert_eq!(rows[0].precip_mm, None);
    }

    #[test]
    fn second_run_is_idempotent() {
        let dir = weather_dir();
        let mut db = Database::open_in_memory().unwrap();

        ingest_weather_dir(&mut db, dir.path(), &IngestConfig::default()).unwrap();
        let before = db.query_weather(&WeatherFilter::default(), Page::default()).unwrap();

        let again = ingest_weather_dir(&mut db, dir.path(), &IngestConfig::default()).unwrap();
        assert_eq!(again.records, 3);
        assert_eq!(again.inserted, 0);
        assert_eq!(again.ignored(), 3);

        let after = db.query_weather(&WeatherFilter::default(), Page::default()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn batch_size_controls_commit_count() {
        let dir = weather_dir();
        let mut db = Database::open_in_memory().unwrap();

        let config = IngestConfig::default().with_batch_size(1);
        let summary = ingest_weather_dir(&mut db, dir.path(), &config).unwrap();
        assert_eq!(summary.batches, 3);
        assert_eq!(db.count(Table::Weather).unwrap(), 3);

        let dir = weather_dir();
        let mut db = Database::open_in_memory().unwrap();
        let config = IngestConfig::default().with_batch_size(2);
        let summary = ingest_weather_dir(&mut db, dir.path(), &config).unwrap();
        assert_eq!(summary.batches, 2, "one full batch plus the final partial batch");
        assert_eq!(db.count(Table::Weather).unwrap(), 3);
    }

    #[test]
    fn malformed_line_aborts_by_default() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.txt", "20000101\t1\t2\t3\n");
        write(&dir, "B.txt", "20000101\t1\t2\t3\n20000102\t1\t2\n20000103\t1\t2\t3\n");
        let mut db = Database::open_in_memory().unwrap();

        let err = ingest_weather_dir(&mut db, dir.path(), &IngestConfig::default()).unwrap_err();
        match err {
            IngestError::MalformedRecord { path, line, source } => {
                assert!(path.ends_with("B.txt"));
                assert_eq!(line, 2);
                assert_eq!(source, ParseError::FieldCount { expected: 4, found: 3 });
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn batches_flushed_before_an_abort_stay_committed() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.txt", "20000101\t1\t2\t3\n20000102\t1\t2\t3\n");
        write(&dir, "B.txt", "bad line\n");
        let mut db = Database::open_in_memory().unwrap();

        let config = IngestConfig::default().with_batch_size(1);
        assert!(ingest_weather_dir(&mut db, dir.path(), &config).is_err());
        assert_eq!(db.count(Table::Weather).unwrap(), 2);
    }

    #[test]
    fn skip_policy_keeps_good_lines() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.txt", "20000101\t1\t2\t3\n2000-01-02\t1\t2\t3\n20000103\tx\t2\t3\n20000104\t4\t5\t6\n");
        let mut db = Database::open_in_memory().unwrap();

        let config = IngestConfig::default().with_malformed_policy(MalformedLinePolicy::Skip);
        let summary = ingest_weather_dir(&mut db, dir.path(), &config).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.skipped_lines, 2);
        assert_eq!(db.count(Table::Weather).unwrap(), 2);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.txt", "20000101\t1\t2\t3\n\n   \n20000102\t1\t2\t3\r\n");
        let mut db = Database::open_in_memory().unwrap();

        let summary = ingest_weather_dir(&mut db, dir.path(), &IngestConfig::default()).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.skipped_lines, 0);
    }

    #[test]
    fn stray_tabs_at_line_ends_load() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.txt", "20000101\t1\t2\t3\t\n\t20000102\t4\t5\t6\n");
        let mut db = Database::open_in_memory().unwrap();

        let summary = ingest_weather_dir(&mut db, dir.path(), &IngestConfig::default()).unwrap();
        assert_eq!(summary.records, 2);
        let rows = db.query_weather(&WeatherFilter::default(), Page::default()).unwrap();
        assert_eq!(rows[0].precip_mm, Some(3.0));
        assert_eq!(rows[1].max_temp_c, Some(4.0));
    }

    #[test]
    fn nameless_station_file_follows_policy() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".txt", "20000101\t1\t2\t3\n");
        write(&dir, "B.txt", "20000101\t1\t2\t3\n");

        let mut db = Database::open_in_memory().unwrap();
        let err = ingest_weather_dir(&mut db, dir.path(), &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidFileName { .. }));

        let mut db = Database::open_in_memory().unwrap();
        let config = IngestConfig::default().with_malformed_policy(MalformedLinePolicy::Skip);
        let summary = ingest_weather_dir(&mut db, dir.path(), &config).unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.skipped_files, 1);
        assert_eq!(db.count(Table::Weather).unwrap(), 1);
    }

    #[test]
    fn files_are_listed_in_name_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "C.txt", "");
        write(&dir, "A.txt", "");
        write(&dir, "B.TXT", "");
        write(&dir, "B.txt", "");
        fs::create_dir(dir.path().join("D.txt")).unwrap();

        let names: Vec<String> = list_weather_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.txt", "B.txt", "C.txt"]);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut db = Database::open_in_memory().unwrap();
        let err = ingest_weather_dir(&mut db, &dir.path().join("nope"), &IngestConfig::default())
            .unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn zero_batch_size_fails_before_reading() {
        let mut db = Database::open_in_memory().unwrap();
        let config = IngestConfig::default().with_batch_size(0);
        let err = ingest_weather_dir(&mut db, Path::new("/definitely/not/here"), &config).unwrap_err();
        assert!(matches!(err, IngestError::Configuration(_)));
    }

    #[test]
    fn yield_file_loads_and_dedups() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "US_corn_grain_yield.txt", "1985\t225447\n1986\t208944\n\n1985\t1\n");
        let mut db = Database::open_in_memory().unwrap();

        let summary = ingest_yield_file(&mut db, &path).unwrap();
        assert_eq!(summary, YieldSummary { records: 3, inserted: 2 });

        let rows = db.query_yields(Page::default()).unwrap();
        assert_eq!(rows[0], YieldRecord { year: 1985, total_yield: 225447 });

        let again = ingest_yield_file(&mut db, &path).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(db.count(Table::CropYield).unwrap(), 2);
    }

    #[test]
    fn malformed_yield_file_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "yield.txt", "1985\t225447\n1986 x\n");
        let mut db = Database::open_in_memory().unwrap();

        let err = ingest_yield_file(&mut db, &path).unwrap_err();
        assert!(matches!(err, IngestError::MalformedRecord { line: 2, .. }));
        assert_eq!(db.count(Table::CropYield).unwrap(), 0);
    }

    #[test]
    fn empty_yield_file_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "yield.txt", "\n");
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(ingest_yield_file(&mut db, &path).unwrap(), YieldSummary::default());
    }
}
