//! SQLite storage gateway for weather, crop-yield and station statistics.
//!
//! This crate owns the relational schema and every SQL statement in the
//! workspace. The ingestion and aggregation commands only go through the
//! primitives exposed here:
//!
//! - bulk insert-or-ignore keyed on each table's unique constraint
//!   ([`loader`])
//! - `table_exists` / `create_table` / `delete_all` and the grouped
//!   aggregate query ([`stats`])
//! - filtered, paginated reads ([`queries`])
//!
//! # Usage
//!
//! ```rust
//! use wx_db::Database;
//! use wx_records::YieldRecord;
//!
//! let mut db = Database::open_in_memory().unwrap();
//! db.insert_yield_batch(&[YieldRecord { year: 1985, total_yield: 225447 }]).unwrap();
//! assert_eq!(db.count(wx_db::Table::CropYield).unwrap(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema`] for the DDL.
//!
//! - `weather` - one row per station and day, unique on `(station_id, date)`
//! - `crop_yield` - one row per year, unique on `year`
//! - `weather_stats` - derived yearly statistics, unique on `(station_id, year)`
//!
//! Functions that take a `&Connection` also accept a
//! [`rusqlite::Transaction`], so callers can fold several gateway calls
//! into one transaction of their own.

pub mod loader;
pub mod models;
pub mod queries;
pub mod schema;
pub mod stats;

pub use models::{Page, StatsFilter, WeatherFilter};
pub use schema::Table;

use rusqlite::{Connection, Transaction};
use std::path::Path;
use thiserror::Error;

/// Failures raised by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection, statement or transaction failure in SQLite.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    /// A read query asked for a page outside the accepted range. Raised
    /// before any SQL runs.
    #[error("invalid page request: {0}")]
    InvalidPage(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Handle on the SQLite database.
///
/// Opening a database applies the schema, so a fresh file is immediately
/// usable. The handle is passed explicitly to every operation; there is
/// no global connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        log::debug!("opened database {}", path.display());
        Self::with_connection(conn)
    }

    /// Create a private in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(&schema::create_schema())?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection for gateway functions.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction. Dropping it without `commit` rolls back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}
