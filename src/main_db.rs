use anyhow::Result;
use chrono::DateTime;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::cmp::Ordering;
use std::error::Error;
use std::path::Path;
use std::str::FromStr;

use crate::route::RoutePoint;
use crate::utils;

/* The main database. `route_point` is an append-only log of accepted location
samples, keyed by insertion. Every field of a row is nullable because points
may come from imports or older versions that did not record all of them.
Segments are never stored, they are derived from the full history on read.
*/

pub const MAIN_DB_FILE_NAME: &str = "main.db";

#[allow(clippy::type_complexity)]
fn migrate(
    conn: &mut Connection,
    migrations: &[&dyn Fn(&Transaction) -> Result<()>],
) -> Result<()> {
    let tx = conn.transaction()?;

    let version = utils::db::init_metadata_and_get_version(&tx)? as usize;
    let target_version = migrations.len();
    debug!(
        "current version = {}, target_version = {}",
        version, target_version
    );
    match version.cmp(&target_version) {
        Ordering::Equal => (),
        Ordering::Less => {
            for (i, f) in migrations.iter().enumerate().skip(version) {
                info!("running migration for version: {}", i + 1);
                f(&tx)?;
            }
            utils::db::set_version_in_metadata(&tx, target_version as i32)?;
        }
        Ordering::Greater => {
            bail!(
                "version too high: current version = {}, target_version = {}",
                version,
                target_version
            );
        }
    }
    tx.commit()?;
    Ok(())
}

fn run_migrations(conn: &mut Connection) -> Result<()> {
    migrate(
        conn,
        &[&|tx| {
            let sql = "
            CREATE TABLE route_point (
                id             INTEGER PRIMARY KEY AUTOINCREMENT
                                    UNIQUE
                                    NOT NULL,
                timestamp_ms   INTEGER,
                lat            REAL,
                lng            REAL
            );
            CREATE INDEX route_point_timestamp_index ON route_point (
                timestamp_ms
            );
            CREATE TABLE setting (
                key               TEXT    PRIMARY KEY
                                          NOT NULL
                                          UNIQUE,
                value             TEXT
            );
            ";
            for s in sql_split::split(sql) {
                tx.execute(&s, ())?;
            }
            Ok(())
        }],
    )
}

pub struct Txn<'a> {
    db_txn: rusqlite::Transaction<'a>,
}

impl Txn<'_> {
    /// All stored points ordered by timestamp. Points without a timestamp come
    /// first, ties keep insertion order.
    pub fn read_all_route_points(&self) -> Result<Vec<RoutePoint>> {
        let mut query = self
            .db_txn
            .prepare("SELECT timestamp_ms, lat, lng FROM route_point ORDER BY timestamp_ms, id;")?;
        let results = query.query_map((), |row| {
            let timestamp_ms: Option<i64> = row.get(0)?;
            Ok(RoutePoint {
                latitude: row.get(1)?,
                longitude: row.get(2)?,
                timestamp: timestamp_ms.and_then(DateTime::from_timestamp_millis),
            })
        })?;
        let mut route_points = Vec::new();
        for result in results {
            route_points.push(result?);
        }
        Ok(route_points)
    }

    pub fn append_route_points(&mut self, route_points: &[RoutePoint]) -> Result<()> {
        let sql = "INSERT INTO route_point (timestamp_ms, lat, lng) VALUES (?1, ?2, ?3);";
        let mut stmt = self.db_txn.prepare_cached(sql)?;
        for route_point in route_points {
            stmt.execute((
                route_point.timestamp.map(|x| x.timestamp_millis()),
                route_point.latitude,
                route_point.longitude,
            ))?;
        }
        Ok(())
    }
}

/// Where the main database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    Dir(String),
    InMemory,
}

pub struct MainDb {
    conn: Connection,
}

impl MainDb {
    pub fn open(support_dir: &str) -> Result<MainDb> {
        Self::open_at(&DbLocation::Dir(support_dir.to_owned()))
    }

    pub fn open_at(location: &DbLocation) -> Result<MainDb> {
        let mut conn = match location {
            DbLocation::Dir(dir) => {
                debug!("open and run migration for {}/{}", dir, MAIN_DB_FILE_NAME);
                Connection::open(Path::new(dir).join(MAIN_DB_FILE_NAME))?
            }
            DbLocation::InMemory => {
                debug!("open and run migration for in-memory db");
                Connection::open_in_memory()?
            }
        };
        run_migrations(&mut conn)?;
        Ok(MainDb { conn })
    }

    pub fn with_txn<F, O>(&mut self, f: F) -> Result<O>
    where
        F: FnOnce(&mut Txn) -> Result<O>,
    {
        let mut txn = Txn {
            db_txn: self.conn.transaction()?,
        };
        let output = f(&mut txn)?;
        txn.db_txn.commit()?;
        Ok(output)
    }

    pub fn flush(&self) -> Result<()> {
        self.conn.cache_flush()?;
        Ok(())
    }

    /* NOTE:
      Single appends happen for every accepted fix, so they skip `Txn` and use
      a small transaction of their own. Commit is the flush.
    */
    pub fn append_route_point(&mut self, route_point: &RoutePoint) -> Result<()> {
        let tx = self.conn.transaction()?;
        let sql = "INSERT INTO route_point (timestamp_ms, lat, lng) VALUES (?1, ?2, ?3);";
        tx.prepare_cached(sql)?.execute((
            route_point.timestamp.map(|x| x.timestamp_millis()),
            route_point.latitude,
            route_point.longitude,
        ))?;
        tx.commit()?;
        Ok(())
    }

    fn get_setting<T: FromStr>(&mut self, setting: Setting) -> Result<Option<T>>
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        let tx = self.conn.transaction()?;
        let mut query = tx.prepare("SELECT value FROM setting WHERE key = ?1;")?;
        let result: Option<String> = query
            .query_row([setting.to_db_key()], |row| row.get(0))
            .optional()?;
        match result {
            None => Ok(None),
            Some(s) => {
                let v = FromStr::from_str(&s)?;
                Ok(Some(v))
            }
        }
    }

    pub fn get_setting_with_default<T: FromStr>(&mut self, setting: Setting, default: T) -> T
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        match self.get_setting(setting) {
            Ok(v) => v,
            Err(error) => {
                warn!(
                    "[main_db.get_setting_with_default] setting:{:?}, error:{}",
                    setting, error
                );
                None
            }
        }
        .unwrap_or(default)
    }

    pub fn set_setting<T: ToString>(&mut self, setting: Setting, value: T) -> Result<()> {
        let tx = self.conn.transaction()?;
        let sql = "INSERT OR REPLACE INTO setting (key, value) VALUES (?1, ?2);";
        tx.execute(sql, (setting.to_db_key(), value.to_string()))?;
        tx.commit()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Setting {
    RawDataMode,
}

impl Setting {
    fn to_db_key(self) -> &'static str {
        match self {
            Self::RawDataMode => "RAW_DATA_MODE",
        }
    }
}
