use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

use crate::{error::StoreError, models::progress::Streak, progress::ProgressStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS best_scores (
    key  TEXT PRIMARY KEY,
    best INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS streak (
    id        INTEGER PRIMARY KEY CHECK (id = 1),
    count     INTEGER NOT NULL,
    last_date TEXT
);
";

/// Progress ledger kept next to the question bank.
pub struct SqliteProgressStore {
    conn: Mutex<Connection>,
}

impl SqliteProgressStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        info!("Progress ledger opened at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteProgressStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("progress ledger lock poisoned".to_string()))
    }
}

fn read_streak(conn: &Connection) -> Result<Streak, StoreError> {
    let streak = conn
        .query_row("SELECT count, last_date FROM streak WHERE id = 1", [], |row| {
            Ok(Streak {
                count: row.get(0)?,
                last_date: row.get::<_, Option<NaiveDate>>(1)?,
            })
        })
        .optional()?;
    Ok(streak.unwrap_or_default())
}

impl ProgressStore for SqliteProgressStore {
    fn get_best(&self, key: &str) -> Result<u32, StoreError> {
        let best = self
            .conn()?
            .query_row(
                "SELECT best FROM best_scores WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(best.unwrap_or(0))
    }

    fn set_best_if_higher(&self, key: &str, score: u32) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO best_scores (key, best) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET best = excluded.best \
             WHERE excluded.best > best_scores.best",
            params![key, score],
        )?;
        Ok(())
    }

    fn get_streak(&self) -> Result<Streak, StoreError> {
        read_streak(&*self.conn()?)
    }

    fn record_completion_today(&self, today: NaiveDate) -> Result<u32, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let streak = read_streak(&tx)?.record(today);
        tx.execute(
            "INSERT INTO streak (id, count, last_date) VALUES (1, ?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET count = excluded.count, last_date = excluded.last_date",
            params![streak.count, streak.last_date],
        )?;
        tx.commit()?;
        Ok(streak.count)
    }
}
