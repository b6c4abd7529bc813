//! SQLite-backed record store

use crate::error::StoreError;
use crate::record::ExperimentRecord;
use crate::status::{validate_transition, ExperimentStatus};
use crate::store::RecordStore;
use chaoskit_spec::{CommandShape, FlagMap};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS experiment (
    uid         TEXT PRIMARY KEY,
    command     TEXT NOT NULL,
    sub_command TEXT NOT NULL,
    flag        TEXT NOT NULL DEFAULT '',
    status      TEXT NOT NULL,
    error       TEXT NOT NULL DEFAULT '',
    create_time TEXT NOT NULL,
    update_time TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS experiment_command_idx ON experiment (command, sub_command);
";

const COLUMNS: &str = "uid, command, sub_command, flag, status, error, create_time, update_time";

impl ToSql for ExperimentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for ExperimentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<ExperimentRecord> {
    Ok(ExperimentRecord {
        uid: row.get(0)?,
        command: row.get(1)?,
        sub_command: row.get(2)?,
        flag: row.get(3)?,
        status: row.get(4)?,
        error: row.get(5)?,
        create_time: row.get(6)?,
        update_time: row.get(7)?,
    })
}

/// Record store persisted in a SQLite database file
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening sqlite record store");
        Self::init(Connection::open(path)?)
    }

    /// Database living only as long as this value
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl RecordStore for SqliteStore {
    fn insert(&self, record: &ExperimentRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let sql = format!("INSERT INTO experiment ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)");
        let result = conn.execute(
            &sql,
            params![
                record.uid,
                record.command,
                record.sub_command,
                record.flag,
                record.status,
                record.error,
                record.create_time,
                record.update_time,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(record.uid.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn query_by_uid(&self, uid: &str) -> Result<Option<ExperimentRecord>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {COLUMNS} FROM experiment WHERE uid = ?1");
        Ok(conn.query_row(&sql, params![uid], read_record).optional()?)
    }

    fn query_by_command_shape(
        &self,
        shape: &CommandShape,
        flags: &FlagMap,
    ) -> Result<Vec<ExperimentRecord>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {COLUMNS} FROM experiment WHERE command = ?1 AND sub_command = ?2 ORDER BY create_time"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![shape.command, shape.sub_command], read_record)?;

        let mut matched = Vec::new();
        for row in rows {
            let record = row?;
            if record.matches(shape, flags) {
                matched.push(record);
            }
        }
        Ok(matched)
    }

    fn update_status(
        &self,
        uid: &str,
        status: ExperimentStatus,
        note: &str,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let current: Option<ExperimentStatus> = tx
            .query_row(
                "SELECT status FROM experiment WHERE uid = ?1",
                params![uid],
                |row| row.get(0),
            )
            .optional()?;
        let current = current.ok_or_else(|| StoreError::NotFound(uid.to_string()))?;
        if current == status {
            return Ok(());
        }
        validate_transition(current, status).map_err(|e| StoreError::illegal_transition(uid, e))?;

        tx.execute(
            "UPDATE experiment SET status = ?1, error = ?2, update_time = ?3 WHERE uid = ?4",
            params![status, note, Utc::now(), uid],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_by_uid(&self, uid: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM experiment WHERE uid = ?1", params![uid])?;
        Ok(())
    }

    fn list(&self, status: Option<ExperimentStatus>) -> Result<Vec<ExperimentRecord>, StoreError> {
        let conn = self.conn.lock();
        let records = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {COLUMNS} FROM experiment WHERE status = ?1 ORDER BY create_time DESC"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![status], read_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!("SELECT {COLUMNS} FROM experiment ORDER BY create_time DESC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], read_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(records)
    }
}
