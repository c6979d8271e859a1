use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
}

struct SchemaMigration {
    version: u32,
    sql: &'static str,
}

// Timestamps are RFC 3339 UTC text with nanoseconds, so text order is time
// order and `substr(x, 1, 10)` is the calendar date.
const SCHEMA_MIGRATIONS: &[SchemaMigration] = &[
    SchemaMigration {
        version: 1,
        sql: "
            CREATE TABLE tasks (
                id              TEXT PRIMARY KEY NOT NULL,
                title           TEXT NOT NULL,
                description     TEXT,
                status          TEXT NOT NULL DEFAULT 'todo'
                                CHECK (status IN ('todo', 'done', 'cancelled')),
                priority        INTEGER CHECK (priority BETWEEN 1 AND 3),
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );
            CREATE TABLE notes (
                id              TEXT PRIMARY KEY NOT NULL,
                title           TEXT NOT NULL,
                content         TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );
            CREATE TABLE events (
                id              TEXT PRIMARY KEY NOT NULL,
                title           TEXT NOT NULL,
                description     TEXT,
                occurred_at     TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );
            CREATE INDEX idx_tasks_created_at ON tasks(created_at);
            CREATE INDEX idx_tasks_status ON tasks(status);
            CREATE INDEX idx_notes_created_at ON notes(created_at);
            CREATE INDEX idx_events_occurred_at ON events(occurred_at);
        ",
    },
    SchemaMigration {
        version: 2,
        sql: "
            CREATE TABLE projects (
                id              TEXT PRIMARY KEY NOT NULL,
                name            TEXT NOT NULL,
                description     TEXT,
                type            TEXT NOT NULL DEFAULT 'project'
                                CHECK (type IN ('project', 'daily_log', 'weekly_log', 'monthly_log')),
                date            TEXT,
                week_start      TEXT,
                year            INTEGER,
                month           INTEGER,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );
            CREATE TABLE log_entries (
                id              TEXT PRIMARY KEY NOT NULL,
                log_id          TEXT NOT NULL,
                task_id         TEXT,
                note_id         TEXT,
                event_id        TEXT,
                entry_date      TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                CHECK ((task_id IS NOT NULL) + (note_id IS NOT NULL) + (event_id IS NOT NULL) = 1)
            );
            CREATE TABLE migrations (
                id              TEXT PRIMARY KEY NOT NULL,
                task_id         TEXT NOT NULL,
                from_entry_id   TEXT NOT NULL,
                to_entry_id     TEXT NOT NULL,
                migrated_at     TEXT NOT NULL
            );
            CREATE INDEX idx_projects_type_date ON projects(type, date);
            CREATE INDEX idx_log_entries_log_id ON log_entries(log_id);
            CREATE INDEX idx_log_entries_task_id ON log_entries(task_id);
            CREATE INDEX idx_log_entries_note_id ON log_entries(note_id);
            CREATE INDEX idx_log_entries_event_id ON log_entries(event_id);
            CREATE INDEX idx_migrations_task_id ON migrations(task_id);
        ",
    },
];

/// Latest schema version this binary knows how to create.
pub fn latest_schema_version() -> u32 {
    SCHEMA_MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Owned handle to the journal's SQLite file.
///
/// Dropping it closes the connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and bring the schema up to date
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let started_at = Instant::now();
        let conn = Connection::open(path).inspect_err(|err| {
            error!(
                "event=db_open module=db status=error mode=file path={} error={}",
                path.display(),
                err
            );
        })?;
        let db = Self::bootstrap(conn)?;
        info!(
            "event=db_open module=db status=ok mode=file path={} duration_ms={}",
            path.display(),
            started_at.elapsed().as_millis()
        );
        Ok(db)
    }

    /// In-memory database with the full schema; used by tests.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self::bootstrap(conn)?;
        info!("event=db_open module=db status=ok mode=memory");
        Ok(db)
    }

    fn bootstrap(conn: Connection) -> Result<Self, DatabaseError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        let mut db = Database { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    fn apply_migrations(&mut self) -> Result<(), DatabaseError> {
        let current = self.schema_version()?;
        let latest = latest_schema_version();

        if current > latest {
            return Err(DatabaseError::UnsupportedSchemaVersion {
                db_version: current,
                latest_supported: latest,
            });
        }
        if current == latest {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for migration in SCHEMA_MIGRATIONS.iter().filter(|m| m.version > current) {
            tx.execute_batch(migration.sql)?;
            tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
            info!(
                "event=schema_migration module=db status=ok version={}",
                migration.version
            );
        }
        tx.commit()?;
        Ok(())
    }

    /// Schema version recorded in `PRAGMA user_version`
    pub fn schema_version(&self) -> Result<u32, DatabaseError> {
        let version = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        Ok(version)
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(db: &Database, table: &str) -> bool {
        db.conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, i64>(0),
            )
            .unwrap()
            == 1
    }

    #[test]
    fn in_memory_database_has_every_table() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), latest_schema_version());
        for table in ["tasks", "notes", "events", "projects", "log_entries", "migrations"] {
            assert!(table_exists(&db, table), "missing table {table}");
        }
    }

    #[test]
    fn reopening_a_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dot.db");

        let first = Database::open(&path).unwrap();
        drop(first);
        let second = Database::open(&path).unwrap();
        assert_eq!(second.schema_version().unwrap(), latest_schema_version());
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
        drop(conn);

        match Database::open(&path) {
            Err(DatabaseError::UnsupportedSchemaVersion { db_version, .. }) => {
                assert_eq!(db_version, 999)
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opening a newer schema should fail"),
        }
    }
}
