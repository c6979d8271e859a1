//! SQLite-backed repositories.
//!
//! Each repository borrows a connection; the unit of work decides which
//! transaction that connection is in. Ids are stored as hyphenated UUID text
//! and timestamps as RFC 3339 UTC text with nanoseconds, which keeps
//! round-trips exact.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, Params, Row, params};
use uuid::Uuid;

use super::{
    EventRepository, LogEntryRepository, MigrationRepository, NoteRepository, ProjectRepository,
    RepoError, RepoResult, TaskRepository,
};
use crate::models::{
    EntityId, EntryTarget, Event, LogEntry, Migration, Note, Priority, Project, ProjectKind, Task,
    TaskStatus,
};
use crate::operations;

const TASK_COLUMNS: &str = "id, title, description, status, priority, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, title, content, created_at, updated_at";
const EVENT_COLUMNS: &str = "id, title, description, occurred_at, created_at, updated_at";
const PROJECT_COLUMNS: &str =
    "id, name, description, type, date, week_start, year, month, created_at, updated_at";
const LOG_ENTRY_COLUMNS: &str = "id, log_id, task_id, note_id, event_id, entry_date, created_at";
const MIGRATION_COLUMNS: &str = "id, task_id, from_entry_id, to_entry_id, migrated_at";

fn timestamp_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn timestamp_from_db(row: &Row<'_>, column: &str) -> RepoResult<DateTime<Utc>> {
    let text: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| RepoError::InvalidData(format!("invalid timestamp `{text}` in {column}")))
}

fn date_from_text(text: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{text}` in {column}")))
}

fn date_from_db(row: &Row<'_>, column: &str) -> RepoResult<NaiveDate> {
    let text: String = row.get(column)?;
    date_from_text(&text, column)
}

fn uuid_from_text(text: &str, column: &str) -> RepoResult<EntityId> {
    Uuid::parse_str(text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{text}` in {column}")))
}

fn uuid_from_db(row: &Row<'_>, column: &str) -> RepoResult<EntityId> {
    let text: String = row.get(column)?;
    uuid_from_text(&text, column)
}

fn optional_uuid_from_db(row: &Row<'_>, column: &str) -> RepoResult<Option<EntityId>> {
    row.get::<_, Option<String>>(column)?
        .map(|text| uuid_from_text(&text, column))
        .transpose()
}

fn query_all<T>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

fn query_one<T>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(parse(row)?)),
        None => Ok(None),
    }
}

pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn row_to_task(row: &Row<'_>) -> RepoResult<Task> {
        let status_text: String = row.get("status")?;
        let status = status_text
            .parse::<TaskStatus>()
            .map_err(|e| RepoError::InvalidData(format!("{e} in tasks.status")))?;
        let priority = row
            .get::<_, Option<i64>>("priority")?
            .map(Priority::try_from)
            .transpose()?;

        Ok(Task {
            id: Some(uuid_from_db(row, "id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            status,
            priority,
            created_at: timestamp_from_db(row, "created_at")?,
            updated_at: timestamp_from_db(row, "updated_at")?,
        })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn add(&mut self, task: &mut Task) -> RepoResult<EntityId> {
        let id = *task.id.get_or_insert_with(Uuid::new_v4);
        self.conn.execute(
            "INSERT INTO tasks (id, title, description, status, priority, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.to_string(),
                task.title,
                task.description,
                task.status.as_str(),
                task.priority.map(i64::from),
                timestamp_to_db(task.created_at),
                timestamp_to_db(task.updated_at),
            ],
        )?;
        Ok(id)
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Task>> {
        query_one(
            self.conn,
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id.to_string()],
            Self::row_to_task,
        )
    }

    fn list(&self, status: Option<TaskStatus>) -> RepoResult<Vec<Task>> {
        query_all(
            self.conn,
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE ?1 IS NULL OR status = ?1
                 ORDER BY created_at ASC, id ASC"
            ),
            params![status.map(|s| s.as_str())],
            Self::row_to_task,
        )
    }

    fn update(&mut self, task: &Task) -> RepoResult<()> {
        let Some(id) = task.id else {
            return Ok(());
        };
        self.conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, status = ?3, priority = ?4,
             created_at = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                task.title,
                task.description,
                task.status.as_str(),
                task.priority.map(i64::from),
                timestamp_to_db(task.created_at),
                timestamp_to_db(task.updated_at),
                id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Task>> {
        query_all(
            self.conn,
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE substr(created_at, 1, 10) = ?1
                 ORDER BY created_at ASC, id ASC"
            ),
            params![date.to_string()],
            Self::row_to_task,
        )
    }
}

pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn row_to_note(row: &Row<'_>) -> RepoResult<Note> {
        Ok(Note {
            id: Some(uuid_from_db(row, "id")?),
            title: row.get("title")?,
            content: row.get("content")?,
            created_at: timestamp_from_db(row, "created_at")?,
            updated_at: timestamp_from_db(row, "updated_at")?,
        })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn add(&mut self, note: &mut Note) -> RepoResult<EntityId> {
        let id = *note.id.get_or_insert_with(Uuid::new_v4);
        self.conn.execute(
            "INSERT INTO notes (id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                note.title,
                note.content,
                timestamp_to_db(note.created_at),
                timestamp_to_db(note.updated_at),
            ],
        )?;
        Ok(id)
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Note>> {
        query_one(
            self.conn,
            &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
            params![id.to_string()],
            Self::row_to_note,
        )
    }

    fn list(&self) -> RepoResult<Vec<Note>> {
        query_all(
            self.conn,
            &format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at DESC, id ASC"),
            [],
            Self::row_to_note,
        )
    }

    fn update(&mut self, note: &Note) -> RepoResult<()> {
        let Some(id) = note.id else {
            return Ok(());
        };
        self.conn.execute(
            "UPDATE notes SET title = ?1, content = ?2, created_at = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                note.title,
                note.content,
                timestamp_to_db(note.created_at),
                timestamp_to_db(note.updated_at),
                id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Note>> {
        query_all(
            self.conn,
            &format!(
                "SELECT {NOTE_COLUMNS} FROM notes
                 WHERE substr(created_at, 1, 10) = ?1
                 ORDER BY created_at DESC, id ASC"
            ),
            params![date.to_string()],
            Self::row_to_note,
        )
    }
}

pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn row_to_event(row: &Row<'_>) -> RepoResult<Event> {
        Ok(Event {
            id: Some(uuid_from_db(row, "id")?),
            title: row.get("title")?,
            description: row.get("description")?,
            occurred_at: timestamp_from_db(row, "occurred_at")?,
            created_at: timestamp_from_db(row, "created_at")?,
            updated_at: timestamp_from_db(row, "updated_at")?,
        })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn add(&mut self, event: &mut Event) -> RepoResult<EntityId> {
        let id = *event.id.get_or_insert_with(Uuid::new_v4);
        self.conn.execute(
            "INSERT INTO events (id, title, description, occurred_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                event.title,
                event.description,
                timestamp_to_db(event.occurred_at),
                timestamp_to_db(event.created_at),
                timestamp_to_db(event.updated_at),
            ],
        )?;
        Ok(id)
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Event>> {
        query_one(
            self.conn,
            &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
            params![id.to_string()],
            Self::row_to_event,
        )
    }

    fn list(&self) -> RepoResult<Vec<Event>> {
        query_all(
            self.conn,
            &format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY occurred_at ASC, id ASC"),
            [],
            Self::row_to_event,
        )
    }

    fn update(&mut self, event: &Event) -> RepoResult<()> {
        let Some(id) = event.id else {
            return Ok(());
        };
        self.conn.execute(
            "UPDATE events SET title = ?1, description = ?2, occurred_at = ?3,
             created_at = ?4, updated_at = ?5 WHERE id = ?6",
            params![
                event.title,
                event.description,
                timestamp_to_db(event.occurred_at),
                timestamp_to_db(event.created_at),
                timestamp_to_db(event.updated_at),
                id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM events WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Event>> {
        self.list_by_range(date, date)
    }

    fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<Event>> {
        query_all(
            self.conn,
            &format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE substr(occurred_at, 1, 10) BETWEEN ?1 AND ?2
                 ORDER BY occurred_at ASC, id ASC"
            ),
            params![start.to_string(), end.to_string()],
            Self::row_to_event,
        )
    }
}

pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn row_to_project(row: &Row<'_>) -> RepoResult<Project> {
        let kind_text: String = row.get("type")?;
        let kind = match kind_text.as_str() {
            "project" => ProjectKind::Project,
            "daily_log" => ProjectKind::DailyLog {
                date: date_from_db(row, "date")?,
            },
            "weekly_log" => ProjectKind::WeeklyLog {
                week_start: date_from_db(row, "week_start")?,
            },
            "monthly_log" => {
                let year: Option<i32> = row.get("year")?;
                let month: Option<u32> = row.get("month")?;
                match (year, month) {
                    (Some(year), Some(month)) => ProjectKind::MonthlyLog { year, month },
                    _ => {
                        return Err(RepoError::InvalidData(
                            "monthly log without year/month".to_string(),
                        ));
                    }
                }
            }
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid project type `{other}` in projects.type"
                )));
            }
        };

        Ok(Project {
            id: Some(uuid_from_db(row, "id")?),
            name: row.get("name")?,
            description: row.get("description")?,
            kind,
            created_at: timestamp_from_db(row, "created_at")?,
            updated_at: timestamp_from_db(row, "updated_at")?,
        })
    }
}

/// Splits a kind into its nullable columns: date, week_start, year, month.
fn kind_columns(kind: ProjectKind) -> (Option<String>, Option<String>, Option<i32>, Option<u32>) {
    match kind {
        ProjectKind::Project => (None, None, None, None),
        ProjectKind::DailyLog { date } => (Some(date.to_string()), None, None, None),
        ProjectKind::WeeklyLog { week_start } => (None, Some(week_start.to_string()), None, None),
        ProjectKind::MonthlyLog { year, month } => (None, None, Some(year), Some(month)),
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn add(&mut self, project: &mut Project) -> RepoResult<EntityId> {
        let id = *project.id.get_or_insert_with(Uuid::new_v4);
        let (date, week_start, year, month) = kind_columns(project.kind);
        self.conn.execute(
            "INSERT INTO projects (id, name, description, type, date, week_start, year, month,
                                   created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id.to_string(),
                project.name,
                project.description,
                project.kind.as_str(),
                date,
                week_start,
                year,
                month,
                timestamp_to_db(project.created_at),
                timestamp_to_db(project.updated_at),
            ],
        )?;
        Ok(id)
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Project>> {
        query_one(
            self.conn,
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            params![id.to_string()],
            Self::row_to_project,
        )
    }

    fn list(&self) -> RepoResult<Vec<Project>> {
        query_all(
            self.conn,
            &format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at ASC, id ASC"),
            [],
            Self::row_to_project,
        )
    }

    fn update(&mut self, project: &Project) -> RepoResult<()> {
        let Some(id) = project.id else {
            return Ok(());
        };
        let (date, week_start, year, month) = kind_columns(project.kind);
        self.conn.execute(
            "UPDATE projects SET name = ?1, description = ?2, type = ?3, date = ?4,
             week_start = ?5, year = ?6, month = ?7, created_at = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                project.name,
                project.description,
                project.kind.as_str(),
                date,
                week_start,
                year,
                month,
                timestamp_to_db(project.created_at),
                timestamp_to_db(project.updated_at),
                id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn daily_log_for(&mut self, date: NaiveDate) -> RepoResult<Project> {
        let existing = query_one(
            self.conn,
            &format!(
                "SELECT {PROJECT_COLUMNS} FROM projects
                 WHERE type = 'daily_log' AND date = ?1
                 ORDER BY created_at ASC, id ASC LIMIT 1"
            ),
            params![date.to_string()],
            Self::row_to_project,
        )?;
        if let Some(log) = existing {
            return Ok(log);
        }

        let mut log = operations::create_daily_log(Some(date))?;
        self.add(&mut log)?;
        log::debug!("event=daily_log_created module=repository date={date}");
        Ok(log)
    }
}

pub struct SqliteLogEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLogEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn row_to_entry(row: &Row<'_>) -> RepoResult<LogEntry> {
        let mut entry = LogEntry::from_parts(
            uuid_from_db(row, "log_id")?,
            optional_uuid_from_db(row, "task_id")?,
            optional_uuid_from_db(row, "note_id")?,
            optional_uuid_from_db(row, "event_id")?,
            date_from_db(row, "entry_date")?,
        )?;
        entry.id = Some(uuid_from_db(row, "id")?);
        entry.created_at = timestamp_from_db(row, "created_at")?;
        Ok(entry)
    }
}

fn target_column(target: EntryTarget) -> &'static str {
    match target {
        EntryTarget::Task(_) => "task_id",
        EntryTarget::Note(_) => "note_id",
        EntryTarget::Event(_) => "event_id",
    }
}

impl LogEntryRepository for SqliteLogEntryRepository<'_> {
    fn add(&mut self, entry: &mut LogEntry) -> RepoResult<EntityId> {
        let id = *entry.id.get_or_insert_with(Uuid::new_v4);
        self.conn.execute(
            "INSERT INTO log_entries (id, log_id, task_id, note_id, event_id, entry_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.to_string(),
                entry.log_id.to_string(),
                entry.target.task_id().map(|id| id.to_string()),
                entry.target.note_id().map(|id| id.to_string()),
                entry.target.event_id().map(|id| id.to_string()),
                entry.entry_date.to_string(),
                timestamp_to_db(entry.created_at),
            ],
        )?;
        Ok(id)
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<LogEntry>> {
        query_one(
            self.conn,
            &format!("SELECT {LOG_ENTRY_COLUMNS} FROM log_entries WHERE id = ?1"),
            params![id.to_string()],
            Self::row_to_entry,
        )
    }

    fn list(&self) -> RepoResult<Vec<LogEntry>> {
        query_all(
            self.conn,
            &format!("SELECT {LOG_ENTRY_COLUMNS} FROM log_entries ORDER BY created_at ASC, id ASC"),
            [],
            Self::row_to_entry,
        )
    }

    fn update(&mut self, entry: &LogEntry) -> RepoResult<()> {
        let Some(id) = entry.id else {
            return Ok(());
        };
        self.conn.execute(
            "UPDATE log_entries SET log_id = ?1, task_id = ?2, note_id = ?3, event_id = ?4,
             entry_date = ?5, created_at = ?6 WHERE id = ?7",
            params![
                entry.log_id.to_string(),
                entry.target.task_id().map(|id| id.to_string()),
                entry.target.note_id().map(|id| id.to_string()),
                entry.target.event_id().map(|id| id.to_string()),
                entry.entry_date.to_string(),
                timestamp_to_db(entry.created_at),
                id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM log_entries WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn list_by_log(&self, log_id: EntityId) -> RepoResult<Vec<LogEntry>> {
        query_all(
            self.conn,
            &format!(
                "SELECT {LOG_ENTRY_COLUMNS} FROM log_entries
                 WHERE log_id = ?1 ORDER BY created_at ASC, id ASC"
            ),
            params![log_id.to_string()],
            Self::row_to_entry,
        )
    }

    fn list_for_target(&self, target: EntryTarget) -> RepoResult<Vec<LogEntry>> {
        query_all(
            self.conn,
            &format!(
                "SELECT {LOG_ENTRY_COLUMNS} FROM log_entries
                 WHERE {} = ?1 ORDER BY created_at ASC, id ASC",
                target_column(target)
            ),
            params![target.id().to_string()],
            Self::row_to_entry,
        )
    }

    fn delete_for_target(&mut self, target: EntryTarget) -> RepoResult<usize> {
        let removed = self.conn.execute(
            &format!("DELETE FROM log_entries WHERE {} = ?1", target_column(target)),
            params![target.id().to_string()],
        )?;
        Ok(removed)
    }
}

pub struct SqliteMigrationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMigrationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn row_to_migration(row: &Row<'_>) -> RepoResult<Migration> {
        Ok(Migration {
            id: Some(uuid_from_db(row, "id")?),
            task_id: uuid_from_db(row, "task_id")?,
            from_entry_id: uuid_from_db(row, "from_entry_id")?,
            to_entry_id: uuid_from_db(row, "to_entry_id")?,
            migrated_at: timestamp_from_db(row, "migrated_at")?,
        })
    }
}

impl MigrationRepository for SqliteMigrationRepository<'_> {
    fn add(&mut self, migration: &mut Migration) -> RepoResult<EntityId> {
        let id = *migration.id.get_or_insert_with(Uuid::new_v4);
        self.conn.execute(
            "INSERT INTO migrations (id, task_id, from_entry_id, to_entry_id, migrated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                migration.task_id.to_string(),
                migration.from_entry_id.to_string(),
                migration.to_entry_id.to_string(),
                timestamp_to_db(migration.migrated_at),
            ],
        )?;
        Ok(id)
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Migration>> {
        query_one(
            self.conn,
            &format!("SELECT {MIGRATION_COLUMNS} FROM migrations WHERE id = ?1"),
            params![id.to_string()],
            Self::row_to_migration,
        )
    }

    fn list(&self) -> RepoResult<Vec<Migration>> {
        query_all(
            self.conn,
            &format!("SELECT {MIGRATION_COLUMNS} FROM migrations ORDER BY migrated_at ASC, id ASC"),
            [],
            Self::row_to_migration,
        )
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM migrations WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }

    fn list_for_task(&self, task_id: EntityId) -> RepoResult<Vec<Migration>> {
        query_all(
            self.conn,
            &format!(
                "SELECT {MIGRATION_COLUMNS} FROM migrations
                 WHERE task_id = ?1 ORDER BY migrated_at ASC, id ASC"
            ),
            params![task_id.to_string()],
            Self::row_to_migration,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    #[test]
    fn corrupt_status_is_reported_not_masked() {
        let db = Database::open_in_memory().unwrap();
        let mut repo = SqliteTaskRepository::new(db.conn());
        let mut task = Task::new("t".to_string());
        let id = repo.add(&mut task).unwrap();

        db.conn()
            .execute_batch("PRAGMA ignore_check_constraints = ON;")
            .unwrap();
        db.conn()
            .execute("UPDATE tasks SET status = 'doing' WHERE id = ?1", [id.to_string()])
            .unwrap();

        assert!(matches!(repo.get(id), Err(RepoError::InvalidData(_))));
    }

    #[test]
    fn timestamps_keep_nanoseconds() {
        let value = DateTime::parse_from_rfc3339("2024-01-15T10:00:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp_to_db(value), "2024-01-15T10:00:00.123456789Z");
    }
}
