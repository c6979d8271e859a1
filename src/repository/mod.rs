//! Storage-agnostic access to journal records.
//!
//! # Contract
//! - `add` assigns a fresh UUID when the record has none and writes it back.
//! - `get` returns `Ok(None)` for unknown ids.
//! - `update` and `delete` on unknown ids are silent no-ops.
//! - List ordering is part of the contract so both backends agree: tasks and
//!   projects by `created_at`, notes newest first, events by `occurred_at`,
//!   log entries by `created_at`; ties break on id.
//!
//! `memory` and `sqlite` implement every trait; `tests/repository_contract.rs`
//! runs the same suite against both.

use chrono::NaiveDate;
use thiserror::Error;

use crate::database::DatabaseError;
use crate::models::{
    EntityId, EntryTarget, Event, LogEntry, Migration, Note, Project, Task, TaskStatus,
};
use crate::validation::DomainError;

pub mod memory;
pub mod sqlite;

pub use memory::{
    InMemoryEventRepository, InMemoryLogEntryRepository, InMemoryMigrationRepository,
    InMemoryNoteRepository, InMemoryProjectRepository, InMemoryTaskRepository,
};
pub use sqlite::{
    SqliteEventRepository, SqliteLogEntryRepository, SqliteMigrationRepository,
    SqliteNoteRepository, SqliteProjectRepository, SqliteTaskRepository,
};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Db(#[from] DatabaseError),
    #[error("record already exists: {0}")]
    Conflict(EntityId),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DatabaseError::SqliteError(value))
    }
}

pub trait TaskRepository {
    fn add(&mut self, task: &mut Task) -> RepoResult<EntityId>;
    fn get(&self, id: EntityId) -> RepoResult<Option<Task>>;
    /// All tasks, or only those in `status`.
    fn list(&self, status: Option<TaskStatus>) -> RepoResult<Vec<Task>>;
    fn update(&mut self, task: &Task) -> RepoResult<()>;
    fn delete(&mut self, id: EntityId) -> RepoResult<()>;
    /// Tasks created on `date`.
    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Task>>;
}

pub trait NoteRepository {
    fn add(&mut self, note: &mut Note) -> RepoResult<EntityId>;
    fn get(&self, id: EntityId) -> RepoResult<Option<Note>>;
    fn list(&self) -> RepoResult<Vec<Note>>;
    fn update(&mut self, note: &Note) -> RepoResult<()>;
    fn delete(&mut self, id: EntityId) -> RepoResult<()>;
    /// Notes created on `date`.
    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Note>>;
}

pub trait EventRepository {
    fn add(&mut self, event: &mut Event) -> RepoResult<EntityId>;
    fn get(&self, id: EntityId) -> RepoResult<Option<Event>>;
    fn list(&self) -> RepoResult<Vec<Event>>;
    fn update(&mut self, event: &Event) -> RepoResult<()>;
    fn delete(&mut self, id: EntityId) -> RepoResult<()>;
    /// Events that occurred on `date`.
    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Event>>;
    /// Events that occurred between `start` and `end`, both inclusive.
    fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<Event>>;
}

pub trait ProjectRepository {
    fn add(&mut self, project: &mut Project) -> RepoResult<EntityId>;
    fn get(&self, id: EntityId) -> RepoResult<Option<Project>>;
    fn list(&self) -> RepoResult<Vec<Project>>;
    fn update(&mut self, project: &Project) -> RepoResult<()>;
    fn delete(&mut self, id: EntityId) -> RepoResult<()>;
    /// The daily log for `date`, created and stored on first use.
    fn daily_log_for(&mut self, date: NaiveDate) -> RepoResult<Project>;
}

pub trait LogEntryRepository {
    fn add(&mut self, entry: &mut LogEntry) -> RepoResult<EntityId>;
    fn get(&self, id: EntityId) -> RepoResult<Option<LogEntry>>;
    fn list(&self) -> RepoResult<Vec<LogEntry>>;
    fn update(&mut self, entry: &LogEntry) -> RepoResult<()>;
    fn delete(&mut self, id: EntityId) -> RepoResult<()>;
    /// Entries of one log in the order they were added.
    fn list_by_log(&self, log_id: EntityId) -> RepoResult<Vec<LogEntry>>;
    fn list_for_target(&self, target: EntryTarget) -> RepoResult<Vec<LogEntry>>;
    /// Removes every entry pointing at `target`, returning how many went.
    fn delete_for_target(&mut self, target: EntryTarget) -> RepoResult<usize>;
}

pub trait MigrationRepository {
    fn add(&mut self, migration: &mut Migration) -> RepoResult<EntityId>;
    fn get(&self, id: EntityId) -> RepoResult<Option<Migration>>;
    fn list(&self) -> RepoResult<Vec<Migration>>;
    fn delete(&mut self, id: EntityId) -> RepoResult<()>;
    fn list_for_task(&self, task_id: EntityId) -> RepoResult<Vec<Migration>>;
}
