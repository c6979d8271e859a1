//! Units of work: one commit/rollback boundary over every repository.

use log::{debug, warn};
use rusqlite::{Connection, Transaction};

use crate::database::Database;
use crate::repository::{
    EventRepository, InMemoryEventRepository, InMemoryLogEntryRepository,
    InMemoryMigrationRepository, InMemoryNoteRepository, InMemoryProjectRepository,
    InMemoryTaskRepository, LogEntryRepository, MigrationRepository, NoteRepository,
    ProjectRepository, RepoError, RepoResult, SqliteEventRepository, SqliteLogEntryRepository,
    SqliteMigrationRepository, SqliteNoteRepository, SqliteProjectRepository,
    SqliteTaskRepository, TaskRepository,
};

pub trait UnitOfWork {
    fn tasks(&mut self) -> &mut dyn TaskRepository;
    fn notes(&mut self) -> &mut dyn NoteRepository;
    fn events(&mut self) -> &mut dyn EventRepository;
    fn projects(&mut self) -> &mut dyn ProjectRepository;
    fn log_entries(&mut self) -> &mut dyn LogEntryRepository;
    fn migrations(&mut self) -> &mut dyn MigrationRepository;

    fn commit(&mut self) -> RepoResult<()>;
    fn rollback(&mut self) -> RepoResult<()>;

    /// Runs `f` inside this unit of work, committing when it returns `Ok`
    /// and rolling back when it returns `Err`.
    ///
    /// A failed rollback is logged and the closure's error is returned.
    fn run<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback() {
                    warn!("event=uow_rollback module=uow status=error error={rollback_err}");
                }
                Err(err)
            }
        }
    }
}

/// Unit of work over map-backed repositories. Commit and rollback do
/// nothing; writes are visible immediately.
#[derive(Debug, Default)]
pub struct InMemoryUnitOfWork {
    pub tasks: InMemoryTaskRepository,
    pub notes: InMemoryNoteRepository,
    pub events: InMemoryEventRepository,
    pub projects: InMemoryProjectRepository,
    pub log_entries: InMemoryLogEntryRepository,
    pub migrations: InMemoryMigrationRepository,
}

impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnitOfWork for InMemoryUnitOfWork {
    fn tasks(&mut self) -> &mut dyn TaskRepository {
        &mut self.tasks
    }

    fn notes(&mut self) -> &mut dyn NoteRepository {
        &mut self.notes
    }

    fn events(&mut self) -> &mut dyn EventRepository {
        &mut self.events
    }

    fn projects(&mut self) -> &mut dyn ProjectRepository {
        &mut self.projects
    }

    fn log_entries(&mut self) -> &mut dyn LogEntryRepository {
        &mut self.log_entries
    }

    fn migrations(&mut self) -> &mut dyn MigrationRepository {
        &mut self.migrations
    }

    fn commit(&mut self) -> RepoResult<()> {
        Ok(())
    }

    fn rollback(&mut self) -> RepoResult<()> {
        Ok(())
    }
}

/// Unit of work over one SQLite transaction.
///
/// The transaction is opened on `begin` and reopened after every commit or
/// rollback. Dropping the unit of work without committing rolls back
/// whatever is pending.
pub struct SqliteUnitOfWork<'conn> {
    conn: &'conn Connection,
    tx: Option<Transaction<'conn>>,
    tasks: SqliteTaskRepository<'conn>,
    notes: SqliteNoteRepository<'conn>,
    events: SqliteEventRepository<'conn>,
    projects: SqliteProjectRepository<'conn>,
    log_entries: SqliteLogEntryRepository<'conn>,
    migrations: SqliteMigrationRepository<'conn>,
}

impl<'conn> SqliteUnitOfWork<'conn> {
    pub fn begin(db: &'conn Database) -> RepoResult<Self> {
        let conn = db.conn();
        let tx = conn.unchecked_transaction()?;
        debug!("event=uow_begin module=uow status=ok");
        Ok(Self {
            conn,
            tx: Some(tx),
            tasks: SqliteTaskRepository::new(conn),
            notes: SqliteNoteRepository::new(conn),
            events: SqliteEventRepository::new(conn),
            projects: SqliteProjectRepository::new(conn),
            log_entries: SqliteLogEntryRepository::new(conn),
            migrations: SqliteMigrationRepository::new(conn),
        })
    }

    fn reopen(&mut self) -> RepoResult<()> {
        self.tx = Some(self.conn.unchecked_transaction()?);
        Ok(())
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn tasks(&mut self) -> &mut dyn TaskRepository {
        &mut self.tasks
    }

    fn notes(&mut self) -> &mut dyn NoteRepository {
        &mut self.notes
    }

    fn events(&mut self) -> &mut dyn EventRepository {
        &mut self.events
    }

    fn projects(&mut self) -> &mut dyn ProjectRepository {
        &mut self.projects
    }

    fn log_entries(&mut self) -> &mut dyn LogEntryRepository {
        &mut self.log_entries
    }

    fn migrations(&mut self) -> &mut dyn MigrationRepository {
        &mut self.migrations
    }

    fn commit(&mut self) -> RepoResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit()?;
            debug!("event=uow_commit module=uow status=ok");
        }
        self.reopen()
    }

    fn rollback(&mut self) -> RepoResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback()?;
            debug!("event=uow_rollback module=uow status=ok");
        }
        self.reopen()
    }
}

impl Database {
    /// Starts a unit of work on this database.
    pub fn unit_of_work(&self) -> RepoResult<SqliteUnitOfWork<'_>> {
        SqliteUnitOfWork::begin(self)
    }
}
