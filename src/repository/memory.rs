//! Map-backed repositories. No persistence and no isolation; used by tests
//! and by the in-memory unit of work.

use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    EventRepository, LogEntryRepository, MigrationRepository, NoteRepository, ProjectRepository,
    RepoError, RepoResult, TaskRepository,
};
use crate::models::{
    EntityId, EntryTarget, Event, LogEntry, Migration, Note, Project, ProjectKind, Task, TaskStatus,
};
use crate::operations;

/// Assigns an id to an unsaved record and returns it.
fn assign_id(id: &mut Option<EntityId>) -> EntityId {
    *id.get_or_insert_with(Uuid::new_v4)
}

fn insert_new<T>(store: &mut HashMap<EntityId, T>, id: EntityId, value: T) -> RepoResult<EntityId> {
    if store.contains_key(&id) {
        return Err(RepoError::Conflict(id));
    }
    store.insert(id, value);
    Ok(id)
}

fn replace_existing<T: Clone>(store: &mut HashMap<EntityId, T>, id: Option<EntityId>, value: &T) {
    if let Some(slot) = id.and_then(|id| store.get_mut(&id)) {
        *slot = value.clone();
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: HashMap<EntityId, Task>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, keep: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().filter(|t| keep(t)).cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        tasks
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn add(&mut self, task: &mut Task) -> RepoResult<EntityId> {
        let id = assign_id(&mut task.id);
        insert_new(&mut self.tasks, id, task.clone())
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Task>> {
        Ok(self.tasks.get(&id).cloned())
    }

    fn list(&self, status: Option<TaskStatus>) -> RepoResult<Vec<Task>> {
        Ok(self.sorted(|t| status.is_none_or(|s| t.status == s)))
    }

    fn update(&mut self, task: &Task) -> RepoResult<()> {
        replace_existing(&mut self.tasks, task.id, task);
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.tasks.remove(&id);
        Ok(())
    }

    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Task>> {
        Ok(self.sorted(|t| t.created_at.date_naive() == date))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNoteRepository {
    notes: HashMap<EntityId, Note>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, keep: impl Fn(&Note) -> bool) -> Vec<Note> {
        let mut notes: Vec<Note> = self.notes.values().filter(|n| keep(n)).cloned().collect();
        // newest first
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        notes
    }
}

impl NoteRepository for InMemoryNoteRepository {
    fn add(&mut self, note: &mut Note) -> RepoResult<EntityId> {
        let id = assign_id(&mut note.id);
        insert_new(&mut self.notes, id, note.clone())
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Note>> {
        Ok(self.notes.get(&id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<Note>> {
        Ok(self.sorted(|_| true))
    }

    fn update(&mut self, note: &Note) -> RepoResult<()> {
        replace_existing(&mut self.notes, note.id, note);
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.notes.remove(&id);
        Ok(())
    }

    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Note>> {
        Ok(self.sorted(|n| n.created_at.date_naive() == date))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: HashMap<EntityId, Event>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.values().filter(|e| keep(e)).cloned().collect();
        events.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));
        events
    }
}

impl EventRepository for InMemoryEventRepository {
    fn add(&mut self, event: &mut Event) -> RepoResult<EntityId> {
        let id = assign_id(&mut event.id);
        insert_new(&mut self.events, id, event.clone())
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Event>> {
        Ok(self.events.get(&id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<Event>> {
        Ok(self.sorted(|_| true))
    }

    fn update(&mut self, event: &Event) -> RepoResult<()> {
        replace_existing(&mut self.events, event.id, event);
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.events.remove(&id);
        Ok(())
    }

    fn list_by_date(&self, date: NaiveDate) -> RepoResult<Vec<Event>> {
        Ok(self.sorted(|e| e.occurred_at.date_naive() == date))
    }

    fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<Event>> {
        Ok(self.sorted(|e| {
            let day = e.occurred_at.date_naive();
            start <= day && day <= end
        }))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    projects: HashMap<EntityId, Project>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn add(&mut self, project: &mut Project) -> RepoResult<EntityId> {
        let id = assign_id(&mut project.id);
        insert_new(&mut self.projects, id, project.clone())
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Project>> {
        Ok(self.projects.get(&id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<Project>> {
        let mut projects: Vec<Project> = self.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    fn update(&mut self, project: &Project) -> RepoResult<()> {
        replace_existing(&mut self.projects, project.id, project);
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.projects.remove(&id);
        Ok(())
    }

    fn daily_log_for(&mut self, date: NaiveDate) -> RepoResult<Project> {
        let existing = self
            .list()?
            .into_iter()
            .find(|p| p.kind == ProjectKind::DailyLog { date });
        if let Some(log) = existing {
            return Ok(log);
        }

        let mut log = operations::create_daily_log(Some(date))?;
        self.add(&mut log)?;
        Ok(log)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLogEntryRepository {
    entries: HashMap<EntityId, LogEntry>,
}

impl InMemoryLogEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, keep: impl Fn(&LogEntry) -> bool) -> Vec<LogEntry> {
        let mut entries: Vec<LogEntry> = self.entries.values().filter(|e| keep(e)).cloned().collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        entries
    }
}

impl LogEntryRepository for InMemoryLogEntryRepository {
    fn add(&mut self, entry: &mut LogEntry) -> RepoResult<EntityId> {
        let id = assign_id(&mut entry.id);
        insert_new(&mut self.entries, id, entry.clone())
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<LogEntry>> {
        Ok(self.entries.get(&id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<LogEntry>> {
        Ok(self.sorted(|_| true))
    }

    fn update(&mut self, entry: &LogEntry) -> RepoResult<()> {
        replace_existing(&mut self.entries, entry.id, entry);
        Ok(())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.entries.remove(&id);
        Ok(())
    }

    fn list_by_log(&self, log_id: EntityId) -> RepoResult<Vec<LogEntry>> {
        Ok(self.sorted(|e| e.log_id == log_id))
    }

    fn list_for_target(&self, target: EntryTarget) -> RepoResult<Vec<LogEntry>> {
        Ok(self.sorted(|e| e.target == target))
    }

    fn delete_for_target(&mut self, target: EntryTarget) -> RepoResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.target != target);
        Ok(before - self.entries.len())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMigrationRepository {
    migrations: HashMap<EntityId, Migration>,
}

impl InMemoryMigrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, keep: impl Fn(&Migration) -> bool) -> Vec<Migration> {
        let mut migrations: Vec<Migration> =
            self.migrations.values().filter(|m| keep(m)).cloned().collect();
        migrations.sort_by(|a, b| a.migrated_at.cmp(&b.migrated_at).then(a.id.cmp(&b.id)));
        migrations
    }
}

impl MigrationRepository for InMemoryMigrationRepository {
    fn add(&mut self, migration: &mut Migration) -> RepoResult<EntityId> {
        let id = assign_id(&mut migration.id);
        insert_new(&mut self.migrations, id, migration.clone())
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<Migration>> {
        Ok(self.migrations.get(&id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<Migration>> {
        Ok(self.sorted(|_| true))
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.migrations.remove(&id);
        Ok(())
    }

    fn list_for_task(&self, task_id: EntityId) -> RepoResult<Vec<Migration>> {
        Ok(self.sorted(|m| m.task_id == task_id))
    }
}
