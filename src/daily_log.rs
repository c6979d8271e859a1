//! Everything that belongs to one calendar day.
//!
//! Two ways to build the view. [`gather_daily_log`] derives it from the
//! records' own timestamps. [`read_daily_log`] follows the log entries that
//! were recorded against the day's `DailyLog` project, which also knows
//! about tasks migrated to another day.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;

use crate::models::{EntityId, EntryTarget, Event, LogEntry, Migration, Note, ProjectKind, Task};
use crate::operations;
use crate::repository::RepoResult;
use crate::uow::UnitOfWork;
use crate::validation::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyLogView {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub notes: Vec<Note>,
    /// Tasks that were logged on this day and later migrated elsewhere.
    pub migrated: Vec<Task>,
}

impl DailyLogView {
    pub fn empty(date: NaiveDate) -> Self {
        build_daily_log(date, Vec::new(), Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
            && self.events.is_empty()
            && self.notes.is_empty()
            && self.migrated.is_empty()
    }
}

/// Bundles already-fetched records for `date`. Order is kept as given.
pub fn build_daily_log(
    date: NaiveDate,
    tasks: Vec<Task>,
    events: Vec<Event>,
    notes: Vec<Note>,
) -> DailyLogView {
    DailyLogView {
        date,
        tasks,
        events,
        notes,
        migrated: Vec::new(),
    }
}

/// Derived view: tasks and notes created on `date`, events that occurred
/// on it.
pub fn gather_daily_log<U>(uow: &mut U, date: NaiveDate) -> RepoResult<DailyLogView>
where
    U: UnitOfWork + ?Sized,
{
    let tasks = uow.tasks().list_by_date(date)?;
    let events = uow.events().list_by_date(date)?;
    let notes = uow.notes().list_by_date(date)?;
    Ok(build_daily_log(date, tasks, events, notes))
}

/// Links `target` into the daily log for `date`, creating the log on first
/// use. Recording the same target twice returns the existing entry.
pub fn record_in_daily_log<U>(uow: &mut U, target: EntryTarget, date: NaiveDate) -> RepoResult<LogEntry>
where
    U: UnitOfWork + ?Sized,
{
    let log = uow.projects().daily_log_for(date)?;
    let log_id = log
        .id
        .ok_or_else(|| DomainError::InvalidLog("daily log has no id".to_string()))?;

    if let Some(existing) = uow
        .log_entries()
        .list_by_log(log_id)?
        .into_iter()
        .find(|entry| entry.target == target)
    {
        return Ok(existing);
    }

    let mut entry = operations::add_to_log(&log, target, date)?;
    uow.log_entries().add(&mut entry)?;
    debug!(
        "event=log_entry_added module=daily_log date={date} target={}",
        target.id()
    );
    Ok(entry)
}

fn stored_id(id: Option<EntityId>) -> RepoResult<EntityId> {
    id.ok_or_else(|| DomainError::InvalidLogEntry("record has not been stored yet".to_string()).into())
}

pub fn record_task<U: UnitOfWork + ?Sized>(uow: &mut U, task: &Task) -> RepoResult<LogEntry> {
    let id = stored_id(task.id)?;
    record_in_daily_log(uow, EntryTarget::Task(id), task.created_at.date_naive())
}

pub fn record_note<U: UnitOfWork + ?Sized>(uow: &mut U, note: &Note) -> RepoResult<LogEntry> {
    let id = stored_id(note.id)?;
    record_in_daily_log(uow, EntryTarget::Note(id), note.created_at.date_naive())
}

pub fn record_event<U: UnitOfWork + ?Sized>(uow: &mut U, event: &Event) -> RepoResult<LogEntry> {
    let id = stored_id(event.id)?;
    record_in_daily_log(uow, EntryTarget::Event(id), event.occurred_at.date_naive())
}

/// Whether the task left `entry_id` and has not been migrated back since.
fn is_migrated_out(entry_id: Option<EntityId>, migrations: &[Migration]) -> bool {
    let Some(entry_id) = entry_id else {
        return false;
    };
    migrations
        .iter()
        .rev()
        .find(|m| m.from_entry_id == entry_id || m.to_entry_id == entry_id)
        .is_some_and(|m| m.from_entry_id == entry_id)
}

/// Linked view of `date`: entries in the order they were recorded, one row
/// per record. Entries whose record no longer exists are skipped.
pub fn read_daily_log<U>(uow: &mut U, date: NaiveDate) -> RepoResult<DailyLogView>
where
    U: UnitOfWork + ?Sized,
{
    let log = uow
        .projects()
        .list()?
        .into_iter()
        .find(|p| p.kind == ProjectKind::DailyLog { date });
    let Some(log_id) = log.and_then(|log| log.id) else {
        return Ok(DailyLogView::empty(date));
    };

    let mut view = DailyLogView::empty(date);
    let mut seen: HashSet<EntityId> = HashSet::new();

    for entry in uow.log_entries().list_by_log(log_id)? {
        let target_id = entry.target.id();
        if seen.contains(&target_id) {
            continue;
        }

        let found = match entry.target {
            EntryTarget::Task(id) => match uow.tasks().get(id)? {
                Some(task) => {
                    let migrations = uow.migrations().list_for_task(id)?;
                    if is_migrated_out(entry.id, &migrations) {
                        view.migrated.push(task);
                    } else {
                        view.tasks.push(task);
                    }
                    true
                }
                None => false,
            },
            EntryTarget::Note(id) => match uow.notes().get(id)? {
                Some(note) => {
                    view.notes.push(note);
                    true
                }
                None => false,
            },
            EntryTarget::Event(id) => match uow.events().get(id)? {
                Some(event) => {
                    view.events.push(event);
                    true
                }
                None => false,
            },
        };

        if found {
            seen.insert(target_id);
        } else {
            warn!(
                "event=dangling_log_entry module=daily_log status=skipped date={date} entry={} target={target_id}",
                entry.id.map(|id| id.to_string()).unwrap_or_default()
            );
        }
    }

    Ok(view)
}

/// Moves an open task from the log it currently sits in to the daily log
/// for `to`, recording the move.
pub fn migrate_task_to<U>(uow: &mut U, task_id: EntityId, to: NaiveDate) -> RepoResult<Migration>
where
    U: UnitOfWork + ?Sized,
{
    let task = uow
        .tasks()
        .get(task_id)?
        .ok_or_else(|| DomainError::InvalidTask(format!("task {task_id} does not exist")))?;
    if !task.is_open() {
        return Err(DomainError::InvalidTask("Only open tasks can be migrated".to_string()).into());
    }

    let migrations = uow.migrations().list_for_task(task_id)?;
    let current = uow
        .log_entries()
        .list_for_target(EntryTarget::Task(task_id))?
        .into_iter()
        .filter(|entry| !is_migrated_out(entry.id, &migrations))
        .last();
    let from_date = match &current {
        Some(entry) => entry.entry_date,
        None => task.created_at.date_naive(),
    };
    if from_date == to {
        return Err(DomainError::InvalidTask(format!("Task is already in the daily log for {to}")).into());
    }
    let from = match current {
        Some(entry) => entry,
        None => record_task(uow, &task)?,
    };

    let to_entry = record_in_daily_log(uow, EntryTarget::Task(task_id), to)?;
    let mut migration = operations::migrate_task(task_id, &from, &to_entry)?;
    uow.migrations().add(&mut migration)?;
    debug!(
        "event=task_migrated module=daily_log task={task_id} from={} to={to}",
        from.entry_date
    );
    Ok(migration)
}
