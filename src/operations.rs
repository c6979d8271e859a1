//! Pure constructors and state transitions for journal records.
//!
//! Every function returns a new value; the input is left untouched and the
//! identifier is carried over. Nothing here touches storage.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    EntityId, EntryTarget, Event, LogEntry, Migration, Note, Priority, Project, ProjectKind, Task,
    TaskStatus,
};
use crate::utils;
use crate::validation::{self, DomainError};

pub fn create_task(
    title: &str,
    description: Option<String>,
    priority: Option<Priority>,
) -> Result<Task, DomainError> {
    let mut task = Task::new(title.to_string());
    task.id = Some(Uuid::new_v4());
    task.description = description;
    task.priority = priority;
    validation::validate_task(&task)?;
    Ok(task)
}

fn transition(task: &Task, to: TaskStatus) -> Result<Task, DomainError> {
    if task.status == to {
        let message = match to {
            TaskStatus::Done => "Task is already completed",
            TaskStatus::Cancelled => "Task is already cancelled",
            TaskStatus::Todo => "Task is already open (TODO status)",
        };
        return Err(DomainError::InvalidTask(message.to_string()));
    }

    let mut next = task.clone();
    next.status = to;
    next.updated_at = utils::later_than(task.updated_at);
    validation::validate_task(&next)?;
    Ok(next)
}

pub fn mark_done(task: &Task) -> Result<Task, DomainError> {
    transition(task, TaskStatus::Done)
}

pub fn mark_cancelled(task: &Task) -> Result<Task, DomainError> {
    transition(task, TaskStatus::Cancelled)
}

/// Moves a done or cancelled task back to TODO.
pub fn reopen_task(task: &Task) -> Result<Task, DomainError> {
    transition(task, TaskStatus::Todo)
}

/// Field changes for [`update_task`]; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.priority.is_none()
    }
}

pub fn update_task(task: &Task, changes: TaskChanges) -> Result<Task, DomainError> {
    let mut next = task.clone();
    if let Some(title) = changes.title {
        next.title = title;
    }
    if let Some(description) = changes.description {
        next.description = Some(description);
    }
    if let Some(priority) = changes.priority {
        next.priority = Some(priority);
    }
    next.updated_at = utils::later_than(task.updated_at);
    validation::validate_task(&next)?;
    Ok(next)
}

/// Sets or clears the priority.
pub fn set_priority(task: &Task, priority: Option<Priority>) -> Result<Task, DomainError> {
    let mut next = task.clone();
    next.priority = priority;
    next.updated_at = utils::later_than(task.updated_at);
    validation::validate_task(&next)?;
    Ok(next)
}

pub fn create_note(title: &str, content: &str) -> Result<Note, DomainError> {
    let mut note = Note::new(title.to_string());
    note.id = Some(Uuid::new_v4());
    note.content = content.to_string();
    validation::validate_note(&note)?;
    Ok(note)
}

pub fn update_note(
    note: &Note,
    title: Option<String>,
    content: Option<String>,
) -> Result<Note, DomainError> {
    let mut next = note.clone();
    if let Some(title) = title {
        next.title = title;
    }
    if let Some(content) = content {
        next.content = content;
    }
    next.updated_at = utils::later_than(note.updated_at);
    validation::validate_note(&next)?;
    Ok(next)
}

/// Records an event; `occurred_at` defaults to now.
pub fn create_event(
    title: &str,
    description: Option<String>,
    occurred_at: Option<DateTime<Utc>>,
) -> Result<Event, DomainError> {
    let now = Utc::now();
    let mut event = Event::new(title.to_string(), occurred_at.unwrap_or(now));
    event.id = Some(Uuid::new_v4());
    event.description = description;
    validation::validate_event(&event)?;
    Ok(event)
}

pub fn update_event(
    event: &Event,
    title: Option<String>,
    description: Option<String>,
    occurred_at: Option<DateTime<Utc>>,
) -> Result<Event, DomainError> {
    let mut next = event.clone();
    if let Some(title) = title {
        next.title = title;
    }
    if let Some(description) = description {
        next.description = Some(description);
    }
    if let Some(occurred_at) = occurred_at {
        next.occurred_at = occurred_at;
    }
    next.updated_at = utils::later_than(event.updated_at);
    validation::validate_event(&next)?;
    Ok(next)
}

pub fn create_project(name: &str, description: Option<String>) -> Result<Project, DomainError> {
    let mut project = Project::new(name.to_string(), ProjectKind::Project);
    project.id = Some(Uuid::new_v4());
    project.description = description;
    validation::validate_project(&project)?;
    Ok(project)
}

pub fn create_daily_log(date: Option<NaiveDate>) -> Result<Project, DomainError> {
    let date = date.unwrap_or_else(utils::today);
    let mut log = Project::new(format!("Daily Log {date}"), ProjectKind::DailyLog { date });
    log.id = Some(Uuid::new_v4());
    validation::validate_project(&log)?;
    Ok(log)
}

/// Weekly log starting on `week_start`, which must be a Monday. Defaults to
/// the current week.
pub fn create_weekly_log(week_start: Option<NaiveDate>) -> Result<Project, DomainError> {
    let week_start = week_start.unwrap_or_else(|| utils::week_start(utils::today()));
    let mut log = Project::new(
        format!("Weekly Log {week_start}"),
        ProjectKind::WeeklyLog { week_start },
    );
    log.id = Some(Uuid::new_v4());
    validation::validate_project(&log)?;
    Ok(log)
}

pub fn create_monthly_log(year: Option<i32>, month: Option<u32>) -> Result<Project, DomainError> {
    let (this_year, this_month) = crate::models::year_month(utils::today());
    let year = year.unwrap_or(this_year);
    let month = month.unwrap_or(this_month);
    let mut log = Project::new(
        format!("Monthly Log {year}-{month:02}"),
        ProjectKind::MonthlyLog { year, month },
    );
    log.id = Some(Uuid::new_v4());
    validation::validate_project(&log)?;
    Ok(log)
}

/// Links a record into a log for `entry_date`.
pub fn add_to_log(log: &Project, target: EntryTarget, entry_date: NaiveDate) -> Result<LogEntry, DomainError> {
    let log_id = log
        .id
        .ok_or_else(|| DomainError::InvalidLog("log has not been stored yet".to_string()))?;
    if let Some((start, end)) = log.kind.date_range() {
        if entry_date < start || entry_date > end {
            return Err(DomainError::InvalidLogEntry(format!(
                "entry date {entry_date} is outside {start}..={end}"
            )));
        }
    }

    let mut entry = LogEntry::new(log_id, target, entry_date);
    entry.id = Some(Uuid::new_v4());
    Ok(entry)
}

/// Audit record for a task moving between two log entries.
pub fn migrate_task(
    task_id: EntityId,
    from_entry: &LogEntry,
    to_entry: &LogEntry,
) -> Result<Migration, DomainError> {
    let (Some(from_entry_id), Some(to_entry_id)) = (from_entry.id, to_entry.id) else {
        return Err(DomainError::InvalidLogEntry(
            "both log entries must be stored before migrating".to_string(),
        ));
    };
    if from_entry.target != EntryTarget::Task(task_id) || to_entry.target != EntryTarget::Task(task_id) {
        return Err(DomainError::InvalidLogEntry(format!(
            "log entries do not both reference task {task_id}"
        )));
    }

    Ok(Migration {
        id: Some(Uuid::new_v4()),
        task_id,
        from_entry_id,
        to_entry_id,
        migrated_at: Utc::now(),
    })
}
