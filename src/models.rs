use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils;
use crate::validation::DomainError;

/// Identifier shared by every stored record.
pub type EntityId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "done" => Ok(TaskStatus::Done),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("unknown task status `{other}`; expected todo|done|cancelled")),
        }
    }
}

/// Task priority, 1 (highest) to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const HIGH: Priority = Priority(1);
    pub const MEDIUM: Priority = Priority(2);
    pub const LOW: Priority = Priority(3);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Priority {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1..=3 => Ok(Priority(value as u8)),
            _ => Err(DomainError::InvalidTask(format!(
                "Task priority must be 1-3 if set, got {value}"
            ))),
        }
    }
}

impl From<Priority> for i64 {
    fn from(value: Priority) -> Self {
        i64::from(value.0)
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| {
            DomainError::InvalidTask(format!("Task priority must be 1-3 if set, got `{s}`"))
        })?;
        Priority::try_from(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<EntityId>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<Priority>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Option<EntityId>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<EntityId>,
    pub title: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title,
            description: None,
            status: TaskStatus::Todo,
            priority: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Todo
    }
}

impl Note {
    pub fn new(title: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title,
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Event {
    pub fn new(title: String, occurred_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title,
            description: None,
            occurred_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// What a project row represents. Logs are projects bound to a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectKind {
    Project,
    DailyLog { date: NaiveDate },
    WeeklyLog { week_start: NaiveDate },
    MonthlyLog { year: i32, month: u32 },
}

impl ProjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Project => "project",
            ProjectKind::DailyLog { .. } => "daily_log",
            ProjectKind::WeeklyLog { .. } => "weekly_log",
            ProjectKind::MonthlyLog { .. } => "monthly_log",
        }
    }

    /// Inclusive date range covered by a log kind, `None` for plain projects.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            ProjectKind::Project => None,
            ProjectKind::DailyLog { date } => Some((date, date)),
            ProjectKind::WeeklyLog { week_start } => {
                Some((week_start, utils::week_end(week_start)))
            }
            ProjectKind::MonthlyLog { year, month } => Some((
                utils::month_start(year, month)?,
                utils::month_end(year, month)?,
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
    pub kind: ProjectKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, kind: ProjectKind) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            description: None,
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    /// Date of a daily log, `None` for every other kind.
    pub fn log_date(&self) -> Option<NaiveDate> {
        match self.kind {
            ProjectKind::DailyLog { date } => Some(date),
            _ => None,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.kind.date_range().map(|(start, _)| start)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.kind.date_range().map(|(_, end)| end)
    }
}

/// The single record a log entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntryTarget {
    Task(EntityId),
    Note(EntityId),
    Event(EntityId),
}

impl EntryTarget {
    pub fn id(&self) -> EntityId {
        match *self {
            EntryTarget::Task(id) | EntryTarget::Note(id) | EntryTarget::Event(id) => id,
        }
    }

    pub fn task_id(&self) -> Option<EntityId> {
        match *self {
            EntryTarget::Task(id) => Some(id),
            _ => None,
        }
    }

    pub fn note_id(&self) -> Option<EntityId> {
        match *self {
            EntryTarget::Note(id) => Some(id),
            _ => None,
        }
    }

    pub fn event_id(&self) -> Option<EntityId> {
        match *self {
            EntryTarget::Event(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Option<EntityId>,
    pub log_id: EntityId,
    pub target: EntryTarget,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(log_id: EntityId, target: EntryTarget, entry_date: NaiveDate) -> Self {
        Self {
            id: None,
            log_id,
            target,
            entry_date,
            created_at: Utc::now(),
        }
    }

    /// Builds an entry from three nullable references, exactly one of which
    /// must be set.
    pub fn from_parts(
        log_id: EntityId,
        task_id: Option<EntityId>,
        note_id: Option<EntityId>,
        event_id: Option<EntityId>,
        entry_date: NaiveDate,
    ) -> Result<Self, DomainError> {
        let target = match (task_id, note_id, event_id) {
            (Some(id), None, None) => EntryTarget::Task(id),
            (None, Some(id), None) => EntryTarget::Note(id),
            (None, None, Some(id)) => EntryTarget::Event(id),
            _ => {
                return Err(DomainError::InvalidLogEntry(
                    "LogEntry must have exactly one of: task_id, note_id, event_id".to_string(),
                ));
            }
        };
        Ok(Self::new(log_id, target, entry_date))
    }
}

/// Audit record of a task moving from one log entry to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub id: Option<EntityId>,
    pub task_id: EntityId,
    pub from_entry_id: EntityId,
    pub to_entry_id: EntityId,
    pub migrated_at: DateTime<Utc>,
}

/// Anything with an identifier and a human-readable title.
pub trait Titled {
    fn entity_id(&self) -> Option<EntityId>;
    fn title(&self) -> &str;
}

impl Titled for Task {
    fn entity_id(&self) -> Option<EntityId> {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for Note {
    fn entity_id(&self) -> Option<EntityId> {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for Event {
    fn entity_id(&self) -> Option<EntityId> {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for Project {
    fn entity_id(&self) -> Option<EntityId> {
        self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}

/// Month and year of a date, as used by monthly logs.
pub fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_accepts_only_one_to_three() {
        assert_eq!(Priority::try_from(1).unwrap(), Priority::HIGH);
        assert_eq!(Priority::try_from(3).unwrap(), Priority::LOW);
        assert!(Priority::try_from(0).is_err());
        assert!(Priority::try_from(4).is_err());
        assert!("two".parse::<Priority>().is_err());
        assert_eq!("2".parse::<Priority>().unwrap(), Priority::MEDIUM);
    }

    #[test]
    fn log_entry_requires_exactly_one_target() {
        let log_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let entry = LogEntry::from_parts(log_id, Some(a), None, None, date).unwrap();
        assert_eq!(entry.target, EntryTarget::Task(a));

        assert!(matches!(
            LogEntry::from_parts(log_id, None, None, None, date),
            Err(DomainError::InvalidLogEntry(_))
        ));
        assert!(matches!(
            LogEntry::from_parts(log_id, Some(a), Some(b), None, date),
            Err(DomainError::InvalidLogEntry(_))
        ));
    }

    #[test]
    fn monthly_log_range_covers_the_whole_month() {
        let kind = ProjectKind::MonthlyLog { year: 2024, month: 2 };
        let (start, end) = kind.date_range().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("DONE".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("doing".parse::<TaskStatus>().is_err());
    }
}
