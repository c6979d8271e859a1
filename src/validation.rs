use chrono::{DateTime, Datelike, Utc, Weekday};
use thiserror::Error;

use crate::models::{Event, Note, Project, ProjectKind, Task};

pub const MAX_TITLE_CHARS: usize = 500;
pub const MAX_DESCRIPTION_CHARS: usize = 5_000;
pub const MAX_NOTE_CONTENT_CHARS: usize = 100_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid task: {0}")]
    InvalidTask(String),
    #[error("Invalid note: {0}")]
    InvalidNote(String),
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid cron expression: {0}")]
    InvalidCron(String),
    #[error("Invalid log: {0}")]
    InvalidLog(String),
    #[error("Invalid log entry: {0}")]
    InvalidLogEntry(String),
}

/// Checks a title and returns the problem, if any.
fn title_problem(title: &str) -> Option<String> {
    if title.trim().is_empty() {
        return Some("title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Some(format!("title cannot exceed {MAX_TITLE_CHARS} characters"));
    }
    None
}

fn length_problem(field: &str, value: Option<&str>, max: usize) -> Option<String> {
    match value {
        Some(text) if text.chars().count() > max => {
            Some(format!("{field} cannot exceed {max} characters"))
        }
        _ => None,
    }
}

pub fn validate_dates(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Result<(), DomainError> {
    if created_at > updated_at {
        return Err(DomainError::InvalidDate(format!(
            "created_at ({created_at}) cannot be after updated_at ({updated_at})"
        )));
    }
    Ok(())
}

pub fn validate_task(task: &Task) -> Result<(), DomainError> {
    let problem = title_problem(&task.title).or_else(|| {
        length_problem("description", task.description.as_deref(), MAX_DESCRIPTION_CHARS)
    });
    if let Some(problem) = problem {
        return Err(DomainError::InvalidTask(problem));
    }

    validate_dates(task.created_at, task.updated_at)
        .map_err(|e| DomainError::InvalidTask(e.to_string()))
}

pub fn validate_note(note: &Note) -> Result<(), DomainError> {
    let problem = title_problem(&note.title).or_else(|| {
        length_problem("content", Some(note.content.as_str()), MAX_NOTE_CONTENT_CHARS)
    });
    if let Some(problem) = problem {
        return Err(DomainError::InvalidNote(problem));
    }

    validate_dates(note.created_at, note.updated_at)
        .map_err(|e| DomainError::InvalidNote(e.to_string()))
}

/// Events describe something that already happened, so `occurred_at` may not
/// lie in the future.
pub fn validate_event(event: &Event) -> Result<(), DomainError> {
    let problem = title_problem(&event.title).or_else(|| {
        length_problem("description", event.description.as_deref(), MAX_DESCRIPTION_CHARS)
    });
    if let Some(problem) = problem {
        return Err(DomainError::InvalidEvent(problem));
    }

    if event.occurred_at > Utc::now() {
        return Err(DomainError::InvalidEvent(
            "occurred_at cannot be in the future".to_string(),
        ));
    }

    validate_dates(event.created_at, event.updated_at)
        .map_err(|e| DomainError::InvalidEvent(e.to_string()))
}

pub fn validate_project(project: &Project) -> Result<(), DomainError> {
    if let Some(problem) = title_problem(&project.name) {
        return Err(DomainError::InvalidLog(problem.replacen("title", "name", 1)));
    }

    match project.kind {
        ProjectKind::WeeklyLog { week_start } if week_start.weekday() != Weekday::Mon => {
            return Err(DomainError::InvalidLog(format!(
                "week_start must be a Monday, got {} ({week_start})",
                week_start.weekday()
            )));
        }
        ProjectKind::MonthlyLog { month, .. } if !(1..=12).contains(&month) => {
            return Err(DomainError::InvalidLog(format!(
                "month must be 1-12, got {month}"
            )));
        }
        _ => {}
    }

    validate_dates(project.created_at, project.updated_at)
        .map_err(|e| DomainError::InvalidLog(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn blank_titles_are_rejected_for_every_kind() {
        for title in ["", "   ", "\t\n"] {
            let task = Task::new(title.to_string());
            let note = Note::new(title.to_string());
            let event = Event::new(title.to_string(), Utc::now() - Duration::minutes(1));

            assert!(validate_task(&task).unwrap_err().to_string().contains("title cannot be empty"));
            assert!(validate_note(&note).unwrap_err().to_string().contains("title cannot be empty"));
            assert!(validate_event(&event).unwrap_err().to_string().contains("title cannot be empty"));
        }
    }

    #[test]
    fn title_length_is_counted_in_characters() {
        let mut task = Task::new("é".repeat(MAX_TITLE_CHARS));
        assert!(validate_task(&task).is_ok());
        task.title.push('é');
        assert!(matches!(validate_task(&task), Err(DomainError::InvalidTask(_))));
    }

    #[test]
    fn description_and_content_ceilings() {
        let mut task = Task::new("t".to_string());
        task.description = Some("x".repeat(MAX_DESCRIPTION_CHARS + 1));
        assert!(validate_task(&task).is_err());

        let mut note = Note::new("n".to_string());
        note.content = "x".repeat(MAX_NOTE_CONTENT_CHARS);
        assert!(validate_note(&note).is_ok());
        note.content.push('x');
        assert!(validate_note(&note).is_err());
    }

    #[test]
    fn created_after_updated_is_rejected() {
        let mut task = Task::new("t".to_string());
        task.created_at = task.updated_at + Duration::seconds(1);
        assert!(matches!(validate_task(&task), Err(DomainError::InvalidTask(_))));
        assert!(validate_dates(task.updated_at, task.created_at).is_ok());
    }

    #[test]
    fn future_events_are_rejected() {
        let event = Event::new("launch".to_string(), Utc::now() + Duration::days(1));
        assert_eq!(
            validate_event(&event),
            Err(DomainError::InvalidEvent("occurred_at cannot be in the future".to_string()))
        );
    }

    #[test]
    fn weekly_log_must_start_on_monday() {
        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let project = Project::new("week".to_string(), ProjectKind::WeeklyLog { week_start: tuesday });
        assert!(matches!(validate_project(&project), Err(DomainError::InvalidLog(_))));
    }
}
