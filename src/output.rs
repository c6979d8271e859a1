//! Terminal rendering for CLI results.
//!
//! Writers take any `io::Write` so commands can be exercised against a
//! buffer. Styling comes from crossterm and is dropped when `NO_COLOR` is
//! set.

use crossterm::style::{Attribute, Colored, StyledContent, Stylize};
use serde::Serialize;
use std::io::{self, Write};

use crate::daily_log::DailyLogView;
use crate::models::{Event, Note, Project, Task, TaskStatus};
use crate::short_id::short;

const PREVIEW_CHARS: usize = 50;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// crossterm leaves colours out under `NO_COLOR` but still writes attributes.
trait Emphasis: Stylize {
    fn strong(self) -> Self::Styled {
        with_attribute(self, Attribute::Bold, Colored::ansi_color_disabled_memoized())
    }

    fn muted(self) -> Self::Styled {
        with_attribute(self, Attribute::Dim, Colored::ansi_color_disabled_memoized())
    }
}

impl<T: Stylize> Emphasis for T {}

fn with_attribute<S: Stylize>(content: S, attribute: Attribute, plain: bool) -> S::Styled {
    if plain {
        content.stylize()
    } else {
        content.attribute(attribute)
    }
}

pub fn print_success(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", format!("✓ {message}").green())
}

/// Reports a failure on stderr as `Error: ...`.
pub fn print_error(message: &str) {
    eprintln!("{}", format!("Error: {message}").red());
}

pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out).map_err(serde_json::Error::io)
}

fn status_symbol(status: TaskStatus) -> StyledContent<&'static str> {
    match status {
        TaskStatus::Todo => "○".cyan(),
        TaskStatus::Done => "✓".green(),
        TaskStatus::Cancelled => "✗".red(),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn task_label(task: &Task) -> String {
    let mut label = format!(
        "{} {} {}",
        short(task.id).muted(),
        status_symbol(task.status),
        task.title
    );
    if let Some(priority) = task.priority {
        label.push_str(&format!(" {}", format!("[{priority}]").muted()));
    }
    label
}

fn empty_line(out: &mut dyn Write, what: &str) -> io::Result<()> {
    writeln!(out, "  {}", format!("(No {what})").muted())
}

pub fn write_tasks(out: &mut dyn Write, tasks: &[Task]) -> io::Result<()> {
    writeln!(out, "{}", "Tasks".cyan().strong())?;
    if tasks.is_empty() {
        return empty_line(out, "tasks");
    }
    for task in tasks {
        writeln!(out, "  {}", task_label(task))?;
        if let Some(description) = &task.description {
            writeln!(out, "      {}", preview(description).muted())?;
        }
    }
    Ok(())
}

pub fn write_notes(out: &mut dyn Write, notes: &[Note]) -> io::Result<()> {
    writeln!(out, "{}", "Notes".yellow().strong())?;
    if notes.is_empty() {
        return empty_line(out, "notes");
    }
    for note in notes {
        writeln!(out, "  {} {}", short(note.id).muted(), note.title.as_str().yellow())?;
        if !note.content.is_empty() {
            writeln!(out, "      {}", preview(&note.content).muted())?;
        }
    }
    Ok(())
}

pub fn write_events(out: &mut dyn Write, events: &[Event]) -> io::Result<()> {
    writeln!(out, "{}", "Events".magenta().strong())?;
    if events.is_empty() {
        return empty_line(out, "events");
    }
    for event in events {
        writeln!(
            out,
            "  {} {} {}",
            short(event.id).muted(),
            event.title.as_str().magenta(),
            format!("- {}", event.occurred_at.format("%Y-%m-%d %H:%M")).muted()
        )?;
        if let Some(description) = &event.description {
            writeln!(out, "      {}", preview(description).muted())?;
        }
    }
    Ok(())
}

pub fn write_projects(out: &mut dyn Write, projects: &[Project]) -> io::Result<()> {
    writeln!(out, "{}", "Projects".strong())?;
    if projects.is_empty() {
        return empty_line(out, "projects");
    }
    for project in projects {
        writeln!(
            out,
            "  {} {} {}",
            short(project.id).muted(),
            project.name,
            format!("({})", project.kind.as_str()).muted()
        )?;
    }
    Ok(())
}

pub fn write_daily_log(out: &mut dyn Write, view: &DailyLogView) -> io::Result<()> {
    writeln!(out, "{}", format!("Daily Log: {}", view.date).strong())?;
    if view.is_empty() {
        return empty_line(out, "entries");
    }

    if !view.tasks.is_empty() {
        writeln!(out, "  {}", "Tasks".cyan().strong())?;
        for task in &view.tasks {
            writeln!(out, "    {}", task_label(task))?;
        }
    }
    if !view.migrated.is_empty() {
        writeln!(out, "  {}", "Migrated".muted().strong())?;
        for task in &view.migrated {
            writeln!(out, "    {} {} {}", short(task.id).muted(), ">".muted(), task.title)?;
        }
    }
    if !view.notes.is_empty() {
        writeln!(out, "  {}", "Notes".yellow().strong())?;
        for note in &view.notes {
            writeln!(out, "    {} {}", short(note.id).muted(), note.title.as_str().yellow())?;
        }
    }
    if !view.events.is_empty() {
        writeln!(out, "  {}", "Events".magenta().strong())?;
        for event in &view.events {
            writeln!(
                out,
                "    {} {} {}",
                short(event.id).muted(),
                event.title.as_str().magenta(),
                format!("- {}", event.occurred_at.format("%H:%M")).muted()
            )?;
        }
    }
    Ok(())
}

fn field(out: &mut dyn Write, name: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "  {} {value}", format!("{name}:").muted())
}

fn id_text(id: Option<uuid::Uuid>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

pub fn write_task_detail(out: &mut dyn Write, task: &Task) -> io::Result<()> {
    writeln!(out, "{} {}", "Task:".cyan().strong(), task.title)?;
    field(out, "ID", id_text(task.id))?;
    field(out, "Status", format!("{} {}", status_symbol(task.status), task.status))?;
    if let Some(description) = &task.description {
        field(out, "Description", description)?;
    }
    if let Some(priority) = task.priority {
        field(out, "Priority", priority.value())?;
    }
    field(out, "Created", task.created_at.format(TIMESTAMP_FORMAT))?;
    field(out, "Updated", task.updated_at.format(TIMESTAMP_FORMAT))
}

pub fn write_note_detail(out: &mut dyn Write, note: &Note) -> io::Result<()> {
    writeln!(out, "{} {}", "Note:".yellow().strong(), note.title)?;
    field(out, "ID", id_text(note.id))?;
    if !note.content.is_empty() {
        writeln!(out, "  {}", "Content:".muted())?;
        for line in note.content.lines() {
            writeln!(out, "    {line}")?;
        }
    }
    field(out, "Created", note.created_at.format(TIMESTAMP_FORMAT))?;
    field(out, "Updated", note.updated_at.format(TIMESTAMP_FORMAT))
}

pub fn write_event_detail(out: &mut dyn Write, event: &Event) -> io::Result<()> {
    writeln!(out, "{} {}", "Event:".magenta().strong(), event.title)?;
    field(out, "ID", id_text(event.id))?;
    field(out, "Occurred", event.occurred_at.format(TIMESTAMP_FORMAT))?;
    if let Some(description) = &event.description {
        field(out, "Description", description)?;
    }
    field(out, "Created", event.created_at.format(TIMESTAMP_FORMAT))?;
    field(out, "Updated", event.updated_at.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn attributes_are_skipped_for_plain_output() {
        assert_eq!(with_attribute("Tasks", Attribute::Bold, true).to_string(), "Tasks");
        assert_eq!(with_attribute("abc12345", Attribute::Dim, true).to_string(), "abc12345");

        let styled = with_attribute("Tasks", Attribute::Bold, false).to_string();
        assert!(styled.contains('\u{1b}'));
        assert!(styled.contains("Tasks"));
    }

    #[test]
    fn empty_lists_say_so() {
        assert!(render(|out| write_tasks(out, &[])).contains("(No tasks)"));
        assert!(render(|out| write_notes(out, &[])).contains("(No notes)"));
        assert!(render(|out| write_events(out, &[])).contains("(No events)"));
    }

    #[test]
    fn long_content_is_truncated_in_listings() {
        let mut note = Note::new("Long".to_string());
        note.content = "x".repeat(80);
        let text = render(|out| write_notes(out, &[note]));
        assert!(text.contains(&format!("{}...", "x".repeat(PREVIEW_CHARS))));
        assert!(!text.contains(&"x".repeat(PREVIEW_CHARS + 1)));
    }

    #[test]
    fn task_listing_shows_priority() {
        let mut task = Task::new("Ship it".to_string());
        task.priority = Some(crate::models::Priority::HIGH);
        let text = render(|out| write_tasks(out, &[task]));
        assert!(text.contains("Ship it"));
        assert!(text.contains("[P1]"));
    }

    #[test]
    fn empty_daily_log_is_explicit() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let text = render(|out| write_daily_log(out, &DailyLogView::empty(date)));
        assert!(text.contains("Daily Log: 2024-01-15"));
        assert!(text.contains("(No entries)"));
    }
}
