use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{ConfigError, Settings};
use crate::daily_log;
use crate::database::DatabaseError;
use crate::models::{EntryTarget, Priority, TaskStatus};
use crate::operations::{self, TaskChanges};
use crate::output;
use crate::recurrence;
use crate::repository::RepoError;
use crate::short_id::{self, ResolveError};
use crate::uow::UnitOfWork;
use crate::utils::{self, parse_date, parse_datetime};
use crate::validation::DomainError;

#[derive(Debug, Parser)]
#[command(name = "dot")]
#[command(about = "Bullet journal for the terminal: tasks, notes, events and daily logs")]
#[command(version)]
pub struct Cli {
    /// Use development mode (separate home directory and database)
    #[arg(long, global = true)]
    pub dev: bool,

    /// Journal home directory (overrides DOT_HOME)
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Log debug diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage tasks
    #[command(visible_aliases = ["tasks", "t"])]
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Manage notes
    #[command(visible_aliases = ["notes", "n"])]
    Note {
        #[command(subcommand)]
        action: NoteCommand,
    },
    /// Manage events
    #[command(visible_aliases = ["events", "e"])]
    Event {
        #[command(subcommand)]
        action: EventCommand,
    },
    /// Show the daily log (defaults to today)
    Log {
        /// Date (YYYY-MM-DD)
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Manage projects
    #[command(visible_aliases = ["projects", "p"])]
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    /// Work with cron-style recurrence rules
    Recur {
        #[command(subcommand)]
        action: RecurCommand,
    },
}

/// An ID argument: a full UUID or any unique prefix of one.
#[derive(Debug, Args)]
pub struct IdArg {
    /// Full ID or unique prefix
    pub id: String,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Priority 1 (high) to 3 (low)
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// List tasks (cancelled ones are hidden unless asked for)
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Include cancelled tasks
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show one task
    Show(IdArg),
    /// Mark a task done
    Done(IdArg),
    /// Cancel a task
    Cancel(IdArg),
    /// Move a finished task back to TODO
    Reopen(IdArg),
    /// Change a task's fields
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Delete a task and its log entries
    Delete(IdArg),
    /// Move an open task to another day's log
    Migrate {
        id: String,
        /// Target date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    /// Add a note
    Add {
        title: String,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// List notes, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    Show(IdArg),
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
    },
    Delete(IdArg),
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// Record an event (defaults to now)
    Add {
        title: String,
        /// When it happened: YYYY-MM-DD[THH:MM[:SS]] or RFC 3339
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List events, oldest first, optionally within a date range
    List {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Show(IdArg),
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    Delete(IdArg),
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecurCommand {
    /// Print the next occurrences of a 5-field cron expression
    Preview {
        expression: String,
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_day(value: &str) -> Result<NaiveDate, CliError> {
    parse_date(value)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", value, e)))
}

fn parse_moment(value: &str) -> Result<chrono::DateTime<Utc>, CliError> {
    parse_datetime(value).map_err(CliError::DateParseError)
}

/// Runs one command inside `uow`, committing on success.
pub fn dispatch<U: UnitOfWork>(
    command: Command,
    uow: &mut U,
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    uow.run(|uow| match command {
        Command::Task { action } => handle_task(action, uow, settings, out),
        Command::Note { action } => handle_note(action, uow, out),
        Command::Event { action } => handle_event(action, uow, out),
        Command::Log { date, json } => handle_log(date, json, uow, out),
        Command::Project { action } => handle_project(action, uow, out),
        Command::Recur { action } => handle_recur(action, out),
    })
}

fn handle_task<U: UnitOfWork>(
    action: TaskCommand,
    uow: &mut U,
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match action {
        TaskCommand::Add {
            title,
            description,
            priority,
        } => {
            let mut task = operations::create_task(&title, description, priority)?;
            uow.tasks().add(&mut task)?;
            daily_log::record_task(uow, &task)?;
            info!("event=task_added module=cli id={}", short_id::short(task.id));
            output::print_success(
                out,
                &format!("Added task {}: {}", short_id::short(task.id), task.title),
            )?;
        }
        TaskCommand::List { status, all, json } => {
            let show_cancelled = all || settings.show_cancelled;
            let tasks: Vec<_> = uow
                .tasks()
                .list(status)?
                .into_iter()
                .filter(|t| {
                    status.is_some() || show_cancelled || t.status != TaskStatus::Cancelled
                })
                .collect();
            if json {
                output::write_json(out, &tasks)?;
            } else {
                output::write_tasks(out, &tasks)?;
            }
        }
        TaskCommand::Show(arg) => {
            let task = short_id::resolve_task(uow.tasks(), &arg.id)?;
            output::write_task_detail(out, &task)?;
        }
        TaskCommand::Done(arg) => {
            let task = short_id::resolve_task(uow.tasks(), &arg.id)?;
            let done = operations::mark_done(&task)?;
            uow.tasks().update(&done)?;
            output::print_success(out, &format!("Completed task: {}", done.title))?;
        }
        TaskCommand::Cancel(arg) => {
            let task = short_id::resolve_task(uow.tasks(), &arg.id)?;
            let cancelled = operations::mark_cancelled(&task)?;
            uow.tasks().update(&cancelled)?;
            output::print_success(out, &format!("Cancelled task: {}", cancelled.title))?;
        }
        TaskCommand::Reopen(arg) => {
            let task = short_id::resolve_task(uow.tasks(), &arg.id)?;
            let reopened = operations::reopen_task(&task)?;
            uow.tasks().update(&reopened)?;
            output::print_success(out, &format!("Reopened task: {}", reopened.title))?;
        }
        TaskCommand::Update {
            id,
            title,
            description,
            priority,
        } => {
            let task = short_id::resolve_task(uow.tasks(), &id)?;
            let changes = TaskChanges {
                title,
                description,
                priority,
            };
            if changes.is_empty() {
                writeln!(out, "Nothing to update")?;
                return Ok(());
            }
            let updated = operations::update_task(&task, changes)?;
            uow.tasks().update(&updated)?;
            output::print_success(out, &format!("Updated task: {}", updated.title))?;
        }
        TaskCommand::Delete(arg) => {
            let task = short_id::resolve_task(uow.tasks(), &arg.id)?;
            if let Some(id) = task.id {
                uow.log_entries().delete_for_target(EntryTarget::Task(id))?;
                uow.tasks().delete(id)?;
            }
            output::print_success(out, &format!("Deleted task: {}", task.title))?;
        }
        TaskCommand::Migrate { id, to } => {
            let task = short_id::resolve_task(uow.tasks(), &id)?;
            let to = match to {
                Some(value) => parse_day(&value)?,
                None => utils::today(),
            };
            if let Some(task_id) = task.id {
                daily_log::migrate_task_to(uow, task_id, to)?;
            }
            output::print_success(out, &format!("Migrated task to {to}: {}", task.title))?;
        }
    }
    Ok(())
}

fn handle_note<U: UnitOfWork>(
    action: NoteCommand,
    uow: &mut U,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match action {
        NoteCommand::Add { title, content } => {
            let mut note = operations::create_note(&title, content.as_deref().unwrap_or(""))?;
            uow.notes().add(&mut note)?;
            daily_log::record_note(uow, &note)?;
            output::print_success(
                out,
                &format!("Added note {}: {}", short_id::short(note.id), note.title),
            )?;
        }
        NoteCommand::List { json } => {
            let notes = uow.notes().list()?;
            if json {
                output::write_json(out, &notes)?;
            } else {
                output::write_notes(out, &notes)?;
            }
        }
        NoteCommand::Show(arg) => {
            let note = short_id::resolve_note(uow.notes(), &arg.id)?;
            output::write_note_detail(out, &note)?;
        }
        NoteCommand::Update { id, title, content } => {
            let note = short_id::resolve_note(uow.notes(), &id)?;
            if title.is_none() && content.is_none() {
                writeln!(out, "Nothing to update")?;
                return Ok(());
            }
            let updated = operations::update_note(&note, title, content)?;
            uow.notes().update(&updated)?;
            output::print_success(out, &format!("Updated note: {}", updated.title))?;
        }
        NoteCommand::Delete(arg) => {
            let note = short_id::resolve_note(uow.notes(), &arg.id)?;
            if let Some(id) = note.id {
                uow.log_entries().delete_for_target(EntryTarget::Note(id))?;
                uow.notes().delete(id)?;
            }
            output::print_success(out, &format!("Deleted note: {}", note.title))?;
        }
    }
    Ok(())
}

fn handle_event<U: UnitOfWork>(
    action: EventCommand,
    uow: &mut U,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match action {
        EventCommand::Add {
            title,
            date,
            description,
        } => {
            let occurred_at = date.as_deref().map(parse_moment).transpose()?;
            let mut event = operations::create_event(&title, description, occurred_at)?;
            uow.events().add(&mut event)?;
            daily_log::record_event(uow, &event)?;
            output::print_success(
                out,
                &format!("Added event {}: {}", short_id::short(event.id), event.title),
            )?;
        }
        EventCommand::List { from, to, json } => {
            let from = from.as_deref().map(parse_day).transpose()?;
            let to = to.as_deref().map(parse_day).transpose()?;
            let events = match (from, to) {
                (None, None) => uow.events().list()?,
                (from, to) => {
                    let start = from.unwrap_or(earliest_day());
                    let end = to.unwrap_or(latest_day());
                    uow.events().list_by_range(start, end)?
                }
            };
            if json {
                output::write_json(out, &events)?;
            } else {
                output::write_events(out, &events)?;
            }
        }
        EventCommand::Show(arg) => {
            let event = short_id::resolve_event(uow.events(), &arg.id)?;
            output::write_event_detail(out, &event)?;
        }
        EventCommand::Update {
            id,
            title,
            description,
            date,
        } => {
            let event = short_id::resolve_event(uow.events(), &id)?;
            if title.is_none() && description.is_none() && date.is_none() {
                writeln!(out, "Nothing to update")?;
                return Ok(());
            }
            let occurred_at = date.as_deref().map(parse_moment).transpose()?;
            let updated = operations::update_event(&event, title, description, occurred_at)?;
            uow.events().update(&updated)?;
            if updated.occurred_at.date_naive() != event.occurred_at.date_naive() {
                // the log entry follows the event to its new day
                if let Some(event_id) = updated.id {
                    uow.log_entries().delete_for_target(EntryTarget::Event(event_id))?;
                    daily_log::record_event(uow, &updated)?;
                }
            }
            output::print_success(out, &format!("Updated event: {}", updated.title))?;
        }
        EventCommand::Delete(arg) => {
            let event = short_id::resolve_event(uow.events(), &arg.id)?;
            if let Some(id) = event.id {
                uow.log_entries().delete_for_target(EntryTarget::Event(id))?;
                uow.events().delete(id)?;
            }
            output::print_success(out, &format!("Deleted event: {}", event.title))?;
        }
    }
    Ok(())
}

// Stored dates are four-digit years, so these bound every text comparison.
fn earliest_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn latest_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

fn handle_log<U: UnitOfWork>(
    date: Option<String>,
    json: bool,
    uow: &mut U,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let date = match date {
        Some(value) => parse_day(&value)?,
        None => utils::today(),
    };
    let view = daily_log::read_daily_log(uow, date)?;
    if json {
        output::write_json(out, &view)?;
    } else {
        output::write_daily_log(out, &view)?;
    }
    Ok(())
}

fn handle_project<U: UnitOfWork>(
    action: ProjectCommand,
    uow: &mut U,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match action {
        ProjectCommand::Add { name, description } => {
            let mut project = operations::create_project(&name, description)?;
            uow.projects().add(&mut project)?;
            output::print_success(
                out,
                &format!("Added project {}: {}", short_id::short(project.id), project.name),
            )?;
        }
        ProjectCommand::List { json } => {
            let projects = uow.projects().list()?;
            if json {
                output::write_json(out, &projects)?;
            } else {
                output::write_projects(out, &projects)?;
            }
        }
    }
    Ok(())
}

fn handle_recur(action: RecurCommand, out: &mut dyn Write) -> Result<(), CliError> {
    match action {
        RecurCommand::Preview { expression, count } => {
            let upcoming = recurrence::upcoming_occurrences(&expression, count, Utc::now())?;
            writeln!(out, "Next {} occurrence(s) of '{expression}':", upcoming.len())?;
            for at in upcoming {
                writeln!(out, "  {}", at.format("%Y-%m-%d %H:%M %a"))?;
            }
        }
    }
    Ok(())
}
