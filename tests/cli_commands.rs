//! Commands parsed with clap and dispatched against the in-memory unit of
//! work.

use clap::Parser;

use dot_journal::cli::{Cli, CliError, Command, TaskCommand, dispatch};
use dot_journal::models::TaskStatus;
use dot_journal::short_id::ResolveError;
use dot_journal::validation::DomainError;
use dot_journal::{InMemoryUnitOfWork, Settings, UnitOfWork};

fn run(uow: &mut InMemoryUnitOfWork, settings: &Settings, args: &[&str]) -> Result<String, CliError> {
    let cli = Cli::try_parse_from(std::iter::once("dot").chain(args.iter().copied())).unwrap();
    let mut out = Vec::new();
    dispatch(cli.command, uow, settings, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn only_task_id(uow: &mut InMemoryUnitOfWork) -> String {
    let tasks = uow.tasks().list(None).unwrap();
    assert_eq!(tasks.len(), 1);
    tasks[0].id.unwrap().to_string()
}

#[test]
fn aliases_and_global_flags_parse() {
    let cli = Cli::try_parse_from(["dot", "t", "add", "Buy milk", "-p", "1", "--dev"]).unwrap();
    assert!(cli.dev);
    assert!(matches!(
        cli.command,
        Command::Task {
            action: TaskCommand::Add { .. }
        }
    ));

    assert!(Cli::try_parse_from(["dot", "tasks", "add", "x", "-p", "7"]).is_err());
    assert!(Cli::try_parse_from(["dot", "task", "list", "--status", "later"]).is_err());
}

#[test]
fn add_list_done_by_prefix() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    let added = run(&mut uow, &settings, &["task", "add", "Buy milk"]).unwrap();
    assert!(added.contains("Buy milk"));

    let id = only_task_id(&mut uow);
    run(&mut uow, &settings, &["task", "done", &id[..6]]).unwrap();

    let todo = run(&mut uow, &settings, &["task", "list", "--status", "todo"]).unwrap();
    assert!(todo.contains("(No tasks)"));
    let done = run(&mut uow, &settings, &["task", "list", "--status", "done"]).unwrap();
    assert!(done.contains("Buy milk"));
}

#[test]
fn adding_records_into_todays_log() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    run(&mut uow, &settings, &["task", "add", "Buy milk"]).unwrap();
    run(&mut uow, &settings, &["note", "add", "Idea", "-c", "write it down"]).unwrap();
    run(&mut uow, &settings, &["event", "add", "Standup", "--date", "2024-01-15T10:00"]).unwrap();

    let today = run(&mut uow, &settings, &["log"]).unwrap();
    assert!(today.contains("Buy milk"));
    assert!(today.contains("Idea"));
    assert!(!today.contains("Standup"));

    let that_day = run(&mut uow, &settings, &["log", "2024-01-15", "--json"]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&that_day).unwrap();
    assert_eq!(json["events"][0]["title"], "Standup");
    assert_eq!(json["tasks"].as_array().unwrap().len(), 0);
}

#[test]
fn cancelled_tasks_are_hidden_unless_asked_for() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    run(&mut uow, &settings, &["task", "add", "Skip this"]).unwrap();
    let id = only_task_id(&mut uow);
    run(&mut uow, &settings, &["task", "cancel", &id]).unwrap();

    let hidden = run(&mut uow, &settings, &["task", "list"]).unwrap();
    assert!(!hidden.contains("Skip this"));
    let all = run(&mut uow, &settings, &["task", "list", "--all"]).unwrap();
    assert!(all.contains("Skip this"));

    let permissive = Settings {
        show_cancelled: true,
        ..Settings::default()
    };
    let configured = run(&mut uow, &permissive, &["task", "list"]).unwrap();
    assert!(configured.contains("Skip this"));
}

#[test]
fn marking_done_twice_is_rejected() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    run(&mut uow, &settings, &["task", "add", "Once"]).unwrap();
    let id = only_task_id(&mut uow);
    run(&mut uow, &settings, &["task", "done", &id]).unwrap();

    let err = run(&mut uow, &settings, &["task", "done", &id]).unwrap_err();
    assert!(matches!(err, CliError::Domain(DomainError::InvalidTask(_))));
    assert!(err.to_string().contains("already completed"));
}

#[test]
fn unknown_id_is_reported() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    let err = run(&mut uow, &settings, &["note", "show", "ffff"]).unwrap_err();
    assert!(matches!(
        err,
        CliError::Resolve(ResolveError::NotFound { kind: "note", .. })
    ));
}

#[test]
fn deleting_a_task_clears_its_log_entries() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    run(&mut uow, &settings, &["task", "add", "Temporary"]).unwrap();
    assert_eq!(uow.log_entries().list().unwrap().len(), 1);

    let id = only_task_id(&mut uow);
    run(&mut uow, &settings, &["task", "delete", &id]).unwrap();
    assert!(uow.tasks().list(None).unwrap().is_empty());
    assert!(uow.log_entries().list().unwrap().is_empty());
}

#[test]
fn update_changes_only_given_fields() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    run(&mut uow, &settings, &["task", "add", "Draft", "-d", "first pass"]).unwrap();
    let id = only_task_id(&mut uow);
    run(&mut uow, &settings, &["task", "update", &id, "-p", "2"]).unwrap();

    let tasks = uow.tasks().list(None).unwrap();
    let task = &tasks[0];
    assert_eq!(task.title, "Draft");
    assert_eq!(task.description.as_deref(), Some("first pass"));
    assert_eq!(task.priority.map(|p| p.value()), Some(2));
    assert_eq!(task.status, TaskStatus::Todo);

    let nothing = run(&mut uow, &settings, &["task", "update", &id]).unwrap();
    assert!(nothing.contains("Nothing to update"));
}

#[test]
fn migrate_moves_task_to_another_day() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    run(&mut uow, &settings, &["task", "add", "Carry over"]).unwrap();
    let id = only_task_id(&mut uow);
    run(&mut uow, &settings, &["task", "migrate", &id, "--to", "2099-01-01"]).unwrap();

    let target = run(&mut uow, &settings, &["log", "2099-01-01"]).unwrap();
    assert!(target.contains("Carry over"));
    assert_eq!(uow.migrations().list().unwrap().len(), 1);
}

#[test]
fn moving_an_event_moves_its_log_entry() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    run(&mut uow, &settings, &["event", "add", "Dentist", "--date", "2024-01-15T10:00"]).unwrap();
    let events = uow.events().list().unwrap();
    let id = events[0].id.unwrap().to_string();

    run(&mut uow, &settings, &["event", "update", &id, "--date", "2024-01-10T10:00"]).unwrap();
    assert!(run(&mut uow, &settings, &["log", "2024-01-10"]).unwrap().contains("Dentist"));
    assert!(!run(&mut uow, &settings, &["log", "2024-01-15"]).unwrap().contains("Dentist"));
    assert_eq!(uow.log_entries().list().unwrap().len(), 1);

    // same day, new time: the entry stays put
    run(&mut uow, &settings, &["event", "update", &id, "--date", "2024-01-10T16:30"]).unwrap();
    assert!(run(&mut uow, &settings, &["log", "2024-01-10"]).unwrap().contains("Dentist"));
    assert_eq!(uow.log_entries().list().unwrap().len(), 1);
}

#[test]
fn event_range_listing_is_inclusive() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    for (title, when) in [
        ("Before", "2024-01-13T12:00"),
        ("Start", "2024-01-14T00:00"),
        ("End", "2024-01-16T23:59"),
        ("After", "2024-01-17T00:00"),
    ] {
        run(&mut uow, &settings, &["event", "add", title, "--date", when]).unwrap();
    }

    let listed = run(
        &mut uow,
        &settings,
        &["event", "list", "--from", "2024-01-14", "--to", "2024-01-16", "--json"],
    )
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&listed).unwrap();
    let titles: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Start", "End"]);
}

#[test]
fn bad_dates_are_parse_errors() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    let err = run(&mut uow, &settings, &["log", "15/01/2024"]).unwrap_err();
    assert!(matches!(err, CliError::DateParseError(_)));
    let err = run(&mut uow, &settings, &["event", "add", "x", "--date", "soon"]).unwrap_err();
    assert!(matches!(err, CliError::DateParseError(_)));
}

#[test]
fn recurrence_preview_lists_requested_count() {
    let mut uow = InMemoryUnitOfWork::new();
    let settings = Settings::default();

    let text = run(&mut uow, &settings, &["recur", "preview", "0 9 * * MON", "-n", "3"]).unwrap();
    assert!(text.contains("Next 3 occurrence(s)"));
    assert_eq!(text.matches(" Mon").count(), 3);

    let err = run(&mut uow, &settings, &["recur", "preview", "every day"]).unwrap_err();
    assert!(matches!(err, CliError::Domain(DomainError::InvalidCron(_))));
}
