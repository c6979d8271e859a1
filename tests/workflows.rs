//! End-to-end journal flows against a SQLite file.

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use dot_journal::daily_log::{gather_daily_log, read_daily_log, record_event, record_note, record_task};
use dot_journal::models::TaskStatus;
use dot_journal::{Database, UnitOfWork, operations};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn buy_milk_from_todo_to_done() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("dot.db")).unwrap();

    let id = {
        let mut uow = db.unit_of_work().unwrap();
        let mut task = operations::create_task("Buy milk", None, None).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.created_at, task.updated_at);
        let id = uow.tasks().add(&mut task).unwrap();
        uow.commit().unwrap();
        id
    };

    {
        let mut uow = db.unit_of_work().unwrap();
        let listed = uow.tasks().list(None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Buy milk");

        let done = operations::mark_done(&listed[0]).unwrap();
        uow.tasks().update(&done).unwrap();
        uow.commit().unwrap();
    }

    let mut uow = db.unit_of_work().unwrap();
    let done = uow.tasks().list(Some(TaskStatus::Done)).unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, Some(id));
    assert!(done[0].updated_at > done[0].created_at);
    assert!(uow.tasks().list(Some(TaskStatus::Todo)).unwrap().is_empty());
}

#[test]
fn status_round_trip_keeps_updated_at_increasing() {
    let task = operations::create_task("Flip flop", None, None).unwrap();
    let done = operations::mark_done(&task).unwrap();
    let cancelled = operations::mark_cancelled(&done).unwrap();
    let reopened = operations::reopen_task(&cancelled).unwrap();

    assert_eq!(reopened.status, TaskStatus::Todo);
    assert!(task.updated_at < done.updated_at);
    assert!(done.updated_at < cancelled.updated_at);
    assert!(cancelled.updated_at < reopened.updated_at);
}

#[test]
fn event_is_found_on_its_own_day_only() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("dot.db")).unwrap();
    let mut uow = db.unit_of_work().unwrap();

    let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
    let mut event = operations::create_event("Dentist", None, Some(at)).unwrap();
    uow.events().add(&mut event).unwrap();
    uow.commit().unwrap();

    let on_day = uow.events().list_by_date(day(2024, 1, 15)).unwrap();
    assert_eq!(on_day, vec![event]);
    assert!(uow.events().list_by_date(day(2024, 1, 16)).unwrap().is_empty());
}

#[test]
fn both_daily_log_views_agree_on_a_day() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("dot.db")).unwrap();
    let mut uow = db.unit_of_work().unwrap();

    let d = day(2024, 1, 15);
    let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();

    let mut task = operations::create_task("Write report", None, None).unwrap();
    task.created_at = at;
    task.updated_at = at;
    uow.tasks().add(&mut task).unwrap();
    record_task(&mut uow, &task).unwrap();

    let mut note = operations::create_note("Report outline", "intro, body").unwrap();
    note.created_at = at + Duration::minutes(5);
    note.updated_at = note.created_at;
    uow.notes().add(&mut note).unwrap();
    record_note(&mut uow, &note).unwrap();

    let mut event = operations::create_event("Review meeting", None, Some(at + Duration::hours(2))).unwrap();
    uow.events().add(&mut event).unwrap();
    record_event(&mut uow, &event).unwrap();
    uow.commit().unwrap();

    for view in [
        gather_daily_log(&mut uow, d).unwrap(),
        read_daily_log(&mut uow, d).unwrap(),
    ] {
        assert_eq!(view.date, d);
        assert_eq!(view.tasks, vec![task.clone()]);
        assert_eq!(view.notes, vec![note.clone()]);
        assert_eq!(view.events, vec![event.clone()]);
    }

    let next = d.succ_opt().unwrap();
    assert!(gather_daily_log(&mut uow, next).unwrap().is_empty());
    assert!(read_daily_log(&mut uow, next).unwrap().is_empty());
}

#[test]
fn deleting_a_record_leaves_no_dangling_view_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("dot.db")).unwrap();
    let mut uow = db.unit_of_work().unwrap();

    let mut note = operations::create_note("Short lived", "").unwrap();
    uow.notes().add(&mut note).unwrap();
    record_note(&mut uow, &note).unwrap();
    uow.notes().delete(note.id.unwrap()).unwrap();
    uow.commit().unwrap();

    let view = read_daily_log(&mut uow, note.created_at.date_naive()).unwrap();
    assert!(view.notes.is_empty());
}
