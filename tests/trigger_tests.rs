use chrono::{Duration, FixedOffset, TimeZone, Utc};
use fieldclock::core::punch::{Punch, PunchLogic};
use fieldclock::core::store::{MemoryStore, SessionStore, TaskFilter, TriggerLedger};
use fieldclock::core::timeclock::TimeClockLogic;
use fieldclock::core::triggers::{
    Alert, MAX_DELAY_MINUTES, TaskTrigger, TextField, TriggerEngine, TriggerSpec,
};
use fieldclock::db::store::SqliteStore;
use fieldclock::errors::AppError;
use fieldclock::models::clock_event::{ClockEvent, ClockEventKind};
use fieldclock::models::session::{EmployeeId, SessionId};

mod common;
use common::monday;

fn spec(name: &str, on: ClockEventKind) -> TriggerSpec {
    TriggerSpec {
        name: name.into(),
        on_event: Some(on),
        ..Default::default()
    }
}

fn emp(name: &str) -> EmployeeId {
    EmployeeId::new(name).unwrap()
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn event(kind: ClockEventKind, who: &str, at: chrono::DateTime<Utc>) -> ClockEvent {
    ClockEvent::new(kind, emp(who), Some(SessionId(1)), at)
}

fn rejected(s: TriggerSpec) -> bool {
    matches!(TaskTrigger::try_from(&s), Err(AppError::InvalidTrigger(_)))
}

#[test]
fn invalid_combinations_are_rejected() {
    let mut s = spec("t", ClockEventKind::ClockIn);
    s.text_field_required = true;
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.play_sound = true;
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.days = Some(vec![]);
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.days = Some(vec!["funday".into()]);
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.time_window = Some("25:00-26:00".into());
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.max_firings_per_day = Some(0);
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.delay_minutes = -5;
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.delay_minutes = i64::MAX;
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.delay_minutes = 10_000_000_000_000;
    assert!(rejected(s));

    let mut s = spec("t", ClockEventKind::ClockIn);
    s.delay_minutes = MAX_DELAY_MINUTES + 1;
    assert!(rejected(s));

    assert!(rejected(TriggerSpec {
        name: "t".into(),
        ..Default::default()
    }));
    assert!(rejected(spec("  ", ClockEventKind::ClockIn)));
}

#[test]
fn valid_spec_becomes_typed_trigger() {
    let mut s = spec("mileage", ClockEventKind::ClockOut);
    s.show_alert = true;
    s.play_sound = true;
    s.has_text_field = true;
    s.text_field_required = true;
    s.text_field_label = Some("Km driven".into());
    s.delay_minutes = 5;

    let t = TaskTrigger::try_from(&s).unwrap();
    assert!(t.enabled);
    assert_eq!(t.title, "mileage");
    assert_eq!(t.alert, Alert::Visible { sound: true });
    assert_eq!(t.text_field, TextField::Required("Km driven".into()));
    assert_eq!(t.delay, Duration::minutes(5));
}

#[test]
fn matching_checks_kind_day_window_and_assignee() {
    let mut s = spec("morning", ClockEventKind::ClockIn);
    s.days = Some(vec!["mon".into(), "wed".into()]);
    s.time_window = Some("06:00-10:00".into());
    s.assigned_to = Some(vec!["alice".into()]);
    let t = TaskTrigger::try_from(&s).unwrap();

    assert!(t.matches(&event(ClockEventKind::ClockIn, "alice", monday(7, 0)), utc()));
    assert!(!t.matches(&event(ClockEventKind::ClockOut, "alice", monday(7, 0)), utc()));
    assert!(!t.matches(&event(ClockEventKind::ClockIn, "bob", monday(7, 0)), utc()));
    assert!(!t.matches(&event(ClockEventKind::ClockIn, "alice", monday(10, 0)), utc()));

    let tuesday = Utc.with_ymd_and_hms(2025, 3, 11, 7, 0, 0).unwrap();
    assert!(!t.matches(&event(ClockEventKind::ClockIn, "alice", tuesday), utc()));

    // 23:00 UTC on Sunday is 08:00 Monday at +09:00
    let sunday_night = Utc.with_ymd_and_hms(2025, 3, 9, 23, 0, 0).unwrap();
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    assert!(t.matches(&event(ClockEventKind::ClockIn, "alice", sunday_night), tokyo));
}

#[test]
fn window_can_wrap_midnight() {
    let mut s = spec("night", ClockEventKind::BreakStart);
    s.time_window = Some("22:00-02:00".into());
    let t = TaskTrigger::try_from(&s).unwrap();

    assert!(t.matches(&event(ClockEventKind::BreakStart, "a", monday(23, 30)), utc()));
    assert!(t.matches(&event(ClockEventKind::BreakStart, "a", monday(1, 0)), utc()));
    assert!(!t.matches(&event(ClockEventKind::BreakStart, "a", monday(12, 0)), utc()));
}

#[test]
fn disabled_trigger_never_fires() {
    let mut s = spec("off", ClockEventKind::ClockIn);
    s.enabled = Some(false);
    let engine = TriggerEngine::from_specs(&[s], utc()).unwrap();
    let mut ledger = MemoryStore::new();

    let tasks = engine
        .dispatch(&mut ledger, &event(ClockEventKind::ClockIn, "a", monday(8, 0)))
        .unwrap();
    assert!(tasks.is_empty());
}

#[test]
fn duplicate_names_are_rejected() {
    let specs = [
        spec("dup", ClockEventKind::ClockIn),
        spec("dup", ClockEventKind::ClockOut),
    ];
    assert!(TriggerEngine::from_specs(&specs, utc()).is_err());
}

#[test]
fn daily_cap_is_per_employee_and_local_day() {
    let mut s = spec("once", ClockEventKind::BreakStart);
    s.max_firings_per_day = Some(1);
    s.delay_minutes = 10;
    let engine = TriggerEngine::from_specs(&[s], utc()).unwrap();
    let mut ledger = MemoryStore::new();

    let fire = |ledger: &mut MemoryStore, who: &str, at| {
        engine
            .dispatch(ledger, &event(ClockEventKind::BreakStart, who, at))
            .unwrap()
            .len()
    };

    assert_eq!(fire(&mut ledger, "alice", monday(9, 0)), 1);
    assert_eq!(fire(&mut ledger, "alice", monday(15, 0)), 0);
    assert_eq!(fire(&mut ledger, "bob", monday(15, 0)), 1);

    let tuesday = Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap();
    assert_eq!(fire(&mut ledger, "alice", tuesday), 1);

    let tasks = ledger.tasks(&TaskFilter::default()).unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].due_at, monday(9, 10));
}

#[test]
fn clock_transitions_feed_the_engine() {
    let mut s = spec("after-break", ClockEventKind::BreakEnd);
    s.title = Some("Resume checklist".into());
    s.show_alert = true;
    let engine = TriggerEngine::from_specs(&[s], utc()).unwrap();
    let mut store = MemoryStore::new();

    let (session, _) = TimeClockLogic::new(&mut store)
        .clock_in(&emp("alice"), None, monday(8, 0))
        .unwrap();
    TimeClockLogic::new(&mut store)
        .start_break(session.id, monday(10, 0))
        .unwrap();
    let (_, ev) = TimeClockLogic::new(&mut store)
        .end_break(session.id, monday(10, 15))
        .unwrap();

    let tasks = engine.dispatch(&mut store, &ev).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Resume checklist");
    assert_eq!(tasks[0].session_id, Some(session.id));
    assert!(tasks[0].show_alert);
    assert!(!tasks[0].play_sound);
}

#[test]
fn manual_fire_only_for_manual_triggers() {
    let specs = [
        spec("ask", ClockEventKind::Manual),
        spec("auto", ClockEventKind::ClockIn),
    ];
    let engine = TriggerEngine::from_specs(&specs, utc()).unwrap();
    let mut ledger = MemoryStore::new();

    let task = engine
        .fire_manual(&mut ledger, "ask", &emp("alice"), None, monday(9, 0))
        .unwrap()
        .unwrap();
    assert_eq!(task.event, ClockEventKind::Manual);
    assert_eq!(task.session_id, None);

    assert!(engine
        .fire_manual(&mut ledger, "auto", &emp("alice"), None, monday(9, 0))
        .is_err());
    assert!(engine
        .fire_manual(&mut ledger, "missing", &emp("alice"), None, monday(9, 0))
        .is_err());
}

#[test]
fn longest_delay_is_accepted_but_due_time_must_fit() {
    let mut s = spec("late", ClockEventKind::ClockOut);
    s.delay_minutes = MAX_DELAY_MINUTES;
    let t = TaskTrigger::try_from(&s).unwrap();

    let task = t
        .schedule(&event(ClockEventKind::ClockOut, "alice", monday(17, 0)))
        .unwrap();
    assert_eq!(task.due_at, monday(17, 0) + Duration::minutes(MAX_DELAY_MINUTES));

    let end_of_time = event(ClockEventKind::ClockOut, "alice", chrono::DateTime::<Utc>::MAX_UTC);
    assert!(matches!(t.schedule(&end_of_time), Err(AppError::InvalidTrigger(_))));
}

#[test]
fn ledger_failure_does_not_undo_the_punch() {
    let mut s = spec("on-in", ClockEventKind::ClockIn);
    s.title = Some("Safety briefing".into());
    let engine = TriggerEngine::from_specs(&[s], utc()).unwrap();

    let mut store = SqliteStore::in_memory().unwrap();
    store
        .pool
        .conn
        .execute_batch("DROP TABLE scheduled_tasks")
        .unwrap();

    let outcome = PunchLogic::apply(
        &mut store,
        &engine,
        &emp("alice"),
        Punch::In { location: None },
        monday(8, 0),
    )
    .unwrap();

    assert!(outcome.tasks.is_empty());
    let open = store.find_open(&emp("alice")).unwrap().unwrap();
    assert_eq!(open.id, outcome.session.id);
}
