use fieldclock::core::store::{MemoryStore, SessionFilter, SessionStore, TaskFilter, TriggerLedger};
use fieldclock::core::timeclock::TimeClockLogic;
use fieldclock::db::migrate::applied_versions;
use fieldclock::db::store::SqliteStore;
use fieldclock::errors::ClockError;
use fieldclock::models::clock_event::ClockEventKind;
use fieldclock::models::location::GeoPoint;
use fieldclock::models::session::{EmployeeId, SessionId, SessionStatus};
use fieldclock::models::task::ScheduledTask;

mod common;
use common::{monday, setup_test_db};

fn emp(name: &str) -> EmployeeId {
    EmployeeId::new(name).unwrap()
}

#[test]
fn unique_index_blocks_second_open_session() {
    let db = setup_test_db("store_unique_open");
    let mut store = SqliteStore::open(&db).unwrap();

    let first = store.insert_open(&emp("alice"), monday(8, 0), None).unwrap();
    // bypasses the pre-check done by TimeClockLogic
    let err = store
        .insert_open(&emp("alice"), monday(8, 1), None)
        .unwrap_err();
    assert_eq!(
        err.as_clock(),
        Some(&ClockError::AlreadyClockedIn {
            employee: emp("alice"),
            session: first.id,
        })
    );

    // a second process sees the same rule
    let mut other = SqliteStore::open(&db).unwrap();
    assert!(other.insert_open(&emp("alice"), monday(8, 2), None).is_err());
    assert!(other.insert_open(&emp("bob"), monday(8, 2), None).is_ok());
}

#[test]
fn sessions_survive_reopen_with_breaks_and_locations() {
    let db = setup_test_db("store_reopen");
    let here: GeoPoint = "45.0703,7.6869".parse().unwrap();

    let id = {
        let mut store = SqliteStore::open(&db).unwrap();
        let mut clock = TimeClockLogic::new(&mut store);
        let (s, _) = clock.clock_in(&emp("alice"), Some(here), monday(8, 0)).unwrap();
        clock.start_break(s.id, monday(10, 0)).unwrap();
        clock.end_break(s.id, monday(10, 20)).unwrap();
        clock.start_break(s.id, monday(12, 0)).unwrap();
        clock
            .clock_out(s.id, Some("van returned".into()), Some(here), monday(13, 0))
            .unwrap();
        s.id
    };

    let store = SqliteStore::open(&db).unwrap();
    let s = store.find(id).unwrap().unwrap();
    assert_eq!(s.status, SessionStatus::ClockedOut);
    assert_eq!(s.breaks.len(), 2);
    assert_eq!(s.breaks[1].end_at, Some(monday(13, 0)));
    assert_eq!(s.clock_in_location, Some(here));
    assert_eq!(s.clock_out_location, Some(here));
    assert_eq!(s.notes.as_deref(), Some("van returned"));
    assert!(store.find_open(&emp("alice")).unwrap().is_none());
}

#[test]
fn migrations_run_once() {
    let db = setup_test_db("store_migrations_once");
    let first = {
        let store = SqliteStore::open(&db).unwrap();
        applied_versions(&store.pool.conn).unwrap()
    };
    assert_eq!(first.len(), 3);

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(applied_versions(&store.pool.conn).unwrap(), first);
}

#[test]
fn list_filters_by_employee_range_and_open() {
    let mut store = SqliteStore::in_memory().unwrap();
    let mut clock = TimeClockLogic::new(&mut store);
    let (a, _) = clock.clock_in(&emp("alice"), None, monday(8, 0)).unwrap();
    clock.clock_out(a.id, None, None, monday(12, 0)).unwrap();
    clock.clock_in(&emp("alice"), None, monday(13, 0)).unwrap();
    clock.clock_in(&emp("bob"), None, monday(9, 0)).unwrap();

    let all = store.list(&SessionFilter::default()).unwrap();
    let order: Vec<_> = all.iter().map(|s| s.clock_in_at).collect();
    assert_eq!(order, vec![monday(8, 0), monday(9, 0), monday(13, 0)]);

    let alice_open = store
        .list(&SessionFilter {
            employee: Some(emp("alice")),
            open_only: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(alice_open.len(), 1);
    assert_eq!(alice_open[0].clock_in_at, monday(13, 0));

    let morning = store
        .list(&SessionFilter {
            from: Some(monday(8, 30)),
            to: Some(monday(12, 0)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(morning.len(), 1);
    assert_eq!(morning[0].employee_id, emp("bob"));
}

#[test]
fn save_of_unknown_session_fails() {
    let mut store = SqliteStore::in_memory().unwrap();
    let mut s = store.insert_open(&emp("alice"), monday(8, 0), None).unwrap();
    s.id = SessionId(999);
    let err = store.save(&s).unwrap_err();
    assert_eq!(err.as_clock(), Some(&ClockError::SessionNotOpen(SessionId(999))));
}

#[test]
fn task_ledger_counts_and_filters() {
    let mut store = SqliteStore::in_memory().unwrap();
    let task = |trigger: &str, who: &str, h: u32| ScheduledTask {
        id: 0,
        trigger: trigger.into(),
        employee_id: emp(who),
        session_id: None,
        event: ClockEventKind::ClockIn,
        fired_at: monday(h, 0),
        due_at: monday(h, 15),
        title: "Check".into(),
        show_alert: true,
        play_sound: false,
        text_field: Some("Mileage".into()),
        text_required: true,
    };

    let stored = store.record_task(&task("t1", "alice", 8)).unwrap();
    assert!(stored.id > 0);
    store.record_task(&task("t1", "alice", 11)).unwrap();
    store.record_task(&task("t1", "bob", 9)).unwrap();
    store.record_task(&task("t2", "alice", 9)).unwrap();

    let n = store
        .firing_count("t1", &emp("alice"), monday(0, 0), monday(10, 0))
        .unwrap();
    assert_eq!(n, 1);

    let due = store
        .tasks(&TaskFilter {
            employee: Some(emp("alice")),
            due_by: Some(monday(9, 30)),
        })
        .unwrap();
    assert_eq!(due.len(), 2);
    assert_eq!(due[0].due_at, monday(8, 15));
    assert_eq!(due[0].text_field.as_deref(), Some("Mileage"));
    assert!(due[0].text_required);
}

#[test]
fn stale_copy_cannot_reopen_closed_session() {
    let db = setup_test_db("store_stale_copy");
    let mut first = SqliteStore::open(&db).unwrap();
    let mut second = SqliteStore::open(&db).unwrap();

    let s = first.insert_open(&emp("alice"), monday(8, 0), None).unwrap();
    let mut stale = first.find(s.id).unwrap().unwrap();

    TimeClockLogic::new(&mut second)
        .clock_out(s.id, None, None, monday(12, 0))
        .unwrap();

    stale.start_break(monday(9, 0)).unwrap();
    let err = first.save(&stale).unwrap_err();
    assert_eq!(err.as_clock(), Some(&ClockError::SessionNotOpen(s.id)));

    let stored = first.find(s.id).unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::ClockedOut);
    assert_eq!(stored.clock_out_at, Some(monday(12, 0)));
    assert!(stored.breaks.is_empty());

    // approval keeps the clock-out, so it is still accepted
    let approved = TimeClockLogic::new(&mut first).approve(s.id, true).unwrap();
    assert!(approved.supervisor_approved);
    assert_eq!(approved.clock_out_at, Some(monday(12, 0)));
}

#[test]
fn memory_store_keeps_closed_sessions_closed() {
    let mut store = MemoryStore::new();
    let s = store.insert_open(&emp("alice"), monday(8, 0), None).unwrap();
    let stale = s.clone();

    TimeClockLogic::new(&mut store)
        .clock_out(s.id, None, None, monday(12, 0))
        .unwrap();

    let err = store.save(&stale).unwrap_err();
    assert_eq!(err.as_clock(), Some(&ClockError::SessionNotOpen(s.id)));
    assert_eq!(
        store.find(s.id).unwrap().unwrap().clock_out_at,
        Some(monday(12, 0))
    );
}
