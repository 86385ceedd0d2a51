use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{fc_with, init_db, missing_config, setup_test_db, temp_out, write_config};

fn punch(db: &str, cfg: &str, args: &[&str], at: &str) -> assert_cmd::assert::Assert {
    fc_with(db, cfg).args(["--at", at]).args(args).assert()
}

#[test]
fn test_full_shift_via_cli() {
    let db = setup_test_db("cli_full_shift");
    let cfg = missing_config("cli_full_shift");
    init_db(&db, &cfg);

    punch(&db, &cfg, &["in", "-e", "alice"], "2025-03-10 08:00")
        .success()
        .stdout(contains("alice clocked in at 08:00"));

    punch(&db, &cfg, &["break", "-e", "alice"], "2025-03-10 12:00")
        .success()
        .stdout(contains("started a break at 12:00"));

    punch(&db, &cfg, &["resume", "-e", "alice"], "2025-03-10 12:30")
        .success()
        .stdout(contains("break 00h 30m"));

    punch(&db, &cfg, &["out", "-e", "alice", "--notes", "site B"], "2025-03-10 16:30")
        .success()
        .stdout(contains("Worked 08h 00m").and(contains("breaks 00h 30m")));

    fc_with(&db, &cfg)
        .args(["list", "--period", "2025-03", "--details"])
        .assert()
        .success()
        .stdout(contains("alice"))
        .stdout(contains("2025-03-10 08:00"))
        .stdout(contains("Clocked out"))
        .stdout(contains("08h 00m"))
        .stdout(contains("notes: site B"));
}

#[test]
fn test_double_clock_in_fails() {
    let db = setup_test_db("cli_double_in");
    let cfg = missing_config("cli_double_in");
    init_db(&db, &cfg);

    punch(&db, &cfg, &["in", "-e", "alice"], "2025-03-10 08:00").success();
    punch(&db, &cfg, &["in", "-e", "alice"], "2025-03-10 08:05")
        .failure()
        .stderr(contains("already clocked in"));

    punch(&db, &cfg, &["in", "-e", "bob"], "2025-03-10 08:05").success();
}

#[test]
fn test_invalid_transitions_report_errors() {
    let db = setup_test_db("cli_invalid_transitions");
    let cfg = missing_config("cli_invalid_transitions");
    init_db(&db, &cfg);

    punch(&db, &cfg, &["break", "-e", "alice"], "2025-03-10 08:00")
        .failure()
        .stderr(contains("has no open session"));

    punch(&db, &cfg, &["in", "-e", "alice"], "2025-03-10 08:00").success();

    punch(&db, &cfg, &["resume", "-e", "alice"], "2025-03-10 09:00")
        .failure()
        .stderr(contains("has no active break"));

    punch(&db, &cfg, &["break", "-e", "alice"], "2025-03-10 09:00").success();
    punch(&db, &cfg, &["break", "-e", "alice"], "2025-03-10 09:10")
        .failure()
        .stderr(contains("already has an active break"));

    punch(&db, &cfg, &["out", "-e", "alice"], "2025-03-10 07:00")
        .failure()
        .stderr(contains("is not after"));
}

#[test]
fn test_status_of_open_session() {
    let db = setup_test_db("cli_status");
    let cfg = missing_config("cli_status");
    init_db(&db, &cfg);

    punch(&db, &cfg, &["in", "-e", "alice", "--loc", "45.07,7.68"], "2025-03-10 08:00").success();
    punch(&db, &cfg, &["break", "-e", "alice"], "2025-03-10 10:00").success();

    punch(&db, &cfg, &["status", "-e", "alice"], "2025-03-10 10:20")
        .success()
        .stdout(contains("On break"))
        .stdout(contains("45.07,7.68"))
        .stdout(contains("02h 20m"))
        .stdout(contains("02h 00m"))
        .stdout(contains("On break since 2025-03-10 10:00"));

    punch(&db, &cfg, &["status", "-e", "bob"], "2025-03-10 10:20")
        .failure()
        .stderr(contains("has no open session"));
}

#[test]
fn test_bad_location_is_ignored() {
    let db = setup_test_db("cli_bad_location");
    let cfg = missing_config("cli_bad_location");
    init_db(&db, &cfg);

    punch(&db, &cfg, &["in", "-e", "alice", "--loc", "north pole"], "2025-03-10 08:00")
        .success()
        .stdout(contains("Ignoring location"))
        .stdout(contains("clocked in"));
}

#[test]
fn test_approve_only_closed_sessions() {
    let db = setup_test_db("cli_approve");
    let cfg = missing_config("cli_approve");
    init_db(&db, &cfg);

    punch(&db, &cfg, &["in", "-e", "alice"], "2025-03-10 08:00").success();

    fc_with(&db, &cfg)
        .args(["approve", "1"])
        .assert()
        .failure()
        .stderr(contains("still open"));

    fc_with(&db, &cfg)
        .args(["approve", "42"])
        .assert()
        .failure()
        .stderr(contains("Session #42 does not exist"));

    punch(&db, &cfg, &["out", "-e", "alice"], "2025-03-10 12:00").success();

    fc_with(&db, &cfg)
        .args(["approve", "1"])
        .assert()
        .success()
        .stdout(contains("Session #1 approved"));

    fc_with(&db, &cfg)
        .args(["approve", "1", "--revoke"])
        .assert()
        .success()
        .stdout(contains("Approval revoked"));

    fc_with(&db, &cfg)
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("clock_in"))
        .stdout(contains("approve"))
        .stdout(contains("revoke"))
        .stdout(contains("migration_applied"));
}

#[test]
fn test_export_json_and_csv() {
    let db = setup_test_db("cli_export");
    let cfg = missing_config("cli_export");
    init_db(&db, &cfg);

    punch(&db, &cfg, &["in", "-e", "alice"], "2025-03-10 08:00").success();
    punch(&db, &cfg, &["break", "-e", "alice"], "2025-03-10 10:00").success();
    punch(&db, &cfg, &["out", "-e", "alice"], "2025-03-10 10:15").success();
    punch(&db, &cfg, &["in", "-e", "bob"], "2024-12-01 09:00").success();

    let json = temp_out("cli_export_json", "json");
    punch(
        &db,
        &cfg,
        &["export", "--format", "json", "--file", &json, "--range", "2025"],
        "2025-03-11 09:00",
    )
    .success();

    let body = fs::read_to_string(&json).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&body).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employeeId"], "alice");
    assert_eq!(rows[0]["workedMinutes"], 120);
    assert_eq!(rows[0]["breakMinutes"], 15);
    assert_eq!(rows[0]["breaks"][0]["endAt"], "2025-03-10T10:15:00Z");

    let csv = temp_out("cli_export_csv", "csv");
    punch(&db, &cfg, &["export", "--file", &csv], "2025-03-11 09:00").success();

    let body = fs::read_to_string(&csv).unwrap();
    assert!(body.starts_with("id,employee,status,clock_in"));
    assert!(body.contains("alice,clocked_out,2025-03-10 08:00,2025-03-10 10:15,1,135,15,120"));
    assert!(body.contains("bob,clocked_in,2024-12-01 09:00"));
}

#[test]
fn test_export_requires_absolute_path() {
    let db = setup_test_db("cli_export_relative");
    let cfg = missing_config("cli_export_relative");
    init_db(&db, &cfg);

    fc_with(&db, &cfg)
        .args(["export", "--file", "relative.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_triggers_schedule_tasks() {
    let db = setup_test_db("cli_triggers");
    let cfg = write_config(
        "cli_triggers",
        r#"
database: /unused.sqlite
utc_offset: "+01:00"
default_employee: alice
triggers:
  - name: vehicle-check
    onEvent: ClockIn
    days: [mon]
    timeWindow: "06:00-10:00"
    delayMinutes: 15
    title: Vehicle check
    showAlert: true
    hasTextField: true
    textFieldRequired: true
    textFieldLabel: Mileage
    maxFiringsPerDay: 1
  - name: incident
    onEvent: Manual
"#,
    );
    init_db(&db, &cfg);

    fc_with(&db, &cfg)
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(contains("2 trigger(s) valid"));

    fc_with(&db, &cfg)
        .args(["trigger", "list"])
        .assert()
        .success()
        .stdout(contains("vehicle-check"))
        .stdout(contains("06:00-10:00"))
        .stdout(contains("Mileage *"));

    // default_employee is used without -e; times are read at +01:00
    punch(&db, &cfg, &["in"], "2025-03-10 07:00")
        .success()
        .stdout(contains("alice clocked in at 07:00"))
        .stdout(contains("Task 'Vehicle check' scheduled for 2025-03-10 07:15"));

    punch(&db, &cfg, &["out"], "2025-03-10 07:30").success();
    punch(&db, &cfg, &["in"], "2025-03-10 08:00")
        .success()
        .stdout(contains("Vehicle check").not());

    punch(&db, &cfg, &["trigger", "fire", "incident"], "2025-03-10 08:10")
        .success()
        .stdout(contains("Task 'incident' scheduled for alice"));

    punch(&db, &cfg, &["tasks", "--due"], "2025-03-10 07:20")
        .success()
        .stdout(contains("Vehicle check"))
        .stdout(contains("incident").not());

    fc_with(&db, &cfg)
        .args(["trigger", "fire", "vehicle-check"])
        .assert()
        .failure()
        .stderr(contains("not manually"));
}

#[test]
fn test_invalid_trigger_config_is_reported() {
    let db = setup_test_db("cli_bad_trigger");
    let cfg = write_config(
        "cli_bad_trigger",
        r#"
database: /unused.sqlite
triggers:
  - name: broken
    onEvent: ClockOut
    textFieldRequired: true
"#,
    );
    init_db(&db, &cfg);

    fc_with(&db, &cfg)
        .args(["config", "--check"])
        .assert()
        .failure()
        .stderr(contains("textFieldRequired without hasTextField"));
}
