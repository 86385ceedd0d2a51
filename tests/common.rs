#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, TimeZone, Utc};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn fc() -> Command {
    cargo_bin_cmd!("fieldclock")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_fieldclock.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Config path that does not exist, so the user's own config never leaks in.
pub fn missing_config(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_missing_fieldclock.conf", name));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Write a config file with the given YAML body into tempdir
pub fn write_config(name: &str, yaml: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_fieldclock.conf", name));
    let p = path.to_string_lossy().to_string();
    fs::write(&p, yaml).expect("write test config");
    p
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// `fieldclock --db <db> --config <cfg>` ready for more args.
pub fn fc_with(db: &str, cfg: &str) -> Command {
    let mut cmd = fc();
    cmd.args(["--db", db, "--config", cfg]);
    cmd
}

/// Initialize a fresh DB in test mode
pub fn init_db(db: &str, cfg: &str) {
    fc_with(db, cfg).args(["--test", "init"]).assert().success();
}

/// 2025-03-10 (a Monday) at `h:m` UTC
pub fn monday(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
}
