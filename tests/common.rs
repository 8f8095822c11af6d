#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// CLI command with HOME pointed at a private directory, so no real
/// configuration file is read or written.
pub fn sqp(name: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("sqliteplus");
    cmd.env("HOME", test_home(name));
    cmd.env_remove("SQLITEPLUS_LOG");
    cmd
}

/// Fresh, empty home directory for one test.
pub fn test_home(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_sqliteplus_home", name));
    fs::create_dir_all(&path).ok();
    path
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_sqliteplus.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    for suffix in ["-journal", "-wal", "-shm"] {
        fs::remove_file(format!("{db_path}{suffix}")).ok();
    }
    db_path
}

/// Create a `people` table with a few committed rows
pub fn init_db_with_people(db_path: &str) {
    let mut conn = sqliteplus::Connection::new(db_path).expect("open db");
    conn.execute(
        "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, note TEXT);
         INSERT INTO people VALUES (1, 'Ada', NULL);
         INSERT INTO people VALUES (2, 'Grace', 'navy');
         INSERT INTO people VALUES (3, 'Linus', NULL);",
    )
    .expect("seed people");
    conn.commit().expect("commit seed");
}
