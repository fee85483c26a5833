//! Shared test utilities for unit and CLI tests.
//!
//! This module provides helpers for writing connections files and seeding SQLite
//! databases inside temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;

use crate::fixtures;
use crate::registry::DEFAULT_CONFIG_FILE;

/// A temp directory holding `people.db` and a `connections.json` naming it `people`.
///
/// The directory is removed when this value is dropped.
pub struct PeopleDb {
    pub dir: TempDir,
    pub db_path: PathBuf,
}

impl PeopleDb {
    pub fn config_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join(DEFAULT_CONFIG_FILE)
    }
}

/// Write `content` as `connections.json` in `dir`.
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    fs::write(&path, content).expect("Failed to write connections file");
    path
}

/// Create a SQLite file at `path` and run `seed` against it.
pub fn create_sqlite_db(path: &Path, seed: &str) {
    let conn = Connection::open(path).expect("Failed to create SQLite file");
    conn.execute_batch(seed).expect("Seed script should run");
}

/// Connections file JSON with a single SQLite entry.
pub fn sqlite_connections(name: &str, db_path: &Path) -> String {
    serde_json::json!({
        "databases": [
            {"name": name, "type": "sqlite", "database": db_path.display().to_string()}
        ]
    })
    .to_string()
}

/// Create the `people` fixture database with its connections file.
///
/// Use for: dispatcher, service, query and export command tests.
pub fn people_db() -> PeopleDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("people.db");
    create_sqlite_db(&db_path, fixtures::PEOPLE_SCHEMA);
    write_config(dir.path(), &sqlite_connections("people", &db_path));
    PeopleDb { dir, db_path }
}

/// A temp directory with [`fixtures::MIXED_CONNECTIONS`] as its connections file.
pub fn mixed_connections_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_config(dir.path(), fixtures::MIXED_CONNECTIONS);
    dir
}
