//! SQLite adapter. The configured `database` is the file path.
//!
//! Files are opened read-only, so a missing file is an open error rather than a
//! freshly created empty database.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use super::{run_statement, DbError, EngineAdapter, QueryEngine};
use crate::config::{DatabaseConfig, EngineKind};
use crate::types::{Row, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

pub struct SqliteHandle {
    conn: Connection,
}

impl EngineAdapter for SqliteAdapter {
    type Handle = SqliteHandle;

    fn kind(&self) -> EngineKind {
        EngineKind::Sqlite
    }

    fn open(&self, config: &DatabaseConfig) -> Result<SqliteHandle, DbError> {
        let path = config
            .database
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DbError::connection(self.kind(), "SQLite database path is not configured"))?;

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| DbError::connection(self.kind(), e))?;
        Ok(SqliteHandle { conn })
    }

    fn run(&self, handle: &mut SqliteHandle, sql: &str) -> Result<Vec<Row>, DbError> {
        let err = |e: rusqlite::Error| DbError::execution(EngineKind::Sqlite, e);

        let mut stmt = handle.conn.prepare(sql).map_err(err)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt
            .query_map([], |row| {
                let mut out = Row::with_capacity(columns.len());
                for (idx, name) in columns.iter().enumerate() {
                    out.insert(name.clone(), convert_value(row.get_ref(idx)?));
                }
                Ok(out)
            })
            .map_err(err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(err)?;
        Ok(rows)
    }

    fn close(&self, handle: SqliteHandle) -> Result<(), DbError> {
        handle
            .conn
            .close()
            .map_err(|(_, e)| DbError::close(self.kind(), e))
    }
}

impl QueryEngine for SqliteAdapter {
    fn engine_kind(&self) -> EngineKind {
        self.kind()
    }

    fn query(&self, config: &DatabaseConfig, sql: &str) -> Result<Vec<Row>, DbError> {
        run_statement(self, config, sql)
    }
}

fn convert_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        config: DatabaseConfig,
    }

    fn config_for(path: &Path) -> DatabaseConfig {
        serde_json::from_value(serde_json::json!({
            "name": "local",
            "type": "sqlite",
            "database": path.display().to_string(),
        }))
        .unwrap()
    }

    #[fixture]
    fn people_db() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, score REAL, avatar BLOB);
             INSERT INTO people VALUES (1, 'Ada', 9.5, x'CAFE');
             INSERT INTO people VALUES (2, 'Grace', NULL, NULL);",
        )
        .unwrap();
        drop(conn);
        Fixture {
            config: config_for(&path),
            _dir: dir,
        }
    }

    #[rstest]
    fn test_rows_keep_column_order_and_types(people_db: Fixture) {
        let rows = SqliteAdapter
            .query(&people_db.config, "SELECT id, name, score, avatar FROM people ORDER BY id")
            .unwrap();

        assert_eq!(rows.len(), 2);
        let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "score", "avatar"]);
        assert_eq!(rows[0]["id"], Value::Int(1));
        assert_eq!(rows[0]["name"], Value::Text("Ada".to_string()));
        assert_eq!(rows[0]["score"], Value::Float(9.5));
        assert_eq!(rows[0]["avatar"], Value::Bytes(vec![0xCA, 0xFE]));
        assert!(rows[1]["score"].is_null());
    }

    #[rstest]
    fn test_empty_result(people_db: Fixture) {
        let rows = SqliteAdapter
            .query(&people_db.config, "SELECT * FROM people WHERE id > 100")
            .unwrap();
        assert!(rows.is_empty());
    }

    #[rstest]
    fn test_writes_rejected_by_read_only_open(people_db: Fixture) {
        let err = SqliteAdapter
            .query(&people_db.config, "DELETE FROM people")
            .unwrap_err();
        assert!(matches!(err, DbError::Execution { .. }));
        assert!(err.to_string().contains("readonly"), "{}", err);
    }

    #[rstest]
    fn test_unknown_table_is_execution_error(people_db: Fixture) {
        let err = SqliteAdapter
            .query(&people_db.config, "SELECT * FROM nope")
            .unwrap_err();
        assert!(err.to_string().contains("no such table"));
    }

    #[rstest]
    fn test_missing_file_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_for(&dir.path().join("absent.db"));
        let err = SqliteAdapter.query(&cfg, "SELECT 1").unwrap_err();
        assert!(matches!(err, DbError::Connection { .. }));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[rstest]
    fn test_missing_path_is_connection_error() {
        let cfg: DatabaseConfig =
            serde_json::from_str(r#"{"name": "x", "type": "sqlite"}"#).unwrap();
        let err = SqliteAdapter.query(&cfg, "SELECT 1").unwrap_err();
        assert_eq!(err.to_string(), "SQLite database path is not configured");
    }
}
