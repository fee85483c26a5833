//! MySQL adapter over a single `sqlx` connection.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Row as _};
use tokio::runtime::Runtime;

use super::{handle_runtime, run_statement, DbError, EngineAdapter, QueryEngine};
use crate::config::{DatabaseConfig, EngineKind};
use crate::types::{Row, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlAdapter;

pub struct MySqlHandle {
    runtime: Runtime,
    conn: MySqlConnection,
}

impl EngineAdapter for MySqlAdapter {
    type Handle = MySqlHandle;

    fn kind(&self) -> EngineKind {
        EngineKind::MySql
    }

    fn open(&self, config: &DatabaseConfig) -> Result<MySqlHandle, DbError> {
        let options = connect_options(config);
        let runtime = handle_runtime()?;
        let conn = runtime
            .block_on(MySqlConnection::connect_with(&options))
            .map_err(|e| DbError::connection(self.kind(), e))?;
        Ok(MySqlHandle { runtime, conn })
    }

    fn run(&self, handle: &mut MySqlHandle, sql: &str) -> Result<Vec<Row>, DbError> {
        let MySqlHandle { runtime, conn } = handle;
        let rows = runtime
            .block_on(sqlx::query(sql).fetch_all(&mut *conn))
            .map_err(|e| DbError::execution(self.kind(), e))?;
        Ok(rows.iter().map(convert_row).collect())
    }

    fn close(&self, handle: MySqlHandle) -> Result<(), DbError> {
        let MySqlHandle { runtime, conn } = handle;
        runtime
            .block_on(conn.close())
            .map_err(|e| DbError::close(self.kind(), e))
    }
}

impl QueryEngine for MySqlAdapter {
    fn engine_kind(&self) -> EngineKind {
        self.kind()
    }

    fn query(&self, config: &DatabaseConfig, sql: &str) -> Result<Vec<Row>, DbError> {
        run_statement(self, config, sql)
    }
}

fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    let (host, port) = config.endpoint();
    let mut options = MySqlConnectOptions::new().host(&host);
    if let Some(port) = port {
        options = options.port(port);
    }
    if let Some(user) = config.username.as_deref() {
        options = options.username(user);
    }
    if let Some(password) = config.password.as_deref() {
        options = options.password(password);
    }
    if let Some(database) = config.database.as_deref().filter(|d| !d.is_empty()) {
        options = options.database(database);
    }
    options
}

fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), extract_value(row, col.ordinal())))
        .collect()
}

/// Decode one cell by trying the Rust types MySQL columns map onto, most
/// specific first. A `NULL` in any typed column decodes as `Ok(None)`.
fn extract_value(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return v.map_or(Value::Null, |n| match i64::try_from(n) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(n),
        });
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v.map_or(Value::Null, |f| Value::Float(f.into()));
    }
    if let Ok(v) = row.try_get::<Option<BigDecimal>, _>(idx) {
        return v.map_or(Value::Null, |d| Value::Text(d.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return v.map_or(Value::Null, |t| Value::Text(t.to_rfc3339()));
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return v.map_or(Value::Null, |t| Value::Text(t.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return v.map_or(Value::Null, |t| Value::Text(t.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<NaiveTime>, _>(idx) {
        return v.map_or(Value::Null, |t| Value::Text(t.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<serde_json::Value>, _>(idx) {
        return v.map_or(Value::Null, |j| Value::Text(j.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v.map_or(Value::Null, Value::Bytes);
    }
    tracing::debug!(column = idx, "undecodable MySQL column, returning null");
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(json: &str) -> DatabaseConfig {
        serde_json::from_str(json).unwrap()
    }

    #[rstest]
    fn test_connect_options_use_host_port_suffix() {
        let cfg = config(
            r#"{"name": "m", "type": "mysql", "host": "10.0.0.9,3310", "port": 3306,
                "database": "shop", "username": "ro", "password": "pw"}"#,
        );
        let options = connect_options(&cfg);
        assert_eq!(options.get_host(), "10.0.0.9");
        assert_eq!(options.get_port(), 3310);
        assert_eq!(options.get_username(), "ro");
        assert_eq!(options.get_database(), Some("shop"));
    }

    #[rstest]
    fn test_connect_options_default_port() {
        let cfg = config(r#"{"name": "m", "type": "mysql", "host": "db"}"#);
        let options = connect_options(&cfg);
        assert_eq!(options.get_port(), 3306);
        assert_eq!(options.get_database(), None);
    }

    #[rstest]
    fn test_unreachable_server_is_connection_error() {
        let cfg = config(r#"{"name": "m", "type": "mysql", "host": "127.0.0.1", "port": 1}"#);
        let err = MySqlAdapter.query(&cfg, "SELECT 1").unwrap_err();
        assert!(matches!(err, DbError::Connection { engine: EngineKind::MySql, .. }));
        assert!(!err.to_string().is_empty());
    }
}
