//! PostgreSQL adapter over the blocking `postgres` client.
//!
//! Rows come back through the simple query protocol as server-rendered text.
//! The statement is prepared first only to learn its column types, which turn
//! booleans, integers and floats back into typed cells. Anything else stays text.

use std::time::Duration;

use postgres::types::Type;
use postgres::{Client, Config, NoTls, SimpleQueryMessage, SimpleQueryRow};

use super::{run_statement, DbError, EngineAdapter, QueryEngine};
use crate::config::{DatabaseConfig, EngineKind};
use crate::types::{Row, Value};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresAdapter;

pub struct PostgresHandle {
    client: Client,
}

impl EngineAdapter for PostgresAdapter {
    type Handle = PostgresHandle;

    fn kind(&self) -> EngineKind {
        EngineKind::Postgres
    }

    fn open(&self, config: &DatabaseConfig) -> Result<PostgresHandle, DbError> {
        let client = client_config(config)
            .connect(NoTls)
            .map_err(|e| DbError::connection(self.kind(), e))?;
        Ok(PostgresHandle { client })
    }

    fn run(&self, handle: &mut PostgresHandle, sql: &str) -> Result<Vec<Row>, DbError> {
        let err = |e: postgres::Error| DbError::execution(EngineKind::Postgres, e);

        let types: Vec<Type> = handle
            .client
            .prepare(sql)
            .map_err(err)?
            .columns()
            .iter()
            .map(|col| col.type_().clone())
            .collect();
        let messages = handle.client.simple_query(sql).map_err(err)?;

        Ok(messages
            .iter()
            .filter_map(|message| match message {
                SimpleQueryMessage::Row(row) => Some(convert_row(row, &types)),
                _ => None,
            })
            .collect())
    }

    fn close(&self, handle: PostgresHandle) -> Result<(), DbError> {
        handle
            .client
            .close()
            .map_err(|e| DbError::close(self.kind(), e))
    }
}

impl QueryEngine for PostgresAdapter {
    fn engine_kind(&self) -> EngineKind {
        self.kind()
    }

    fn query(&self, config: &DatabaseConfig, sql: &str) -> Result<Vec<Row>, DbError> {
        run_statement(self, config, sql)
    }
}

fn client_config(config: &DatabaseConfig) -> Config {
    let (host, port) = config.endpoint();
    let mut pg = Config::new();
    pg.host(&host).connect_timeout(CONNECT_TIMEOUT);
    if let Some(port) = port {
        pg.port(port);
    }
    if let Some(user) = config.username.as_deref() {
        pg.user(user);
    }
    if let Some(password) = config.password.as_deref() {
        pg.password(password);
    }
    if let Some(dbname) = config.database.as_deref().filter(|d| !d.is_empty()) {
        pg.dbname(dbname);
    }
    pg
}

fn convert_row(row: &SimpleQueryRow, types: &[Type]) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let value = match (row.get(idx), types.get(idx)) {
                (None, _) => Value::Null,
                (Some(text), Some(ty)) => typed_cell(ty, text),
                (Some(text), None) => Value::from(text),
            };
            (col.name().to_string(), value)
        })
        .collect()
}

/// Parse the text form of a cell for the types with a natural JSON scalar.
/// Text that does not parse is kept as is.
fn typed_cell(ty: &Type, text: &str) -> Value {
    let as_text = || Value::from(text);
    if *ty == Type::BOOL {
        match text {
            "t" => Value::Bool(true),
            "f" => Value::Bool(false),
            _ => as_text(),
        }
    } else if [Type::INT2, Type::INT4, Type::INT8].contains(ty) {
        text.parse().map(Value::Int).unwrap_or_else(|_| as_text())
    } else if [Type::FLOAT4, Type::FLOAT8].contains(ty) {
        text.parse().map(Value::Float).unwrap_or_else(|_| as_text())
    } else {
        as_text()
    }
}
