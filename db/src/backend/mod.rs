//! Engine adapters behind one open/run/close protocol.
//!
//! Each supported engine implements [`EngineAdapter`]. The adapters differ only in
//! how a handle is established and how native rows become [`Row`]s; the lifecycle
//! itself lives in [`run_statement`], which closes every handle it opened exactly
//! once, whether the statement succeeded or not.
//!
//! The set of engines is closed: [`Engine`] has one variant per adapter and
//! dispatches statically through [`QueryEngine`].
//!
//! Drivers that only expose async APIs (MySQL via `sqlx`, SQL Server via
//! `tiberius`) carry a current-thread tokio runtime inside their handle, the same
//! way the blocking `postgres` client wraps `tokio-postgres`. Those adapters must
//! not be called from inside another tokio runtime.

pub mod mssql;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

use std::fmt::Display;

use enum_dispatch::enum_dispatch;
use thiserror::Error;

use crate::config::{DatabaseConfig, EngineKind};
use crate::types::Row;

pub use self::mssql::SqlServerAdapter;
pub use self::mysql::MySqlAdapter;
pub use self::postgres::PostgresAdapter;
pub use self::sqlite::SqliteAdapter;

/// Engine-level failures. Display is the driver's message, unmodified.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("{message}")]
    Connection { engine: EngineKind, message: String },

    #[error("{message}")]
    Execution { engine: EngineKind, message: String },

    #[error("{message}")]
    Close { engine: EngineKind, message: String },

    #[error("Failed to start async runtime: {0}")]
    Runtime(String),

    #[error("Unsupported database type: {0}")]
    UnsupportedEngine(String),
}

impl DbError {
    pub fn connection(engine: EngineKind, err: impl Display) -> Self {
        Self::Connection {
            engine,
            message: err.to_string(),
        }
    }

    pub fn execution(engine: EngineKind, err: impl Display) -> Self {
        Self::Execution {
            engine,
            message: err.to_string(),
        }
    }

    pub fn close(engine: EngineKind, err: impl Display) -> Self {
        Self::Close {
            engine,
            message: err.to_string(),
        }
    }
}

/// The three-step lifecycle every engine implements.
///
/// `close` takes the handle by value: a handle can only be closed once, and a
/// failed `open` leaves nothing to close.
pub trait EngineAdapter {
    type Handle;

    fn kind(&self) -> EngineKind;

    /// Establish a single, unpooled connection.
    fn open(&self, config: &DatabaseConfig) -> Result<Self::Handle, DbError>;

    /// Execute one statement and fetch every row it produces.
    fn run(&self, handle: &mut Self::Handle, sql: &str) -> Result<Vec<Row>, DbError>;

    /// Release the connection.
    fn close(&self, handle: Self::Handle) -> Result<(), DbError>;
}

/// Open, run and close, strictly in that order.
///
/// Close runs whenever open succeeded. A close failure after a successful run is
/// logged and the rows are still returned; after a failed run the run error wins.
pub fn run_statement<A: EngineAdapter>(
    adapter: &A,
    config: &DatabaseConfig,
    sql: &str,
) -> Result<Vec<Row>, DbError> {
    let engine = adapter.kind();
    tracing::debug!(%engine, database = %config.name, "opening connection");
    let mut handle = adapter.open(config)?;

    let result = adapter.run(&mut handle, sql);
    let closed = adapter.close(handle);
    tracing::debug!(%engine, database = %config.name, "connection closed");

    if let Err(close_err) = closed {
        tracing::warn!(%engine, database = %config.name, error = %close_err, "failed to close connection cleanly");
    }
    result
}

/// Uniform entry point shared by every engine variant.
#[enum_dispatch]
pub trait QueryEngine {
    fn engine_kind(&self) -> EngineKind;

    /// Run one statement against `config` and return all rows.
    fn query(&self, config: &DatabaseConfig, sql: &str) -> Result<Vec<Row>, DbError>;
}

/// One variant per supported engine.
#[enum_dispatch(QueryEngine)]
#[derive(Debug, Clone, Copy)]
pub enum Engine {
    MySql(MySqlAdapter),
    Sqlite(SqliteAdapter),
    Postgres(PostgresAdapter),
    SqlServer(SqlServerAdapter),
}

impl Engine {
    pub fn for_kind(kind: EngineKind) -> Self {
        match kind {
            EngineKind::MySql => MySqlAdapter.into(),
            EngineKind::Sqlite => SqliteAdapter.into(),
            EngineKind::Postgres => PostgresAdapter.into(),
            EngineKind::SqlServer => SqlServerAdapter.into(),
        }
    }

    /// Select the engine for a configured database.
    pub fn for_config(config: &DatabaseConfig) -> Result<Self, DbError> {
        config
            .engine_kind()
            .map(Self::for_kind)
            .ok_or_else(|| DbError::UnsupportedEngine(config.db_type.clone()))
    }
}

/// Current-thread runtime owned by a single connection handle.
pub(crate) fn handle_runtime() -> Result<tokio::runtime::Runtime, DbError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DbError::Runtime(e.to_string()))
}
