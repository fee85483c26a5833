//! Query service: validation, execution and export behind one entry point.
//!
//! This is the layer callers talk to. It checks inputs, picks the SQL dialect for
//! the gatekeeper from the configured engine, runs the rewritten statement through
//! the [`Dispatcher`] and annotates the outcome when a row cap was injected.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{DatabaseSummary, EngineKind};
use crate::dispatch::Dispatcher;
use crate::export::{self, ExportError, ExportFormat};
use crate::gatekeeper::{self, ValidatedQuery, ValidationError};
use crate::registry::{ConnectionRegistry, RegistryError};
use crate::types::ExecutionOutcome;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database name and SQL query are required")]
    MissingInput,

    #[error(transparent)]
    Config(#[from] RegistryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Execution(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Serialized query results ready to be written or sent.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

impl ExportFile {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn file_name(&self) -> String {
        self.format.file_name()
    }
}

pub struct QueryService {
    dispatcher: Dispatcher,
}

impl QueryService {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
        }
    }

    pub fn list_databases(&self) -> Result<Vec<DatabaseSummary>, ServiceError> {
        Ok(self.dispatcher.registry().list_databases()?)
    }

    /// Validate and run `sql` on `db_name`.
    ///
    /// Input and validation problems are errors and never reach a database.
    /// Execution problems come back inside an unsuccessful outcome.
    pub fn run_query(&self, db_name: &str, sql: &str) -> Result<ExecutionOutcome, ServiceError> {
        let query = self.prepare(db_name, sql)?;
        let outcome = self.dispatcher.execute(db_name, &query.executed);

        if query.limit_added() {
            tracing::debug!(database = db_name, executed = %query.executed, "row cap injected");
            Ok(outcome.with_rewrite(&query.original, &query.executed))
        } else {
            Ok(outcome)
        }
    }

    /// Validate, run and serialize. `format` defaults to CSV.
    pub fn export_query(
        &self,
        db_name: &str,
        sql: &str,
        format: Option<&str>,
    ) -> Result<ExportFile, ServiceError> {
        let format = match format {
            Some(name) => name.parse::<ExportFormat>()?,
            None => ExportFormat::default(),
        };

        let query = self.prepare(db_name, sql)?;
        let outcome = self.dispatcher.execute(db_name, &query.executed);
        if !outcome.success {
            return Err(ServiceError::Execution(
                outcome.error.unwrap_or_else(|| "Query execution failed".to_string()),
            ));
        }

        let row_count = outcome.data.len();
        let bytes = export::serialize(&outcome.data, format)?;
        tracing::debug!(database = db_name, %format, rows = row_count, bytes = bytes.len(), "export serialized");

        Ok(ExportFile {
            format,
            bytes,
            row_count,
        })
    }

    fn prepare(&self, db_name: &str, sql: &str) -> Result<ValidatedQuery, ServiceError> {
        if db_name.is_empty() || sql.is_empty() {
            return Err(ServiceError::MissingInput);
        }
        let dialect = self.dialect_for(db_name)?;
        Ok(gatekeeper::validate(sql, dialect)?)
    }

    /// Engine whose SQL dialect the row cap should use.
    ///
    /// Unknown names and unsupported types fall back to MySQL syntax; the
    /// dispatcher reports the real problem once execution is attempted.
    fn dialect_for(&self, db_name: &str) -> Result<EngineKind, ServiceError> {
        match self.dispatcher.registry().resolve(db_name) {
            Ok(config) => Ok(config.engine_kind().unwrap_or(EngineKind::MySql)),
            Err(RegistryError::NotFound(_)) => Ok(EngineKind::MySql),
            Err(e) => Err(e.into()),
        }
    }
}
