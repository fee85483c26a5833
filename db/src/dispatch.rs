//! Execution dispatcher: name → engine → outcome.

use std::sync::Arc;

use crate::backend::{Engine, QueryEngine};
use crate::registry::ConnectionRegistry;
use crate::types::{ExecutionOutcome, TabularResult};

/// Runs statements against registry-named databases.
///
/// [`Dispatcher::execute`] never returns an error: every failure, from a missing
/// config file to a driver error, is folded into an unsuccessful
/// [`ExecutionOutcome`].
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Execute `sql` verbatim on the database named `db_name`.
    ///
    /// The statement is not validated here.
    pub fn execute(&self, db_name: &str, sql: &str) -> ExecutionOutcome {
        let config = match self.registry.resolve(db_name) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(database = db_name, error = %e, "database lookup failed");
                return ExecutionOutcome::failed(e.to_string());
            }
        };

        let engine = match Engine::for_config(config) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!(database = db_name, error = %e, "no engine for database");
                return ExecutionOutcome::failed(e.to_string());
            }
        };

        match engine.query(config, sql) {
            Ok(rows) => {
                tracing::debug!(database = db_name, rows = rows.len(), "statement executed");
                ExecutionOutcome::succeeded(TabularResult::new(rows))
            }
            Err(e) => {
                tracing::error!(
                    database = db_name,
                    engine = %engine.engine_kind(),
                    error = %e,
                    "query execution failed"
                );
                ExecutionOutcome::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{people_db, write_config, PeopleDb};
    use crate::types::Value;
    use rstest::rstest;

    fn dispatcher_for(people: &PeopleDb) -> Dispatcher {
        Dispatcher::new(Arc::new(ConnectionRegistry::in_dir(people.config_dir())))
    }

    #[rstest]
    fn test_execute_success() {
        let people = people_db();
        let outcome = dispatcher_for(&people).execute("people", "SELECT name FROM people ORDER BY id");

        assert!(outcome.success);
        assert_eq!(outcome.row_count, Some(3));
        assert_eq!(outcome.data[0]["name"], Value::Text("Ada".to_string()));
        assert!(outcome.error.is_none());
    }

    #[rstest]
    fn test_execute_unknown_database() {
        let people = people_db();
        let outcome = dispatcher_for(&people).execute("nope", "SELECT 1");

        assert!(!outcome.success);
        assert!(outcome.data.is_empty());
        assert_eq!(outcome.error.as_deref(), Some("Database 'nope' not found in configuration"));
    }

    #[rstest]
    fn test_execute_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), r#"{"databases": [{"name": "o", "type": "oracle"}]}"#);
        let dispatcher = Dispatcher::new(Arc::new(ConnectionRegistry::in_dir(dir.path())));

        let outcome = dispatcher.execute("o", "SELECT 1");
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Unsupported database type: oracle"));
    }

    #[rstest]
    fn test_execute_driver_error_is_captured() {
        let people = people_db();
        let outcome = dispatcher_for(&people).execute("people", "SELECT * FROM missing_table");

        assert!(!outcome.success);
        assert!(outcome.data.is_empty());
        assert!(outcome.error.unwrap().contains("missing_table"));
    }

    #[rstest]
    fn test_execute_missing_config_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = Dispatcher::new(Arc::new(ConnectionRegistry::in_dir(dir.path())));

        let outcome = dispatcher.execute("people", "SELECT 1");
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().starts_with("Failed to load connections configuration"));
    }

    #[rstest]
    #[case("mysql")]
    #[case("postgres")]
    #[case("mssql")]
    fn test_unreachable_network_engines_fail_softly(#[case] db_type: &str) {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            &format!(
                r#"{{"databases": [{{"name": "remote", "type": "{}", "host": "127.0.0.1", "port": 1,
                     "username": "u", "password": "p", "database": "d"}}]}}"#,
                db_type
            ),
        );
        let dispatcher = Dispatcher::new(Arc::new(ConnectionRegistry::in_dir(dir.path())));

        let outcome = dispatcher.execute("remote", "SELECT 1");
        assert!(!outcome.success);
        assert!(!outcome.error.unwrap_or_default().is_empty());
    }
}
