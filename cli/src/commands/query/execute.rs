use std::error::Error;

use db::{ExecutionOutcome, QueryService};
use serde::Serialize;

use super::QueryCmd;
use crate::commands::Execute;

/// Result of the query command execution
///
/// A failed execution is still a result: `success` is false and `error` holds
/// the engine's message.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub database: String,
    #[serde(flatten)]
    pub outcome: ExecutionOutcome,
}

impl Execute for QueryCmd {
    type Output = QueryResult;

    fn execute(self, service: &QueryService) -> Result<Self::Output, Box<dyn Error>> {
        let outcome = service.run_query(&self.db, &self.sql)?;
        Ok(QueryResult {
            database: self.db,
            outcome,
        })
    }
}
