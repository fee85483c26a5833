use std::error::Error;

use db::{DatabaseSummary, QueryService};
use serde::Serialize;

use super::DatabasesCmd;
use crate::commands::Execute;

/// Result of the databases command execution
#[derive(Debug, Default, Serialize)]
pub struct DatabasesResult {
    pub databases: Vec<DatabaseSummary>,
}

impl Execute for DatabasesCmd {
    type Output = DatabasesResult;

    fn execute(self, service: &QueryService) -> Result<Self::Output, Box<dyn Error>> {
        Ok(DatabasesResult {
            databases: service.list_databases()?,
        })
    }
}
