//! Output formatting for query command results.

use super::execute::QueryResult;
use crate::output::{format_rows, Outputable};

impl Outputable for QueryResult {
    fn to_table(&self) -> String {
        let outcome = &self.outcome;
        let mut lines = Vec::new();

        if !outcome.success {
            lines.push(format!(
                "Query on '{}' failed: {}",
                self.database,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
            if let Some(executed) = &outcome.executed_statement {
                lines.push(format!("Executed: {}", executed));
            }
            return lines.join("\n");
        }

        let count = outcome.row_count.unwrap_or(outcome.data.len());
        let noun = if count == 1 { "row" } else { "rows" };
        lines.push(format!("Query on '{}': {} {}", self.database, count, noun));
        if let Some(executed) = &outcome.executed_statement {
            lines.push(format!("Row cap added: {}", executed));
        }
        lines.push(String::new());

        if outcome.data.is_empty() {
            lines.push("No rows returned.".to_string());
        } else {
            lines.extend(format_rows(&outcome.data));
        }

        lines.join("\n")
    }
}
