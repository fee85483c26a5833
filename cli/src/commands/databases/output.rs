//! Output formatting for databases command results.

use super::execute::DatabasesResult;
use crate::output::Outputable;

impl Outputable for DatabasesResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        if self.databases.is_empty() {
            lines.push("No databases configured.".to_string());
            return lines.join("\n");
        }

        lines.push(format!("Databases ({}):", self.databases.len()));
        let width = self
            .databases
            .iter()
            .map(|db| db.name.chars().count())
            .max()
            .unwrap_or_default();
        for db in &self.databases {
            lines.push(format!("  {:<width$}  {}", db.name, db.db_type, width = width));
        }

        lines.join("\n")
    }
}
