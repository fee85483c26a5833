//! Output formatting for export command results.

use super::execute::ExportResult;
use crate::output::Outputable;

impl Outputable for ExportResult {
    fn to_table(&self) -> String {
        let noun = if self.rows == 1 { "row" } else { "rows" };
        [
            format!(
                "Exported {} {} from '{}' to {}",
                self.rows, noun, self.database, self.path
            ),
            format!(
                "Format: {} ({}), {} bytes",
                self.format, self.content_type, self.bytes
            ),
        ]
        .join("\n")
    }
}
