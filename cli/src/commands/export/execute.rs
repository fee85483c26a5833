use std::error::Error;
use std::fs;

use db::{ExportFormat, QueryService};
use serde::Serialize;

use super::ExportCmd;
use crate::commands::Execute;

/// Result of the export command execution
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub database: String,
    pub path: String,
    pub format: ExportFormat,
    pub content_type: String,
    pub rows: usize,
    pub bytes: usize,
}

impl Execute for ExportCmd {
    type Output = ExportResult;

    fn execute(self, service: &QueryService) -> Result<Self::Output, Box<dyn Error>> {
        let file = service.export_query(&self.db, &self.sql, self.file_format.as_deref())?;

        let path = self.out.unwrap_or_else(|| file.file_name().into());
        fs::write(&path, &file.bytes)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        tracing::info!(path = %path.display(), bytes = file.bytes.len(), "export written");

        Ok(ExportResult {
            database: self.db,
            path: path.display().to_string(),
            format: file.format,
            content_type: file.content_type().to_string(),
            rows: file.row_count,
            bytes: file.bytes.len(),
        })
    }
}
