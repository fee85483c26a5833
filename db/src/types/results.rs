use indexmap::IndexMap;
use serde::Serialize;

use super::Value;

/// One result row: column name to cell, in driver column order.
pub type Row = IndexMap<String, Value>;

/// Rows returned by a single statement.
///
/// Either every row of the statement is present or the result does not exist;
/// adapters never hand out a partially fetched set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularResult {
    pub rows: Vec<Row>,
}

impl TabularResult {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names, taken from the keys of the first row.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Outcome of executing one statement through the dispatcher.
///
/// Failures are carried in `error` with `success == false`; callers branch on
/// `success` rather than on a Rust error. The rewrite fields are only present
/// when the gatekeeper injected a row limit.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub success: bool,
    pub data: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub limit_added: bool,
    #[serde(rename = "originalSql", skip_serializing_if = "Option::is_none")]
    pub original_statement: Option<String>,
    #[serde(rename = "executedSql", skip_serializing_if = "Option::is_none")]
    pub executed_statement: Option<String>,
}

impl ExecutionOutcome {
    pub fn succeeded(result: TabularResult) -> Self {
        let row_count = result.row_count();
        Self {
            success: true,
            data: result.rows,
            row_count: Some(row_count),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Record that `executed` was run in place of `original`.
    pub fn with_rewrite(mut self, original: &str, executed: &str) -> Self {
        self.limit_added = true;
        self.original_statement = Some(original.to_string());
        self.executed_statement = Some(executed.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_row() -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Int(1));
        row.insert("name".to_string(), Value::Text("alice".into()));
        row
    }

    #[rstest]
    fn test_columns_follow_first_row() {
        let result = TabularResult::new(vec![sample_row()]);
        assert_eq!(result.columns(), vec!["id", "name"]);
        assert_eq!(result.row_count(), 1);
    }

    #[rstest]
    fn test_empty_result_has_no_columns() {
        assert!(TabularResult::default().columns().is_empty());
    }

    #[rstest]
    fn test_success_outcome_json() {
        let outcome = ExecutionOutcome::succeeded(TabularResult::new(vec![sample_row()]));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["rowCount"], 1);
        assert_eq!(json["data"][0]["name"], "alice");
        assert!(json.get("error").is_none());
        assert!(json.get("limitAdded").is_none());
        assert!(json.get("originalSql").is_none());
    }

    #[rstest]
    fn test_failed_outcome_has_empty_data() {
        let outcome = ExecutionOutcome::failed("boom");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[rstest]
    fn test_rewrite_annotation() {
        let outcome = ExecutionOutcome::succeeded(TabularResult::default())
            .with_rewrite("SELECT 1", "SELECT 1 LIMIT 100");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["limitAdded"], true);
        assert_eq!(json["originalSql"], "SELECT 1");
        assert_eq!(json["executedSql"], "SELECT 1 LIMIT 100");
    }
}
