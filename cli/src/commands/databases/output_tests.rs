//! Output formatting tests for databases command.

#[cfg(test)]
mod tests {
    use super::super::execute::DatabasesResult;
    use db::DatabaseSummary;
    use rstest::{fixture, rstest};

    // =========================================================================
    // Expected outputs
    // =========================================================================

    const EMPTY_TABLE: &str = "No databases configured.";

    const POPULATED_TABLE: &str = "\
Databases (2):
  orders     mysql
  warehouse  mssql";

    // =========================================================================
    // Fixtures
    // =========================================================================

    #[fixture]
    fn empty_result() -> DatabasesResult {
        DatabasesResult { databases: vec![] }
    }

    #[fixture]
    fn populated_result() -> DatabasesResult {
        DatabasesResult {
            databases: vec![
                DatabaseSummary {
                    name: "orders".to_string(),
                    db_type: "mysql".to_string(),
                },
                DatabaseSummary {
                    name: "warehouse".to_string(),
                    db_type: "mssql".to_string(),
                },
            ],
        }
    }

    // =========================================================================
    // Tests
    // =========================================================================

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: DatabasesResult,
        expected: EMPTY_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_populated,
        fixture: populated_result,
        fixture_type: DatabasesResult,
        expected: POPULATED_TABLE,
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: populated_result,
        fixture_type: DatabasesResult,
        assertions: {
            "databases": serde_json::json!([
                {"name": "orders", "type": "mysql"},
                {"name": "warehouse", "type": "mssql"}
            ]),
        },
    }

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: populated_result,
        fixture_type: DatabasesResult,
        contains: ["orders", "warehouse", "mssql"],
    }
}
