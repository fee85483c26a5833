//! Execute tests for query command.

#[cfg(test)]
mod tests {
    use super::super::QueryCmd;
    use db::Value;
    use rstest::{fixture, rstest};

    crate::people_fixture! {
        fixture_name: people,
    }

    // =========================================================================
    // Core functionality tests
    // =========================================================================

    crate::execute_test! {
        test_name: test_query_returns_rows_with_cap,
        fixture: people,
        cmd: QueryCmd {
            db: "people".to_string(),
            sql: "SELECT id, name FROM people ORDER BY id".to_string(),
        },
        assertions: |result| {
            assert_eq!(result.database, "people");
            assert!(result.outcome.success);
            assert_eq!(result.outcome.row_count, Some(3));
            assert_eq!(result.outcome.data[2]["name"], Value::from("Edsger \"EWD\" Dijkstra"));
            assert!(result.outcome.limit_added);
        },
    }

    crate::execute_test! {
        test_name: test_query_with_limit_not_rewritten,
        fixture: people,
        cmd: QueryCmd {
            db: "people".to_string(),
            sql: "SELECT email FROM people ORDER BY id LIMIT 2".to_string(),
        },
        assertions: |result| {
            assert_eq!(result.outcome.data.len(), 2);
            assert!(result.outcome.data[1]["email"].is_null());
            assert!(!result.outcome.limit_added);
            assert!(result.outcome.executed_statement.is_none());
        },
    }

    crate::execute_test! {
        test_name: test_query_cte_accepted,
        fixture: people,
        cmd: QueryCmd {
            db: "people".to_string(),
            sql: "WITH top_scores AS (SELECT name, score FROM people WHERE score > 8) SELECT name FROM top_scores".to_string(),
        },
        assertions: |result| {
            assert_eq!(result.outcome.data.len(), 1);
            assert_eq!(result.outcome.data[0]["name"], Value::from("Ada"));
        },
    }

    // Execution failures come back as an unsuccessful result, not an error
    crate::execute_test! {
        test_name: test_query_engine_error_in_result,
        fixture: people,
        cmd: QueryCmd {
            db: "people".to_string(),
            sql: "SELECT nonexistent FROM people".to_string(),
        },
        assertions: |result| {
            assert!(!result.outcome.success);
            assert!(result.outcome.data.is_empty());
            assert!(result.outcome.error.unwrap().contains("nonexistent"));
        },
    }

    crate::execute_test! {
        test_name: test_query_unknown_database_in_result,
        fixture: people,
        cmd: QueryCmd {
            db: "ghost".to_string(),
            sql: "SELECT 1".to_string(),
        },
        assertions: |result| {
            assert!(!result.outcome.success);
            assert_eq!(
                result.outcome.error.as_deref(),
                Some("Database 'ghost' not found in configuration")
            );
        },
    }

    // =========================================================================
    // Rejected before execution
    // =========================================================================

    crate::execute_error_test! {
        test_name: test_query_rejects_delete,
        fixture: people,
        cmd: QueryCmd {
            db: "people".to_string(),
            sql: "DELETE FROM people".to_string(),
        },
        error_contains: "Only SELECT queries and CTEs (WITH clauses) are allowed",
    }

    crate::execute_error_test! {
        test_name: test_query_rejects_stacked_statements,
        fixture: people,
        cmd: QueryCmd {
            db: "people".to_string(),
            sql: "SELECT 1; SELECT 2".to_string(),
        },
        error_contains: "Multiple statements are not allowed",
    }

    crate::execute_error_test! {
        test_name: test_query_rejects_keyword_in_literal,
        fixture: people,
        cmd: QueryCmd {
            db: "people".to_string(),
            sql: "SELECT * FROM people WHERE name = 'drop'".to_string(),
        },
        error_contains: "DROP operations are not allowed",
    }

    crate::execute_error_test! {
        test_name: test_query_requires_sql,
        fixture: people,
        cmd: QueryCmd {
            db: "people".to_string(),
            sql: String::new(),
        },
        error_contains: "Database name and SQL query are required",
    }

    #[rstest]
    fn test_query_through_explicit_config_file(people: db::test_utils::PeopleDb) {
        use clap::Parser;

        let config = people.config_file();
        let args = crate::cli::Args::try_parse_from([
            "sqlgate",
            "--config",
            config.to_str().unwrap(),
            "-o",
            "json",
            "query",
            "-d",
            "people",
            "-s",
            "SELECT name FROM people WHERE id = 1",
        ])
        .unwrap();

        let service = args.service();
        let output = args.command.run(&service, args.format).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][0]["name"], "Ada");
    }
}
