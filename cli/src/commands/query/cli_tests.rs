//! CLI parsing tests for query command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_option_test! {
        command: "query",
        variant: Query,
        test_name: test_with_db_and_sql,
        args: ["--db", "orders", "--sql", "SELECT * FROM customers"],
        field: sql,
        expected: "SELECT * FROM customers",
    }

    crate::cli_option_test! {
        command: "query",
        variant: Query,
        test_name: test_short_flags,
        args: ["-d", "orders", "-s", "SELECT 1"],
        field: db,
        expected: "orders",
    }

    crate::cli_required_arg_test! {
        command: "query",
        test_name: test_requires_db,
        args: ["--sql", "SELECT 1"],
        required_arg: "--db",
    }

    crate::cli_required_arg_test! {
        command: "query",
        test_name: test_requires_sql,
        args: ["--db", "orders"],
        required_arg: "--sql",
    }

    crate::cli_error_test! {
        command: "query",
        test_name: test_rejects_unknown_flag,
        args: ["--db", "orders", "--sql", "SELECT 1", "--limit", "5"],
    }
}
