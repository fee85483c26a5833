//! Test fixtures for the SQLite-backed tests.
//!
//! ## Available Fixtures
//!
//! - [`PEOPLE_SCHEMA`] - A `people` table with text, real and NULL cells
//! - [`MIXED_CONNECTIONS`] - A connections file naming one database per engine

/// `people` table seed.
///
/// Contains:
/// - 3 rows ordered by `id`
/// - a name with embedded double quotes (row 3)
/// - a NULL `email` (row 2) and a NULL `score` (row 3)
pub const PEOPLE_SCHEMA: &str = r#"
CREATE TABLE people (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    score REAL
);
INSERT INTO people VALUES (1, 'Ada', 'ada@example.com', 9.5);
INSERT INTO people VALUES (2, 'Grace', NULL, 7.25);
INSERT INTO people VALUES (3, 'Edsger "EWD" Dijkstra', 'ewd@example.com', NULL);
"#;

/// Connections file with one entry per supported engine plus an unsupported one.
///
/// Network entries point at an unused local port so they fail fast.
pub const MIXED_CONNECTIONS: &str = r#"
{
    "databases": [
        {"name": "orders", "type": "mysql", "host": "127.0.0.1", "port": 1,
         "database": "orders", "username": "reader", "password": "s3cret"},
        {"name": "analytics", "type": "postgres", "host": "127.0.0.1,1",
         "database": "analytics", "username": "reader", "password": "s3cret"},
        {"name": "warehouse", "type": "mssql", "host": "127.0.0.1", "port": 1,
         "database": "dw", "username": "sa", "password": "s3cret", "encrypt": false},
        {"name": "legacy", "type": "oracle", "host": "127.0.0.1"}
    ]
}
"#;
