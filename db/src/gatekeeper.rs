//! Lexical gatekeeper for submitted SQL.
//!
//! Admits a single `SELECT`/`WITH` statement and injects a row cap when the
//! statement has no bounding clause. The checks are purely lexical: keywords are
//! matched on ASCII word boundaries anywhere in the text, including inside string
//! literals and comments, so a literal such as `'DROP'` is rejected. There is no
//! parser behind this and no attempt to reason about what the statement does.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::config::EngineKind;

/// Rows allowed when the statement carries no bounding clause of its own.
pub const DEFAULT_ROW_CAP: u32 = 100;

/// Checked in this order; the first match is reported.
pub const FORBIDDEN_KEYWORDS: &[&str] = &[
    "DELETE", "UPDATE", "INSERT", "DROP", "CREATE", "ALTER", "TRUNCATE", "REPLACE", "MERGE",
    "CALL", "EXEC", "EXECUTE", "GRANT", "REVOKE",
];

/// Tokens that mark a statement as already bounded.
const BOUNDING_TOKENS: &[&str] = &[" LIMIT ", " TOP ", " FETCH "];

static KEYWORD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FORBIDDEN_KEYWORDS
        .iter()
        .map(|kw| {
            let pattern = format!(r"(?i-u)\b{}\b", kw);
            let re = Regex::new(&pattern).expect("keyword patterns are valid regexes");
            (*kw, re)
        })
        .collect()
});

static LEADING_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SELECT\s+").expect("leading SELECT pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("SQL query is required and must be a string")]
    InvalidInput,

    #[error("Only SELECT queries and CTEs (WITH clauses) are allowed")]
    ForbiddenStatementKind,

    #[error("{0} operations are not allowed. Only SELECT queries are permitted.")]
    ForbiddenKeyword(&'static str),

    #[error("Multiple statements are not allowed. Only single SELECT queries are permitted.")]
    MultipleStatements,
}

/// A statement that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    /// The statement as submitted.
    pub original: String,
    /// The statement to run, possibly with a row cap injected.
    pub executed: String,
}

impl ValidatedQuery {
    /// True when the executed statement differs from the submitted one.
    pub fn limit_added(&self) -> bool {
        self.original != self.executed
    }
}

/// Validate `sql` and rewrite it with a row cap in the dialect of `engine`.
pub fn validate(sql: &str, engine: EngineKind) -> Result<ValidatedQuery, ValidationError> {
    if sql.is_empty() {
        return Err(ValidationError::InvalidInput);
    }

    let normalized = sql.trim().to_uppercase();
    if !normalized.starts_with("SELECT") && !normalized.starts_with("WITH") {
        return Err(ValidationError::ForbiddenStatementKind);
    }

    if let Some(keyword) = find_forbidden_keyword(sql) {
        return Err(ValidationError::ForbiddenKeyword(keyword));
    }

    if has_multiple_statements(sql) {
        return Err(ValidationError::MultipleStatements);
    }

    Ok(ValidatedQuery {
        original: sql.to_string(),
        executed: add_default_limit(sql, engine),
    })
}

/// First forbidden keyword (in list order) present as a whole word.
pub fn find_forbidden_keyword(sql: &str) -> Option<&'static str> {
    KEYWORD_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(sql))
        .map(|(kw, _)| *kw)
}

fn has_multiple_statements(sql: &str) -> bool {
    sql.contains(';')
        && sql
            .trim()
            .split(';')
            .filter(|segment| !segment.trim().is_empty())
            .count()
            > 1
}

/// Inject a row cap unless the statement already has a bounding clause.
pub fn add_default_limit(sql: &str, engine: EngineKind) -> String {
    let upper = sql.to_uppercase();
    if BOUNDING_TOKENS.iter().any(|token| upper.contains(token)) {
        return sql.to_string();
    }

    let trimmed = sql.trim();
    match engine {
        EngineKind::SqlServer => LEADING_SELECT
            .replace(trimmed, format!("SELECT TOP {} ", DEFAULT_ROW_CAP).as_str())
            .into_owned(),
        _ => match trimmed.strip_suffix(';') {
            Some(body) => format!("{} LIMIT {};", body, DEFAULT_ROW_CAP),
            None => format!("{} LIMIT {}", trimmed, DEFAULT_ROW_CAP),
        },
    }
}
