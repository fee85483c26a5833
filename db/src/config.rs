//! Connection configuration file handling.
//!
//! This module provides parsing of the `connections.json` file shape. A file holds
//! a list of named databases, each tagged with a `type` string that selects the
//! engine used to reach it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsFile {
    pub databases: Vec<DatabaseConfig>,
}

/// Database engines that have an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    MySql,
    Sqlite,
    Postgres,
    SqlServer,
}

impl EngineKind {
    /// Map a configured `type` string onto an engine.
    ///
    /// Returns `None` for types without an adapter; those databases stay listed
    /// and fail at execution time instead.
    pub fn from_type(db_type: &str) -> Option<Self> {
        match db_type {
            "mysql" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            "postgres" => Some(Self::Postgres),
            "mssql" | "sqlserver" => Some(Self::SqlServer),
            _ => None,
        }
    }

    /// Port used when neither `port` nor a `host,port` suffix provides one.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::MySql => Some(3306),
            Self::Postgres => Some(5432),
            Self::SqlServer => Some(1433),
            Self::Sqlite => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::SqlServer => "mssql",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Connection parameters for one named database.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub db_type: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Database name, or the file path for SQLite.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// SQL Server only: require TLS for the whole session.
    #[serde(default)]
    pub encrypt: Option<bool>,
    /// SQL Server only: accept any server certificate. Defaults to true.
    #[serde(default)]
    pub trust_server_certificate: Option<bool>,
}

impl DatabaseConfig {
    pub fn engine_kind(&self) -> Option<EngineKind> {
        EngineKind::from_type(&self.db_type)
    }

    /// Resolve the host and port to connect to.
    ///
    /// A host written as `"host,port"` overrides the configured port when the
    /// suffix is a non-zero integer; otherwise the suffix is ignored.
    pub fn endpoint(&self) -> (String, Option<u16>) {
        let configured_port = self
            .port
            .filter(|p| *p != 0)
            .or_else(|| self.engine_kind().and_then(|kind| kind.default_port()));
        let host = self.host.as_deref().unwrap_or("localhost");

        match host.split_once(',') {
            Some((host_part, port_part)) => {
                let port = port_part
                    .trim()
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .or(configured_port);
                (host_part.trim().to_string(), port)
            }
            None => (host.to_string(), configured_port),
        }
    }

    pub fn database_name(&self) -> &str {
        self.database.as_deref().unwrap_or_default()
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }

    pub fn encrypt(&self) -> bool {
        self.encrypt.unwrap_or(false)
    }

    pub fn trust_server_certificate(&self) -> bool {
        self.trust_server_certificate.unwrap_or(true)
    }

    pub fn summary(&self) -> DatabaseSummary {
        DatabaseSummary {
            name: self.name.clone(),
            db_type: self.db_type.clone(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("name", &self.name)
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .finish()
    }
}

/// Public view of a configured database. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub db_type: String,
}
