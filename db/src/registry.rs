//! Connection registry: named database lookup over a lazily loaded config file.
//!
//! The registry reads its configuration on first use and keeps it for the life of
//! the value. A mutex serializes the first load so concurrent callers parse the
//! file once; after that, lookups go through the `OnceLock` without locking.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use thiserror::Error;

use crate::config::{ConnectionsFile, DatabaseConfig, DatabaseSummary};

/// File preferred when present.
pub const LOCAL_CONFIG_FILE: &str = "connections.local.json";
/// File used when no local override exists.
pub const DEFAULT_CONFIG_FILE: &str = "connections.json";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to load connections configuration from '{path}': {message}")]
    ConfigLoad { path: String, message: String },

    #[error("Failed to load connections configuration: no config file found (searched: {searched})")]
    NoConfigFile { searched: String },

    #[error("Failed to load connections configuration: duplicate database name '{0}'")]
    DuplicateName(String),

    #[error("Database '{0}' not found in configuration")]
    NotFound(String),
}

/// Named database configurations, loaded at most once.
pub struct ConnectionRegistry {
    /// Candidate files in order of preference; the first that exists is used.
    sources: Vec<PathBuf>,
    databases: OnceLock<Vec<DatabaseConfig>>,
    load_guard: Mutex<()>,
    #[cfg(test)]
    reads: AtomicUsize,
}

impl ConnectionRegistry {
    /// Registry reading `connections.local.json`, falling back to
    /// `connections.json`, both inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::with_sources(vec![dir.join(LOCAL_CONFIG_FILE), dir.join(DEFAULT_CONFIG_FILE)])
    }

    /// Registry reading exactly one file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::with_sources(vec![path.into()])
    }

    /// Registry with an explicit preference list of files.
    pub fn with_sources(sources: Vec<PathBuf>) -> Self {
        Self {
            sources,
            databases: OnceLock::new(),
            load_guard: Mutex::new(()),
            #[cfg(test)]
            reads: AtomicUsize::new(0),
        }
    }

    /// Registry that is already populated. Never touches the filesystem.
    pub fn from_configs(configs: Vec<DatabaseConfig>) -> Result<Self, RegistryError> {
        check_unique_names(&configs)?;
        let registry = Self::with_sources(Vec::new());
        // Freshly created lock: the set cannot fail.
        let _ = registry.databases.set(configs);
        Ok(registry)
    }

    /// List configured databases without credentials.
    pub fn list_databases(&self) -> Result<Vec<DatabaseSummary>, RegistryError> {
        Ok(self.databases()?.iter().map(DatabaseConfig::summary).collect())
    }

    /// Look up a database by name.
    pub fn resolve(&self, name: &str) -> Result<&DatabaseConfig, RegistryError> {
        self.databases()?
            .iter()
            .find(|db| db.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Whether the configuration has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.databases.get().is_some()
    }

    fn databases(&self) -> Result<&[DatabaseConfig], RegistryError> {
        if let Some(databases) = self.databases.get() {
            return Ok(databases.as_slice());
        }

        // A poisoned guard only means another loader panicked; the cache itself
        // is still either empty or fully set.
        let _guard = self
            .load_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(databases) = self.databases.get() {
            return Ok(databases.as_slice());
        }

        let loaded = self.load()?;
        Ok(self.databases.get_or_init(|| loaded).as_slice())
    }

    fn load(&self) -> Result<Vec<DatabaseConfig>, RegistryError> {
        let path = self
            .sources
            .iter()
            .find(|candidate| candidate.exists())
            .ok_or_else(|| RegistryError::NoConfigFile {
                searched: self
                    .sources
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        tracing::debug!(path = %path.display(), "loading connections configuration");
        #[cfg(test)]
        self.reads.fetch_add(1, Ordering::SeqCst);

        let content = fs::read_to_string(path).map_err(|e| RegistryError::ConfigLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let file: ConnectionsFile =
            serde_json::from_str(&content).map_err(|e| RegistryError::ConfigLoad {
                path: path.display().to_string(),
                message: format!("invalid JSON: {}", e),
            })?;

        check_unique_names(&file.databases)?;

        tracing::debug!(count = file.databases.len(), "connections configuration loaded");
        Ok(file.databases)
    }
}

fn check_unique_names(configs: &[DatabaseConfig]) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for db in configs {
        if !seen.insert(db.name.as_str()) {
            return Err(RegistryError::DuplicateName(db.name.clone()));
        }
    }
    Ok(())
}
