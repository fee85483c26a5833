//! Read-only SQL gateway: named databases, a lexical gatekeeper, four engine
//! adapters behind one lifecycle, and CSV/XLSX export.

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod export;
pub mod gatekeeper;
pub mod registry;
pub mod service;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used items
pub use backend::{DbError, Engine, EngineAdapter, QueryEngine};
pub use config::{DatabaseConfig, DatabaseSummary, EngineKind};
pub use dispatch::Dispatcher;
pub use export::{ExportError, ExportFormat};
pub use gatekeeper::{validate, ValidatedQuery, ValidationError};
pub use registry::{ConnectionRegistry, RegistryError};
pub use service::{ExportFile, QueryService, ServiceError};
pub use types::{ExecutionOutcome, Row, TabularResult, Value};
