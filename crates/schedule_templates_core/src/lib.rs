//! Spreadsheet template repository for schedule exports.
//! This crate is the single source of truth for template invariants.

pub mod codec;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;

pub use codec::{CodecError, SPREADSHEET_CONTENT_TYPE};
pub use config::{ConfigError, TemplateConfig};
pub use export::{
    ExportError, ExportResolver, ExportResult, HttpTemplateFetcher, TemplateFetcher, TemplateFile,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::template::{Template, TemplateId, TemplateSource, TemplateValidationError};
pub use registry::{built_in_templates, first_built_in_id};
pub use service::template_service::{ServiceError, ServiceResult, TemplateService};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
