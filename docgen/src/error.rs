//! Error types for documentation generation.
//!
//! Every variant is fatal for the run. Soft problems (missing group names,
//! undocumented fields) are logged and counted instead.

use argdoc_core::{LoadError, ModelError, ScanError, SortError};
use thiserror::Error;

/// Errors that abort a documentation run.
#[derive(Debug, Error)]
pub enum DocError {
    /// Model file could not be read or parsed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The source model failed structural validation.
    #[error("invalid source model: {0}")]
    Model(#[from] ModelError),

    /// Scanning a work unit's argument container failed.
    #[error("work unit {unit}: {source}")]
    Scan {
        unit: String,
        #[source]
        source: ScanError,
    },

    /// An argument display name could not be ordered.
    #[error(transparent)]
    Sort(#[from] SortError),

    /// Conflicting or missing configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No documented work unit has the requested class.
    #[error("unknown work unit: {0}")]
    UnknownWorkUnit(String),

    /// An `extra_docs` reference names a class that is not a documented work unit.
    #[error("work unit {unit} references undocumented class {target}")]
    UnresolvedReference { unit: String, target: String },

    /// A type has no workflow-language equivalent.
    #[error("no WDL type for {type_name} on argument {location}")]
    UnmappedType { location: String, type_name: String },

    /// A template failed to load or render.
    #[error("template error in '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Convenience alias for results with [`DocError`].
pub type Result<T> = std::result::Result<T, DocError>;

impl DocError {
    pub(crate) fn scan(unit: &str, source: ScanError) -> Self {
        Self::Scan {
            unit: unit.to_string(),
            source,
        }
    }

    pub(crate) fn template(template: &str, source: tera::Error) -> Self {
        Self::Template {
            template: template.to_string(),
            source,
        }
    }
}
