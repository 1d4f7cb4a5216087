//! Documentation-run configuration.
//!
//! One [`DocConfig`] is built at startup (from YAML, CLI flags, or both) and
//! passed by reference through discovery, property-map building and
//! rendering.
//!
//! # Example YAML
//!
//! ```yaml
//! output_dir: docs/tools
//! output_file_extension: html
//! absolute_version: 4.2.0
//! include_hidden: false
//! show_dependent_arguments: false
//! jobs: 4
//! completion:
//!   caller_script_name: gatk
//!   pre_legal_args: "--help --version"
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use argdoc_core::VisibilityPolicy;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{DocError, Result};

/// Fixed snippets spliced into the generated bash completion script.
///
/// The `pre_*` values are prepended to, and the `post_*` values appended
/// to, the per-tool arrays of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Name of the launcher script the completion is registered for.
    pub caller_script_name: String,
    pub pre_legal_args: String,
    pub pre_arg_val_types: String,
    pub pre_mutex_args: String,
    pub pre_alias_args: String,
    pub pre_arg_min_occurs: String,
    pub pre_arg_max_occurs: String,
    pub post_legal_args: String,
    pub post_arg_val_types: String,
    pub post_mutex_args: String,
    pub post_alias_args: String,
    pub post_arg_min_occurs: String,
    pub post_arg_max_occurs: String,
}

impl CompletionConfig {
    /// Caller script name, or `tool` when none is configured.
    pub fn caller_script(&self) -> &str {
        if self.caller_script_name.trim().is_empty() {
            "tool"
        } else {
            self.caller_script_name.trim()
        }
    }
}

/// Top-level documentation-run configuration.
///
/// # Examples
///
/// ```
/// use argdoc_docgen::DocConfig;
///
/// let config: DocConfig = serde_yaml::from_str("output_dir: out\njobs: 2").unwrap();
/// assert_eq!(config.output_file_extension, "html");
/// assert_eq!(config.absolute_version, "unknown");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    /// Directory all outputs are written to.
    pub output_dir: PathBuf,
    /// Directory of custom templates overriding the embedded ones by name.
    pub settings_dir: Option<PathBuf>,
    /// Render with the embedded templates only.
    pub use_default_templates: bool,
    pub output_file_extension: String,
    pub index_file_extension: String,
    /// Version string stamped into every page.
    pub absolute_version: String,
    /// RFC 3339 timestamp stamped into every page.
    pub build_timestamp: String,
    /// Document hidden work units and hidden arguments.
    pub include_hidden: bool,
    /// Render plugin-controlled arguments in the `dependent` bucket.
    pub show_dependent_arguments: bool,
    /// Prefix selecting inline custom doc tags.
    pub custom_tag_prefix: String,
    /// Worker threads for the per-unit build; `None` lets rayon decide.
    pub jobs: Option<usize>,
    pub completion: CompletionConfig,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("argdoc-output"),
            settings_dir: None,
            use_default_templates: false,
            output_file_extension: "html".to_string(),
            index_file_extension: "html".to_string(),
            absolute_version: "unknown".to_string(),
            build_timestamp: Utc::now().to_rfc3339(),
            include_hidden: false,
            show_dependent_arguments: false,
            custom_tag_prefix: "argdoc".to_string(),
            jobs: None,
            completion: CompletionConfig::default(),
        }
    }
}

impl DocConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Io`] if the file cannot be read, or
    /// [`DocError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Rejects conflicting mode flags and empty extensions.
    pub fn validate(&self) -> Result<()> {
        if self.settings_dir.is_some() && self.use_default_templates {
            return Err(DocError::Config(
                "settings_dir and use_default_templates are mutually exclusive".to_string(),
            ));
        }
        for (key, value) in [
            ("output_file_extension", &self.output_file_extension),
            ("index_file_extension", &self.index_file_extension),
        ] {
            let trimmed = value.trim().trim_start_matches('.');
            if trimmed.is_empty() {
                return Err(DocError::Config(format!("{key} cannot be empty")));
            }
        }
        if self.jobs == Some(0) {
            return Err(DocError::Config("jobs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Argument visibility derived from the hidden/dependent flags.
    pub fn visibility(&self) -> VisibilityPolicy {
        VisibilityPolicy {
            include_hidden: self.include_hidden,
            show_dependent: self.show_dependent_arguments,
        }
    }

    /// Output extension without a leading dot.
    pub fn output_extension(&self) -> &str {
        self.output_file_extension.trim().trim_start_matches('.')
    }

    /// Index extension without a leading dot.
    pub fn index_extension(&self) -> &str {
        self.index_file_extension.trim().trim_start_matches('.')
    }
}
