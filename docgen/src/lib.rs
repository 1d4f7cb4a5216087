//! Documentation generation for scanned argument models.
//!
//! Turns a [`SourceModel`](argdoc_core::SourceModel) into rendered
//! documentation in two phases:
//!
//! 1. [`discover_work_units`] resolves every documented class into a
//!    [`WorkUnitShell`] and fills the [`WorkUnitRegistry`] used for
//!    cross-references.
//! 2. [`build_all`] scans, classifies and freezes each unit into a
//!    [`WorkUnitProperties`] map in parallel; [`generate`] then renders the
//!    maps through a [`Renderer`] and writes the files.
//!
//! What gets documented and how is decided by a [`Doclet`]: `html` help
//! pages with JSON manifests, `wdl` workflow tasks, or a `bash` completion
//! script.
//!
//! # Example
//!
//! ```no_run
//! use argdoc_core::SourceModel;
//! use argdoc_docgen::{DocConfig, Doclet, TeraRenderer, generate};
//!
//! let model = SourceModel::load("model.yaml")?;
//! let config = DocConfig::load("argdoc.yaml")?;
//! let renderer = TeraRenderer::new(&config)?;
//! let report = generate(model, &config, &Doclet::html(), &renderer)?;
//! println!("wrote {} files", report.files.len());
//! # Ok::<(), argdoc_docgen::DocError>(())
//! ```

mod completion;
mod config;
mod error;
mod handler;
mod pipeline;
mod properties;
mod render;
mod wdl;
mod work_unit;

pub use completion::{CompletionArrays, UNBOUNDED_OCCURS, completion_arrays};
pub use config::{CompletionConfig, DocConfig};
pub use error::{DocError, Result};
pub use handler::{
    ClassifyHook, Doclet, DocletKind, Hooks, IncludeHook, IndexOutput, PropertyMapHook,
    ResolveTypeHook, UnitContext, UnitOutput,
};
pub use pipeline::{
    GroupIndex, IndexProperties, RunReport, WorkUnit, build_all, build_work_unit, generate, inspect,
};
pub use properties::{
    ALL_ARGUMENTS, ArgumentRecord, DocReference, NA, PluginInstanceSummary, PropertyMapBuilder,
    RecordSource, WorkUnitProperties, argument_groups, argument_record, positional_record,
};
pub use render::{Renderer, TeraRenderer};
pub use wdl::{WdlMapping, map_wdl_type, wdl_identifier, wdl_type_name};
pub use work_unit::{
    DEFAULT_GROUP_NAME, DEFAULT_GROUP_SUMMARY, DEFAULT_SUMMARY, WorkUnitRegistry, WorkUnitShell,
    discover_work_units,
};
