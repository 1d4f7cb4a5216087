//! Argument model, scanner and classifier for documentation generation.
//!
//! This crate turns annotated argument containers into a flat, classified
//! list of command-line arguments:
//!
//! - [`SourceModel`]: serde descriptor table of classes, fields, markers and
//!   doc comments, indexed by [`ClassRegistry`].
//! - [`FieldIntrospector`], [`DocCommentProvider`], [`PluginDescriptor`]:
//!   the capabilities the scanner and renderers consume.
//! - [`ArgumentScanner`]: walks a container (argument collections, plugin
//!   descriptors, default plugin instances) into [`ArgumentDefinition`]s.
//! - [`classify`] / [`classify_all`]: bucket definitions into
//!   [`ArgumentCategory`]s, sorted with [`sort_by_display_name`].
//! - [`resolve_options`]: legal values of enumeration-typed arguments.
//!
//! Model validation ([`validate_model`]) catches duplicate classes,
//! inheritance cycles and malformed names before scanning.
//!
//! # Example
//!
//! ```
//! use argdoc_core::*;
//!
//! let model = SourceModel::from_yaml_str(r#"
//! classes:
//!   - name: example.PrintReads
//!     fields:
//!       - name: input
//!         type: File
//!         argument: { full_name: input, short_name: I, doc: Reads to print }
//!       - name: threads
//!         type: int
//!         value: 1
//!         argument: { full_name: threads, common: true }
//! "#).unwrap();
//! assert!(validate_model(&model).is_empty());
//!
//! let registry = ClassRegistry::new(model);
//! let scan = ArgumentScanner::new(&registry)
//!     .scan_class("example.PrintReads", &[])
//!     .unwrap();
//! let classified = classify_all(scan, VisibilityPolicy::default(), classify).unwrap();
//!
//! assert_eq!(classified.group(ArgumentCategory::Required)[0].display_name(), "--input");
//! assert_eq!(classified.group(ArgumentCategory::Common)[0].default_value, "1");
//! ```

mod classify;
mod error;
mod introspect;
mod model;
mod options;
mod scan;
mod signature;
mod types;
mod validate;

pub use classify::{
    ArgumentCategory, ClassifiedArguments, VisibilityPolicy, classify, classify_all,
    sort_by_display_name, sort_key,
};
pub use error::{LoadError, ScanError, SortError};
pub use introspect::{
    ClassRegistry, Decl, DocCommentProvider, FieldIntrospector, PluginDescriptor, TaggedField,
};
pub use model::{
    ArgumentTag, ClassDescriptor, CollectionTag, Deprecation, DocComment, EnumConstantDescriptor,
    FeatureTag, FieldDescriptor, FieldTag, FieldValue, PluginDescriptorModel, PositionalTag,
    ProgramGroup, ProgramTag, SourceModel, WorkflowResource, simple_name,
};
pub use options::{resolve_options, resolve_type_options};
pub use scan::{ArgumentScanner, ScanResult};
pub use signature::TypeSignature;
pub use types::{
    ArgumentDefinition, ArgumentOrigin, CollectionKind, EnumConstant, EnumOption, EnumType,
    FieldKey, Instance, NumericBounds, POSITIONAL_ARGUMENT_NAME, PluginOwner,
    PositionalArgumentDefinition, ScalarKind, TypeDescriptor, Value,
};
pub use validate::{ModelError, validate_model};
