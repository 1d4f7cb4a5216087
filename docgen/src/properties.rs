//! Canonical property maps (phase 2).
//!
//! [`ArgumentRecord`] is the renderer-independent shape of one argument;
//! [`WorkUnitProperties`] is the frozen map of one work unit. Both serialize
//! to the canonical JSON contract, with every inapplicable value rendered as
//! the [`NA`] sentinel instead of `null`.
//!
//! Maps are assembled with [`PropertyMapBuilder`]: each stage consumes the
//! builder and returns it with one more section filled in.

use std::collections::BTreeMap;

use argdoc_core::{
    ArgumentCategory, ArgumentDefinition, ClassifiedArguments, Decl, DocCommentProvider,
    EnumOption, POSITIONAL_ARGUMENT_NAME, PositionalArgumentDefinition, TypeDescriptor,
    WorkflowResource, resolve_options, resolve_type_options, sort_by_display_name,
};
use serde::Serialize;
use tracing::warn;

use crate::config::DocConfig;
use crate::error::Result;
use crate::work_unit::WorkUnitShell;

/// Sentinel for missing or inapplicable values.
pub const NA: &str = "NA";

/// Key of the union of every rendered category.
pub const ALL_ARGUMENTS: &str = "all";

/// Top-level keys a hook or custom tag may not overwrite.
const RESERVED_KEYS: &[&str] = &[
    "name",
    "filename",
    "group",
    "groupSummary",
    "summary",
    "description",
    "version",
    "timestamp",
    "beta",
    "experimental",
    "deprecated",
    "deprecationDetail",
    "arguments",
    "extradocs",
    "pluginDefaultInstances",
];

/// One rendered argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentRecord {
    pub name: String,
    pub synonyms: String,
    /// `yes` or `no`.
    pub required: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub summary: String,
    pub fulltext: String,
    pub default_value: String,
    pub min_value: String,
    pub max_value: String,
    pub min_rec_value: String,
    pub max_rec_value: String,
    pub min_elements: String,
    pub max_elements: String,
    /// Category the argument was rendered under.
    pub kind: String,
    pub options: Vec<EnumOption>,
    pub attributes: String,
    pub other_argument_required: String,
    pub exclusive_of: String,
    pub collection: bool,
    pub deprecated: bool,
    pub deprecation_detail: Option<String>,
    /// Doclet-specific keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ArgumentRecord {
    /// Adds a doclet-specific key.
    pub fn with_extra(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// What a type hook sees of the argument behind a record.
#[derive(Debug, Clone, Copy)]
pub struct RecordSource<'a> {
    pub declaring_class: &'a str,
    pub field_name: &'a str,
    pub field_type: &'a TypeDescriptor,
    /// Initializer value in structured form.
    pub default_json: &'a serde_json::Value,
    pub workflow: Option<&'a WorkflowResource>,
}

impl RecordSource<'_> {
    /// `Class.field` of the declaration.
    pub fn location(&self) -> String {
        format!("{}.{}", self.declaring_class, self.field_name)
    }
}

/// Cross-reference to another work unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DocReference {
    pub name: String,
    pub filename: String,
}

/// Summary of one default plugin instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PluginInstanceSummary {
    pub name: String,
    pub summary: String,
    /// Page of the plugin class, when it is itself documented.
    pub filename: Option<String>,
}

/// Frozen property map of one work unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkUnitProperties {
    pub name: String,
    pub filename: String,
    pub group: String,
    pub group_summary: String,
    pub summary: String,
    pub description: String,
    pub version: String,
    pub timestamp: String,
    pub beta: bool,
    pub experimental: bool,
    pub deprecated: bool,
    pub deprecation_detail: Option<String>,
    /// Category key (plus `all`) to sorted records.
    pub arguments: BTreeMap<String, Vec<ArgumentRecord>>,
    pub extradocs: Vec<DocReference>,
    pub plugin_default_instances: BTreeMap<String, Vec<PluginInstanceSummary>>,
    /// Custom tags, per-descriptor defaults and doclet-specific keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl WorkUnitProperties {
    /// Adds a top-level key unless it would shadow a fixed key.
    pub fn with_extra(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        if RESERVED_KEYS.contains(&key) {
            warn!(unit = %self.name, key, "Ignoring property that shadows a fixed key");
            return self;
        }
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Records rendered under `key` (a category name or `all`).
    pub fn arguments(&self, key: &str) -> &[ArgumentRecord] {
        self.arguments.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Canonical pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Staged construction of a [`WorkUnitProperties`].
///
/// # Examples
///
/// ```
/// use argdoc_docgen::{DocConfig, PropertyMapBuilder, WorkUnitShell};
///
/// let shell = WorkUnitShell {
///     class_name: "example.PrintReads".into(),
///     name: "PrintReads".into(),
///     filename: "PrintReads.html".into(),
///     group_name: "Read Programs".into(),
///     group_summary: "Tools that process reads".into(),
///     summary: "Print reads".into(),
///     description: String::new(),
///     beta: false,
///     experimental: false,
///     deprecation: None,
/// };
/// let props = PropertyMapBuilder::new(&shell, &DocConfig::default()).build();
/// assert_eq!(props.group, "Read Programs");
/// assert!(props.arguments("all").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PropertyMapBuilder {
    properties: WorkUnitProperties,
}

impl PropertyMapBuilder {
    pub fn new(shell: &WorkUnitShell, config: &DocConfig) -> Self {
        let mut arguments = BTreeMap::new();
        for category in ArgumentCategory::ALL {
            arguments.insert(category.as_str().to_string(), Vec::new());
        }
        arguments.insert(ALL_ARGUMENTS.to_string(), Vec::new());

        Self {
            properties: WorkUnitProperties {
                name: shell.name.clone(),
                filename: shell.filename.clone(),
                group: shell.group_name.clone(),
                group_summary: shell.group_summary.clone(),
                summary: shell.summary.clone(),
                description: shell.description.clone(),
                version: config.absolute_version.clone(),
                timestamp: config.build_timestamp.clone(),
                beta: shell.beta,
                experimental: shell.experimental,
                deprecated: shell.deprecation.is_some(),
                deprecation_detail: shell.deprecation.as_ref().and_then(|d| d.detail.clone()),
                arguments,
                extradocs: Vec::new(),
                plugin_default_instances: BTreeMap::new(),
                extra: BTreeMap::new(),
            },
        }
    }

    /// Fills every category and rebuilds `all` from them.
    pub fn with_arguments(mut self, groups: BTreeMap<ArgumentCategory, Vec<ArgumentRecord>>) -> Result<Self> {
        let mut all = Vec::new();
        for (category, records) in groups {
            all.extend(records.iter().cloned());
            self.properties
                .arguments
                .insert(category.as_str().to_string(), records);
        }
        sort_by_display_name(&mut all, |record: &ArgumentRecord| record.name.clone())?;
        self.properties
            .arguments
            .insert(ALL_ARGUMENTS.to_string(), all);
        Ok(self)
    }

    pub fn with_extradocs(mut self, mut references: Vec<DocReference>) -> Self {
        references.sort();
        references.dedup();
        self.properties.extradocs = references;
        self
    }

    /// Adds the default instances of one plugin descriptor, both under
    /// `pluginDefaultInstances` and as a top-level key of its own.
    pub fn with_plugin_defaults(
        mut self,
        descriptor: &str,
        mut instances: Vec<PluginInstanceSummary>,
    ) -> Result<Self> {
        instances.sort();
        instances.dedup();
        let value = serde_json::to_value(&instances)?;
        self.properties
            .plugin_default_instances
            .insert(descriptor.to_string(), instances);
        self.properties = self.properties.with_extra(descriptor, value);
        Ok(self)
    }

    pub fn with_custom_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        for (key, value) in tags {
            self.properties = self.properties.with_extra(&key, value);
        }
        self
    }

    pub fn build(self) -> WorkUnitProperties {
        self.properties
    }
}

/// Renders one named argument.
///
/// Fields without any documentation are logged, counted in `warnings`, and
/// rendered with an empty summary.
pub fn argument_record(
    def: &ArgumentDefinition,
    category: ArgumentCategory,
    docs: &dyn DocCommentProvider,
    warnings: &mut Vec<String>,
) -> ArgumentRecord {
    let field = Decl::Field {
        class: &def.declaring_class,
        field: &def.field_name,
    };
    let summary = Some(def.doc_string.clone())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| docs.summary(field));
    let summary = summary.unwrap_or_else(|| {
        let message = format!("No documentation for argument {}", def.location());
        warn!("{message}");
        warnings.push(message);
        String::new()
    });
    let fulltext = docs.full_doc(field).unwrap_or_else(|| summary.clone());

    let options = resolve_options(def, docs);
    if options.is_empty() && matches!(def.field_type.value_type(), TypeDescriptor::Enum(_)) {
        let message = format!("Enum argument {} has no documented options", def.location());
        warn!("{message}");
        warnings.push(message);
    }

    let integral = def.field_type.is_integral();
    ArgumentRecord {
        name: def.display_name(),
        synonyms: def.synonym().unwrap_or_else(|| NA.to_string()),
        required: yes_no(!def.is_optional),
        type_name: def.field_type.display_name(),
        summary,
        fulltext,
        default_value: def.default_value.clone(),
        min_value: format_bound(def.bounds.min_value, integral),
        max_value: format_bound(def.bounds.max_value, integral),
        min_rec_value: format_bound(def.bounds.min_recommended, integral),
        max_rec_value: format_bound(def.bounds.max_recommended, integral),
        min_elements: format_count(def.min_elements),
        max_elements: format_count(def.max_elements),
        kind: category.as_str().to_string(),
        options,
        attributes: attributes(def),
        other_argument_required: def
            .workflow
            .as_ref()
            .map(|w| join_or_na(w.required_companions.iter().map(String::as_str)))
            .unwrap_or_else(|| NA.to_string()),
        exclusive_of: join_or_na(def.mutex_targets.iter().map(String::as_str)),
        collection: def.is_collection(),
        deprecated: def.is_deprecated(),
        deprecation_detail: def.deprecation.as_ref().and_then(|d| d.detail.clone()),
        extra: BTreeMap::new(),
    }
}

/// Renders the positional argument group under its pseudo-name.
pub fn positional_record(
    def: &PositionalArgumentDefinition,
    docs: &dyn DocCommentProvider,
) -> ArgumentRecord {
    let field = Decl::Field {
        class: &def.declaring_class,
        field: &def.field_name,
    };
    let summary = Some(def.doc_string.clone())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| docs.summary(field))
        .unwrap_or_default();
    let fulltext = docs.full_doc(field).unwrap_or_else(|| summary.clone());

    ArgumentRecord {
        name: POSITIONAL_ARGUMENT_NAME.to_string(),
        synonyms: NA.to_string(),
        required: yes_no(def.min_elements.is_some_and(|n| n > 0)),
        type_name: def.field_type.display_name(),
        summary,
        fulltext,
        default_value: def.default_value.clone(),
        min_value: NA.to_string(),
        max_value: NA.to_string(),
        min_rec_value: NA.to_string(),
        max_rec_value: NA.to_string(),
        min_elements: format_count(def.min_elements),
        max_elements: format_count(def.max_elements),
        kind: ArgumentCategory::Positional.as_str().to_string(),
        options: resolve_type_options(&def.field_type, docs),
        attributes: NA.to_string(),
        other_argument_required: NA.to_string(),
        exclusive_of: NA.to_string(),
        collection: def.field_type.is_collection(),
        deprecated: false,
        deprecation_detail: None,
        extra: BTreeMap::new(),
    }
}

/// Renders every argument of `classified` and hands each record to `hook`.
pub fn argument_groups(
    classified: &ClassifiedArguments,
    docs: &dyn DocCommentProvider,
    hook: impl Fn(RecordSource<'_>, ArgumentRecord) -> Result<ArgumentRecord>,
    warnings: &mut Vec<String>,
) -> Result<BTreeMap<ArgumentCategory, Vec<ArgumentRecord>>> {
    let mut groups: BTreeMap<ArgumentCategory, Vec<ArgumentRecord>> = BTreeMap::new();
    for (category, def) in classified.named() {
        let record = argument_record(def, category, docs, warnings);
        let source = RecordSource {
            declaring_class: &def.declaring_class,
            field_name: &def.field_name,
            field_type: &def.field_type,
            default_json: &def.default_json,
            workflow: def.workflow.as_ref(),
        };
        groups.entry(category).or_default().push(hook(source, record)?);
    }

    if let Some(positional) = &classified.positional {
        let record = positional_record(positional, docs);
        let source = RecordSource {
            declaring_class: &positional.declaring_class,
            field_name: &positional.field_name,
            field_type: &positional.field_type,
            default_json: &serde_json::Value::Null,
            workflow: None,
        };
        groups
            .entry(ArgumentCategory::Positional)
            .or_default()
            .push(hook(source, record)?);
    }

    Ok(groups)
}

fn yes_no(flag: bool) -> String {
    let answer = if flag { "yes" } else { "no" };
    answer.to_string()
}

fn format_bound(value: Option<f64>, integral: bool) -> String {
    match value {
        None => NA.to_string(),
        Some(v) if integral && v.fract() == 0.0 && v.abs() < 9.0e15 => format!("{}", v as i64),
        Some(v) => format!("{v:?}"),
    }
}

fn format_count(value: Option<usize>) -> String {
    value.map_or_else(|| NA.to_string(), |n| n.to_string())
}

fn attributes(def: &ArgumentDefinition) -> String {
    let flags = [
        ("advanced", def.is_advanced),
        ("common", def.is_common),
        ("deprecated", def.is_deprecated()),
        ("hidden", def.is_hidden),
        ("sensitive", def.is_sensitive),
    ];
    join_or_na(flags.into_iter().filter(|(_, set)| *set).map(|(name, _)| name))
}

fn join_or_na<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() { NA.to_string() } else { joined }
}
