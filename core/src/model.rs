//! Source model: the descriptor table describing a documented code base.
//!
//! Rust has no runtime reflection over annotated fields, so argument
//! containers are described by a serde document instead. An external
//! extractor emits one [`SourceModel`] per code base; everything downstream
//! reads it through the [`FieldIntrospector`](crate::FieldIntrospector) and
//! [`DocCommentProvider`](crate::DocCommentProvider) capabilities.
//!
//! # Example YAML
//!
//! ```yaml
//! program_groups:
//!   - name: Read Programs
//!     summary: Tools that process reads
//! classes:
//!   - name: example.PrintReads
//!     feature: { group_name: Read Programs, summary: Prints reads }
//!     fields:
//!       - name: input
//!         type: List<File>
//!         value: []
//!         argument: { full_name: input, short_name: I, doc: Input files }
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

fn default_true() -> bool {
    true
}

/// Complete descriptor table for one documented code base.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceModel {
    /// Program groups referenced by `program.program_group`.
    #[serde(default)]
    pub program_groups: Vec<ProgramGroup>,
    /// Plugin descriptors referenced by `ClassDescriptor::plugin_descriptors`.
    #[serde(default)]
    pub plugin_descriptors: Vec<PluginDescriptorModel>,
    /// Every class reachable from a documented work unit.
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
}

impl SourceModel {
    /// Loads a model from disk.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let model = if is_json {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(model)
    }

    /// Parses a model from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a model from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A named program group and its summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramGroup {
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// A plugin descriptor: a pluggable argument set selected at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptorModel {
    /// Identifier referenced from `ClassDescriptor::plugin_descriptors`.
    pub name: String,
    /// Display name used as the property-map key for default instances.
    pub display_name: String,
    /// Class of the descriptor itself; its arguments are the control arguments.
    pub class: String,
    /// All plugin classes this descriptor can instantiate.
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Plugin classes selected when the user specifies nothing.
    #[serde(default)]
    pub default_instances: Vec<String>,
}

/// Prose documentation attached to a declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocComment {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub full: Option<String>,
    /// Inline custom tags, keyed by full tag name (e.g. `argdoc.note`).
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Deprecation marker with optional detail text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Marks a class as a documented feature (a work unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTag {
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub group_summary: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Classes cross-referenced from this feature's page.
    #[serde(default)]
    pub extra_docs: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Command-line program properties of a tool class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramTag {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub one_line_summary: Option<String>,
    #[serde(default)]
    pub program_group: Option<String>,
}

/// One declared constant of an enumeration class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumConstantDescriptor {
    pub name: String,
    /// Help text returned by a self-documenting enumeration.
    #[serde(default)]
    pub help_doc: Option<String>,
    #[serde(default)]
    pub doc: Option<DocComment>,
}

/// Descriptor of one class: its fields, annotations and documentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Fully-qualified, `.`-separated class name.
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    /// Whether the class can be built from its field initializers alone.
    #[serde(default = "default_true")]
    pub default_constructor: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub beta: bool,
    #[serde(default)]
    pub experimental: bool,
    #[serde(default)]
    pub deprecated: Option<Deprecation>,
    #[serde(default)]
    pub doc: Option<DocComment>,
    #[serde(default)]
    pub feature: Option<FeatureTag>,
    #[serde(default)]
    pub program: Option<ProgramTag>,
    /// Names of plugin descriptors this tool consumes.
    #[serde(default)]
    pub plugin_descriptors: Vec<String>,
    /// Workflow runtime properties (memory, cpu, ...).
    #[serde(default)]
    pub workflow: Option<BTreeMap<String, String>>,
    /// Present when the class is an enumeration.
    #[serde(default)]
    pub enum_constants: Option<Vec<EnumConstantDescriptor>>,
    #[serde(default)]
    pub self_documenting: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl ClassDescriptor {
    /// Creates an empty class descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            default_constructor: true,
            hidden: false,
            beta: false,
            experimental: false,
            deprecated: None,
            doc: None,
            feature: None,
            program: None,
            plugin_descriptors: Vec::new(),
            workflow: None,
            enum_constants: None,
            self_documenting: false,
            fields: Vec::new(),
        }
    }

    /// Adds a field.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the simple (unqualified) class name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Returns `true` for enumeration classes.
    pub fn is_enum(&self) -> bool {
        self.enum_constants.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Returns the part of a `.`-separated name after the last dot.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Descriptor of one declared field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Type signature, e.g. `int`, `List<Mode>`, `File[]`.
    #[serde(rename = "type")]
    pub signature: String,
    /// Field initializer.
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default)]
    pub doc: Option<DocComment>,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deprecated: Option<Deprecation>,
    #[serde(default)]
    pub argument: Option<ArgumentTag>,
    #[serde(default)]
    pub argument_collection: Option<CollectionTag>,
    #[serde(default)]
    pub positional: Option<PositionalTag>,
    #[serde(default)]
    pub workflow_resource: Option<WorkflowResource>,
}

/// Borrowed view of the single argument tag carried by a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldTag<'a> {
    Argument(&'a ArgumentTag),
    Collection(&'a CollectionTag),
    Positional(&'a PositionalTag),
}

impl FieldDescriptor {
    /// Creates an untagged field with a null initializer.
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            value: FieldValue::Null,
            doc: None,
            advanced: false,
            hidden: false,
            deprecated: None,
            argument: None,
            argument_collection: None,
            positional: None,
            workflow_resource: None,
        }
    }

    /// Tags the field as a named argument.
    pub fn argument(mut self, tag: ArgumentTag) -> Self {
        self.argument = Some(tag);
        self
    }

    /// Tags the field as an argument collection.
    pub fn collection(mut self) -> Self {
        self.argument_collection = Some(CollectionTag::default());
        self
    }

    /// Tags the field as the positional-arguments holder.
    pub fn positional(mut self, tag: PositionalTag) -> Self {
        self.positional = Some(tag);
        self
    }

    /// Sets the initializer.
    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.value = value;
        self
    }

    /// Number of argument tags present; more than one is a model error.
    pub fn tag_count(&self) -> usize {
        usize::from(self.argument.is_some())
            + usize::from(self.argument_collection.is_some())
            + usize::from(self.positional.is_some())
    }

    /// Returns the argument tag, if the field carries exactly one.
    pub fn tag(&self) -> Option<FieldTag<'_>> {
        if self.tag_count() != 1 {
            return None;
        }
        self.argument
            .as_ref()
            .map(FieldTag::Argument)
            .or_else(|| self.argument_collection.as_ref().map(FieldTag::Collection))
            .or_else(|| self.positional.as_ref().map(FieldTag::Positional))
    }
}

/// Named-argument annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgumentTag {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub common: bool,
    #[serde(default)]
    pub sensitive: bool,
    /// Names of arguments this one cannot be combined with.
    #[serde(default)]
    pub mutex: Vec<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub min_recommended_value: Option<f64>,
    #[serde(default)]
    pub max_recommended_value: Option<f64>,
    #[serde(default)]
    pub min_elements: Option<usize>,
    #[serde(default)]
    pub max_elements: Option<usize>,
}

impl ArgumentTag {
    /// Creates a tag with a long name.
    pub fn long(name: &str) -> Self {
        Self {
            full_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Sets the short name.
    pub fn with_short(mut self, name: &str) -> Self {
        self.short_name = Some(name.to_string());
        self
    }

    /// Sets the doc string.
    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    /// Marks the argument optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Argument-collection annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionTag {
    #[serde(default)]
    pub doc: Option<String>,
}

/// Positional-arguments annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionalTag {
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub min_elements: Option<usize>,
    #[serde(default)]
    pub max_elements: Option<usize>,
}

/// Workflow input/output marker used by workflow-language doclets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResource {
    #[serde(default)]
    pub input: bool,
    #[serde(default)]
    pub output: bool,
    #[serde(default)]
    pub required_companions: Vec<String>,
    #[serde(default)]
    pub optional_companions: Vec<String>,
}

impl WorkflowResource {
    /// An output that is never read as an input.
    pub fn is_output_only(&self) -> bool {
        self.output && !self.input
    }
}

/// Field initializer as written in the model.
///
/// `{ new: Class }` instantiates `Class` from its own initializers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<FieldValue>),
    New { new: String },
}
