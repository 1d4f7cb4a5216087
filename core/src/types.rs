//! Argument-definition model.
//!
//! This module defines the data produced by the scanner and consumed by the
//! classifier, the option resolver and every renderer:
//!
//! - [`TypeDescriptor`]: a closed description of a field's type, built once
//!   while scanning so renderers never inspect types again.
//! - [`ArgumentDefinition`]: one named command-line argument.
//! - [`PositionalArgumentDefinition`]: the positional-argument group.
//! - [`Value`] / [`Instance`]: runtime values of an instantiated container.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Deprecation, WorkflowResource, simple_name};

/// Pseudo-name under which the positional argument group is rendered.
pub const POSITIONAL_ARGUMENT_NAME: &str = "[NA - Positional]";

/// Scalar kinds recognized in type signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    File,
}

impl ScalarKind {
    /// Returns `true` for integral and floating-point kinds.
    pub fn is_numeric(self) -> bool {
        self.is_integral() || matches!(self, Self::Float | Self::Double)
    }

    /// Returns `true` for integral kinds.
    pub fn is_integral(self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
    }

    /// Display name used in rendered `type` fields.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::String => "String",
            Self::File => "File",
        }
    }
}

/// Collection kinds recognized in type signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    List,
    Set,
    Map,
    Array,
}

impl CollectionKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Set => "Set",
            Self::Map => "Map",
            Self::Array => "Array",
        }
    }
}

/// One declared constant of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    /// Help text supplied by a self-documenting enumeration.
    pub help_doc: Option<String>,
}

/// An enumeration type and its constants in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Fully-qualified class name.
    pub name: String,
    pub constants: Vec<EnumConstant>,
    /// Whether constants carry their own help text.
    pub self_documenting: bool,
}

/// Closed description of a field type.
///
/// # Examples
///
/// ```
/// use argdoc_core::{CollectionKind, ScalarKind, TypeDescriptor};
///
/// let ty = TypeDescriptor::Collection {
///     kind: CollectionKind::List,
///     elements: vec![TypeDescriptor::Scalar(ScalarKind::Int)],
/// };
/// assert!(ty.is_collection());
/// assert!(ty.value_type().is_numeric());
/// assert_eq!(ty.display_name(), "List[int]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDescriptor {
    Scalar(ScalarKind),
    Enum(EnumType),
    Collection {
        kind: CollectionKind,
        elements: Vec<TypeDescriptor>,
    },
    /// Any other class, by fully-qualified name.
    Class(String),
}

impl TypeDescriptor {
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }

    /// Element type of a single-parameter collection, otherwise `self`.
    pub fn value_type(&self) -> &TypeDescriptor {
        match self {
            Self::Collection { elements, .. } if elements.len() == 1 => &elements[0],
            _ => self,
        }
    }

    /// Returns `true` if the value type is a numeric scalar.
    pub fn is_numeric(&self) -> bool {
        matches!(self.value_type(), Self::Scalar(kind) if kind.is_numeric())
    }

    /// Returns `true` if the value type is an integral scalar.
    pub fn is_integral(&self) -> bool {
        matches!(self.value_type(), Self::Scalar(kind) if kind.is_integral())
    }

    /// Human-readable type name, e.g. `int`, `List[String]`, `Mode`.
    pub fn display_name(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.display_name().to_string(),
            Self::Enum(e) => simple_name(&e.name).to_string(),
            Self::Class(name) => simple_name(name).to_string(),
            Self::Collection {
                kind: CollectionKind::Array,
                elements,
            } if elements.len() == 1 => format!("{}[]", elements[0].display_name()),
            Self::Collection { kind, elements } => {
                let inner = elements
                    .iter()
                    .map(TypeDescriptor::display_name)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}[{inner}]", kind.display_name())
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Key of one field value inside an [`Instance`]: `(declaring class, field)`.
pub type FieldKey = (String, String);

/// An instantiated container: field values keyed by declaring class and name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instance {
    /// Runtime class of the object.
    pub class: String,
    pub fields: BTreeMap<FieldKey, Value>,
}

impl Instance {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Looks up a field value by declaring class and field name.
    pub fn get(&self, declaring_class: &str, field: &str) -> Option<&Value> {
        self.fields
            .get(&(declaring_class.to_string(), field.to_string()))
    }
}

/// A runtime field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Object(Instance),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for an empty list.
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, Self::List(items) if items.is_empty())
    }

    /// Textual representation used for rendered default values.
    ///
    /// Finite floats always carry a decimal point, including in exponent
    /// form (`1.0e20`).
    ///
    /// # Examples
    ///
    /// ```
    /// use argdoc_core::Value;
    ///
    /// assert_eq!(Value::Null.repr(), "null");
    /// assert_eq!(Value::Float(1.0).repr(), "1.0");
    /// let list = Value::List(vec![Value::Str("a".into()), Value::Int(2)]);
    /// assert_eq!(list.repr(), "[a, 2]");
    /// ```
    pub fn repr(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(x) => float_repr(*x),
            Self::Str(s) => s.clone(),
            Self::List(items) => {
                let inner = items.iter().map(Value::repr).collect::<Vec<_>>().join(", ");
                format!("[{inner}]")
            }
            Self::Object(instance) => simple_name(&instance.class).to_string(),
        }
    }

    /// Structured JSON form of the value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(x) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Self::Object(instance) => {
                serde_json::Value::String(simple_name(&instance.class).to_string())
            }
        }
    }
}

/// Hard and recommended numeric bounds of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericBounds {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_recommended: Option<f64>,
    pub max_recommended: Option<f64>,
}

impl NumericBounds {
    pub fn is_empty(&self) -> bool {
        self.min_value.is_none()
            && self.max_value.is_none()
            && self.min_recommended.is_none()
            && self.max_recommended.is_none()
    }
}

/// Where a definition came from during scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgumentOrigin {
    /// The root container or one of its argument collections.
    Container,
    /// The control arguments of a plugin descriptor (by display name).
    DescriptorControl { descriptor: String },
    /// A field of a selected plugin instance.
    Plugin(PluginOwner),
}

/// Back-reference from a plugin-controlled argument to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOwner {
    /// Display name of the owning plugin descriptor.
    pub descriptor: String,
    /// Class of the plugin instance declaring the argument.
    pub plugin_class: String,
}

/// One named command-line argument.
///
/// Names are stored without leading dashes; at least one of `short_name`
/// and `long_name` is always present.
///
/// # Examples
///
/// ```
/// use argdoc_core::{ArgumentDefinition, ScalarKind, TypeDescriptor};
///
/// let mut arg = ArgumentDefinition::new("Tool", "output", TypeDescriptor::Scalar(ScalarKind::File));
/// arg.long_name = Some("output".into());
/// arg.short_name = Some("O".into());
/// assert_eq!(arg.display_name(), "--output");
/// assert_eq!(arg.synonym().as_deref(), Some("-O"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDefinition {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub field_name: String,
    /// Class that declares the field.
    pub declaring_class: String,
    /// Runtime class of the object the field was read from.
    pub containing_class: String,
    pub doc_string: String,
    pub field_type: TypeDescriptor,
    pub is_optional: bool,
    /// Initializer value rendered as text.
    pub default_value: String,
    /// Initializer value in structured form.
    pub default_json: serde_json::Value,
    pub bounds: NumericBounds,
    pub min_elements: Option<usize>,
    pub max_elements: Option<usize>,
    /// Mutually exclusive arguments. Raw names as declared until the scanner
    /// resolves them to display names (`--other`).
    pub mutex_targets: BTreeSet<String>,
    pub is_hidden: bool,
    pub is_advanced: bool,
    pub is_common: bool,
    pub is_sensitive: bool,
    pub deprecation: Option<Deprecation>,
    pub origin: ArgumentOrigin,
    pub workflow: Option<WorkflowResource>,
}

impl ArgumentDefinition {
    /// Creates an optional definition with no names; callers fill in the rest.
    pub fn new(declaring_class: &str, field_name: &str, field_type: TypeDescriptor) -> Self {
        Self {
            short_name: None,
            long_name: None,
            field_name: field_name.to_string(),
            declaring_class: declaring_class.to_string(),
            containing_class: declaring_class.to_string(),
            doc_string: String::new(),
            field_type,
            is_optional: true,
            default_value: "null".to_string(),
            default_json: serde_json::Value::Null,
            bounds: NumericBounds::default(),
            min_elements: None,
            max_elements: None,
            mutex_targets: BTreeSet::new(),
            is_hidden: false,
            is_advanced: false,
            is_common: false,
            is_sensitive: false,
            deprecation: None,
            origin: ArgumentOrigin::Container,
            workflow: None,
        }
    }

    /// Primary display name: `--long` when a long name exists, else `-short`.
    pub fn display_name(&self) -> String {
        match (&self.long_name, &self.short_name) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => format!("--{}", self.field_name),
        }
    }

    /// Secondary display name: `-short` when both names exist.
    pub fn synonym(&self) -> Option<String> {
        match (&self.long_name, &self.short_name) {
            (Some(_), Some(short)) => Some(format!("-{short}")),
            _ => None,
        }
    }

    /// All names without dashes, long name first.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.long_name
            .as_deref()
            .into_iter()
            .chain(self.short_name.as_deref())
    }

    /// Returns `true` if `name` (without dashes) names this argument.
    pub fn matches(&self, name: &str) -> bool {
        self.aliases().any(|alias| alias == name)
    }

    pub fn is_collection(&self) -> bool {
        self.field_type.is_collection()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation.is_some()
    }

    pub fn is_controlled_by_plugin(&self) -> bool {
        matches!(self.origin, ArgumentOrigin::Plugin(_))
    }

    /// Owning plugin, for plugin-controlled arguments.
    pub fn plugin_owner(&self) -> Option<&PluginOwner> {
        match &self.origin {
            ArgumentOrigin::Plugin(owner) => Some(owner),
            _ => None,
        }
    }

    /// `Class.field` of the declaration, for error messages.
    pub fn location(&self) -> String {
        format!("{}.{}", self.declaring_class, self.field_name)
    }
}

/// The positional-argument group of a work unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionalArgumentDefinition {
    pub field_name: String,
    pub declaring_class: String,
    pub doc_string: String,
    pub field_type: TypeDescriptor,
    pub min_elements: Option<usize>,
    pub max_elements: Option<usize>,
    pub default_value: String,
}

impl PositionalArgumentDefinition {
    pub fn location(&self) -> String {
        format!("{}.{}", self.declaring_class, self.field_name)
    }
}

/// One legal value of an enumeration-typed argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub name: String,
    pub summary: String,
}

fn float_repr(x: f64) -> String {
    let text = format!("{x:?}");
    if !x.is_finite() || text.contains('.') {
        return text;
    }
    match text.split_once('e') {
        Some((mantissa, exponent)) => format!("{mantissa}.0e{exponent}"),
        None => format!("{text}.0"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(long: Option<&str>, short: Option<&str>) -> ArgumentDefinition {
        let mut def =
            ArgumentDefinition::new("example.Tool", "field", TypeDescriptor::Scalar(ScalarKind::Int));
        def.long_name = long.map(String::from);
        def.short_name = short.map(String::from);
        def
    }

    #[test]
    fn test_long_name_is_primary_display_name() {
        let both = arg(Some("foo"), Some("f"));
        assert_eq!(both.display_name(), "--foo");
        assert_eq!(both.synonym().as_deref(), Some("-f"));

        let long_only = arg(Some("foo"), None);
        assert_eq!(long_only.display_name(), "--foo");
        assert_eq!(long_only.synonym(), None);

        let short_only = arg(None, Some("f"));
        assert_eq!(short_only.display_name(), "-f");
        assert_eq!(short_only.synonym(), None);
    }

    #[test]
    fn test_matches_any_alias() {
        let def = arg(Some("input"), Some("I"));
        assert!(def.matches("input"));
        assert!(def.matches("I"));
        assert!(!def.matches("--input"));
    }

    #[test]
    fn test_type_display_names() {
        let map = TypeDescriptor::Collection {
            kind: CollectionKind::Map,
            elements: vec![
                TypeDescriptor::Scalar(ScalarKind::String),
                TypeDescriptor::Scalar(ScalarKind::Int),
            ],
        };
        assert_eq!(map.display_name(), "Map[String, int]");
        assert!(!map.is_numeric());

        let array = TypeDescriptor::Collection {
            kind: CollectionKind::Array,
            elements: vec![TypeDescriptor::Class("htsjdk.Interval".into())],
        };
        assert_eq!(array.display_name(), "Interval[]");
    }

    #[test]
    fn test_value_json_form() {
        let value = Value::List(vec![Value::Int(1), Value::Float(2.5), Value::Null]);
        assert_eq!(value.to_json(), serde_json::json!([1, 2.5, null]));
    }

    #[test]
    fn test_float_repr_keeps_decimal_point() {
        assert_eq!(Value::Float(1e20).repr(), "1.0e20");
        assert_eq!(Value::Float(1e-7).repr(), "1.0e-7");
        assert_eq!(Value::Float(2.5e-7).repr(), "2.5e-7");
        assert_eq!(Value::Float(0.5).repr(), "0.5");
        assert_eq!(Value::Float(3.0).repr(), "3.0");
        assert_eq!(Value::Float(-100.0).repr(), "-100.0");
        assert_eq!(Value::Float(f64::INFINITY).repr(), "inf");
    }
}
