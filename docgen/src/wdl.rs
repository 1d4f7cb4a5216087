//! Mapping of argument types onto the Workflow Description Language.
//!
//! The mapper is a pure function of the resolved [`TypeDescriptor`]: it
//! never changes classification or ordering, only the `type` and default
//! value a WDL template sees.

use argdoc_core::{CollectionKind, ScalarKind, TypeDescriptor, WorkflowResource, simple_name};

/// Classes with a fixed WDL representation besides the scalar kinds.
const CLASS_TYPES: &[(&str, &str)] = &[
    ("GATKPath", "File"),
    ("FeatureInput", "File"),
    ("URI", "String"),
    ("URL", "String"),
    ("Interval", "String"),
    ("SimpleInterval", "String"),
    ("BigDecimal", "Float"),
    ("BigInteger", "Int"),
];

const WDL_FILE: &str = "File";
const WDL_STRING: &str = "String";

/// WDL form of one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct WdlMapping {
    /// Type in output and declaration position.
    pub wdl_type: String,
    /// Type in input position; differs for output-only files.
    pub input_type: String,
    /// Default value for the generated inputs JSON.
    pub default_value: serde_json::Value,
}

/// Maps a type and its default onto WDL.
///
/// Enumerations map to `String`. Any other type without an entry in the
/// lookup table is an error, reported as the offending type name.
///
/// # Examples
///
/// ```
/// use argdoc_core::{CollectionKind, ScalarKind, TypeDescriptor, WorkflowResource};
/// use argdoc_docgen::map_wdl_type;
///
/// let files = TypeDescriptor::Collection {
///     kind: CollectionKind::List,
///     elements: vec![TypeDescriptor::Scalar(ScalarKind::File)],
/// };
/// let mapping = map_wdl_type(&files, &serde_json::Value::Null, None).unwrap();
/// assert_eq!(mapping.wdl_type, "Array[File]");
/// assert_eq!(mapping.default_value, serde_json::json!([]));
///
/// let output = WorkflowResource { output: true, ..Default::default() };
/// let out = map_wdl_type(&TypeDescriptor::Scalar(ScalarKind::File), &serde_json::Value::Null, Some(&output)).unwrap();
/// assert_eq!(out.wdl_type, "File");
/// assert_eq!(out.input_type, "String");
/// ```
pub fn map_wdl_type(
    ty: &TypeDescriptor,
    default: &serde_json::Value,
    workflow: Option<&WorkflowResource>,
) -> Result<WdlMapping, String> {
    let wdl_type = wdl_type_name(ty)?;
    let input_type = match workflow {
        Some(resource) if resource.is_output_only() => wdl_type.replace(WDL_FILE, WDL_STRING),
        _ => wdl_type.clone(),
    };
    let default_value = match default {
        serde_json::Value::Null if ty.is_collection() => serde_json::Value::Array(Vec::new()),
        other => other.clone(),
    };
    Ok(WdlMapping {
        wdl_type,
        input_type,
        default_value,
    })
}

/// WDL type token of `ty`.
pub fn wdl_type_name(ty: &TypeDescriptor) -> Result<String, String> {
    match ty {
        TypeDescriptor::Scalar(kind) => Ok(scalar_type(*kind).to_string()),
        TypeDescriptor::Enum(_) => Ok(WDL_STRING.to_string()),
        TypeDescriptor::Class(name) => CLASS_TYPES
            .iter()
            .find(|(class, _)| *class == simple_name(name))
            .map(|(_, wdl)| wdl.to_string())
            .ok_or_else(|| ty.display_name()),
        TypeDescriptor::Collection { kind, elements } => match (kind, elements.as_slice()) {
            (CollectionKind::Map, [key, value]) => {
                Ok(format!("Map[{}, {}]", wdl_type_name(key)?, wdl_type_name(value)?))
            }
            (CollectionKind::List | CollectionKind::Set | CollectionKind::Array, [element]) => {
                Ok(format!("Array[{}]", wdl_type_name(element)?))
            }
            _ => Err(ty.display_name()),
        },
    }
}

fn scalar_type(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Boolean => "Boolean",
        ScalarKind::Byte | ScalarKind::Short | ScalarKind::Int | ScalarKind::Long => "Int",
        ScalarKind::Float | ScalarKind::Double => "Float",
        ScalarKind::Char | ScalarKind::String => WDL_STRING,
        ScalarKind::File => WDL_FILE,
    }
}

/// WDL-safe identifier for an argument display name: dashes stripped from
/// the front, remaining dashes turned into underscores.
pub fn wdl_identifier(display_name: &str) -> String {
    display_name.trim_start_matches('-').replace('-', "_")
}
