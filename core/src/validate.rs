//! Source-model validation.
//!
//! Catches structural problems in a [`SourceModel`] (duplicate classes,
//! broken inheritance, conflicting markers, malformed names) before a scan
//! runs into them halfway through a documentation build.
//!
//! # Examples
//!
//! ```
//! use argdoc_core::*;
//!
//! let mut model = SourceModel::default();
//! model.classes.push(
//!     ClassDescriptor::new("example.Tool")
//!         .with_field(FieldDescriptor::new("input", "File").argument(ArgumentTag::long("input"))),
//! );
//! assert!(validate_model(&model).is_empty());
//!
//! // Invalid: stored names never carry dashes
//! let mut bad = SourceModel::default();
//! bad.classes.push(
//!     ClassDescriptor::new("example.Tool")
//!         .with_field(FieldDescriptor::new("input", "File").argument(ArgumentTag::long("--input"))),
//! );
//! assert!(!validate_model(&bad).is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{ClassDescriptor, SourceModel, simple_name};

/// Source-model validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Class name is empty or whitespace-only.
    #[error("class name cannot be empty")]
    EmptyClassName,
    /// Two classes share a fully-qualified name.
    #[error("duplicate class: {0}")]
    DuplicateClass(String),
    /// A superclass reference names no class in the model.
    #[error("class {class} extends unknown class {superclass}")]
    UnknownSuperclass { class: String, superclass: String },
    /// Following superclass links returns to the starting class.
    #[error("superclass cycle detected: {0}")]
    SuperclassCycle(String),
    /// Two fields of one class share a name.
    #[error("duplicate field {field} in class {class}")]
    DuplicateField { class: String, field: String },
    /// A field carries more than one argument marker.
    #[error("field {0} carries more than one argument marker")]
    ConflictingTags(String),
    /// An argument or mutex name carries a leading dash or whitespace.
    #[error("invalid argument name '{name}' on {location}")]
    InvalidArgumentName { name: String, location: String },
    /// A class or feature references a plugin descriptor that is not declared.
    #[error("class {class} references unknown plugin descriptor {descriptor}")]
    UnknownPluginDescriptor { class: String, descriptor: String },
    /// A plugin descriptor names a class the model does not describe.
    #[error("plugin descriptor {descriptor} references unknown class {class}")]
    UnknownPluginClass { descriptor: String, class: String },
    /// An enumeration class declares no constants.
    #[error("enum class {0} declares no constants")]
    EmptyEnum(String),
}

/// Class lookup with the same resolution rules as
/// [`ClassRegistry::class`](crate::ClassRegistry::class).
#[derive(Default)]
struct ClassIndex<'a> {
    by_name: HashMap<&'a str, &'a ClassDescriptor>,
    by_simple_name: HashMap<&'a str, Vec<&'a ClassDescriptor>>,
}

impl<'a> ClassIndex<'a> {
    /// Returns `false` when `name` is already indexed.
    fn insert(&mut self, name: &'a str, class: &'a ClassDescriptor) -> bool {
        if self.by_name.insert(name, class).is_some() {
            return false;
        }
        self.by_simple_name
            .entry(simple_name(name))
            .or_default()
            .push(class);
        true
    }

    fn get(&self, name: &str) -> Option<&'a ClassDescriptor> {
        if let Some(&class) = self.by_name.get(name) {
            return Some(class);
        }
        match self.by_simple_name.get(simple_name(name)).map(Vec::as_slice) {
            Some([class]) if !name.contains('.') => Some(*class),
            _ => None,
        }
    }
}

/// Validates a source model.
///
/// Class references (superclasses, plugin classes) resolve by
/// fully-qualified name or by an unambiguous simple name.
///
/// Stops at the first problem and returns it, or an empty list.
pub fn validate_model(model: &SourceModel) -> Vec<ModelError> {
    let mut errors = Vec::new();

    let mut classes = ClassIndex::default();
    for class in &model.classes {
        let name = class.name.trim();
        if name.is_empty() {
            errors.push(ModelError::EmptyClassName);
            return errors;
        }
        if !classes.insert(name, class) {
            errors.push(ModelError::DuplicateClass(name.to_string()));
            return errors;
        }
    }

    let descriptors: HashSet<&str> = model
        .plugin_descriptors
        .iter()
        .map(|d| d.name.as_str())
        .collect();

    for class in &model.classes {
        errors.extend(validate_class(class, &classes, &descriptors));
        if !errors.is_empty() {
            return errors;
        }
    }

    for descriptor in &model.plugin_descriptors {
        let referenced = std::iter::once(&descriptor.class)
            .chain(&descriptor.plugins)
            .chain(&descriptor.default_instances);
        for class in referenced {
            if classes.get(class).is_none() {
                errors.push(ModelError::UnknownPluginClass {
                    descriptor: descriptor.name.clone(),
                    class: class.clone(),
                });
                return errors;
            }
        }
    }

    errors
}

fn validate_class(
    class: &ClassDescriptor,
    classes: &ClassIndex<'_>,
    descriptors: &HashSet<&str>,
) -> Vec<ModelError> {
    let mut errors = Vec::new();

    if let Some(superclass) = &class.superclass {
        if classes.get(superclass).is_none() {
            errors.push(ModelError::UnknownSuperclass {
                class: class.name.clone(),
                superclass: superclass.clone(),
            });
            return errors;
        }
        if let Some(cycle) = superclass_cycle(class, classes) {
            errors.push(ModelError::SuperclassCycle(cycle));
            return errors;
        }
    }

    if matches!(&class.enum_constants, Some(constants) if constants.is_empty()) {
        errors.push(ModelError::EmptyEnum(class.name.clone()));
        return errors;
    }

    for descriptor in &class.plugin_descriptors {
        if !descriptors.contains(descriptor.as_str()) {
            errors.push(ModelError::UnknownPluginDescriptor {
                class: class.name.clone(),
                descriptor: descriptor.clone(),
            });
            return errors;
        }
    }

    let mut seen = HashSet::new();
    for field in &class.fields {
        let location = format!("{}.{}", class.name, field.name);
        if !seen.insert(field.name.as_str()) {
            errors.push(ModelError::DuplicateField {
                class: class.name.clone(),
                field: field.name.clone(),
            });
            return errors;
        }
        if field.tag_count() > 1 {
            errors.push(ModelError::ConflictingTags(location));
            return errors;
        }
        let Some(tag) = &field.argument else {
            continue;
        };
        let names = tag
            .full_name
            .iter()
            .chain(&tag.short_name)
            .chain(&tag.mutex);
        for name in names {
            if name.starts_with('-') || name.is_empty() || name.chars().any(char::is_whitespace) {
                errors.push(ModelError::InvalidArgumentName {
                    name: name.clone(),
                    location,
                });
                return errors;
            }
        }
    }

    errors
}

fn superclass_cycle(class: &ClassDescriptor, classes: &ClassIndex<'_>) -> Option<String> {
    let mut path = vec![class.name.as_str()];
    let mut next = class.superclass.as_deref().and_then(|name| classes.get(name));
    while let Some(parent) = next {
        let name = parent.name.as_str();
        if path.contains(&name) {
            path.push(name);
            return Some(path.join(" -> "));
        }
        path.push(name);
        next = parent.superclass.as_deref().and_then(|name| classes.get(name));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArgumentTag, FieldDescriptor, PluginDescriptorModel, PositionalTag};

    fn model(classes: Vec<ClassDescriptor>) -> SourceModel {
        SourceModel {
            classes,
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_duplicate_classes() {
        let errors = validate_model(&model(vec![
            ClassDescriptor::new("example.Tool"),
            ClassDescriptor::new("example.Tool"),
        ]));
        assert_eq!(
            errors,
            vec![ModelError::DuplicateClass("example.Tool".to_string())]
        );
    }

    #[test]
    fn test_rejects_superclass_cycle() {
        let mut a = ClassDescriptor::new("example.A");
        a.superclass = Some("example.B".into());
        let mut b = ClassDescriptor::new("example.B");
        b.superclass = Some("example.A".into());

        let errors = validate_model(&model(vec![a, b]));
        assert_eq!(
            errors,
            vec![ModelError::SuperclassCycle(
                "example.A -> example.B -> example.A".to_string()
            )]
        );
    }

    #[test]
    fn test_superclass_resolves_by_simple_name() {
        let base = ClassDescriptor::new("example.Base");
        let mut tool = ClassDescriptor::new("example.Tool");
        tool.superclass = Some("Base".into());
        assert!(validate_model(&model(vec![base.clone(), tool.clone()])).is_empty());

        let other = ClassDescriptor::new("other.Base");
        assert_eq!(
            validate_model(&model(vec![base, other, tool])),
            vec![ModelError::UnknownSuperclass {
                class: "example.Tool".into(),
                superclass: "Base".into(),
            }]
        );
    }

    #[test]
    fn test_cycle_through_simple_names_is_reported_by_full_name() {
        let mut a = ClassDescriptor::new("example.A");
        a.superclass = Some("B".into());
        let mut b = ClassDescriptor::new("example.B");
        b.superclass = Some("example.A".into());
        assert_eq!(
            validate_model(&model(vec![a, b])),
            vec![ModelError::SuperclassCycle(
                "example.A -> example.B -> example.A".to_string()
            )]
        );
    }

    #[test]
    fn test_rejects_conflicting_markers() {
        let mut field = FieldDescriptor::new("files", "List<File>").argument(ArgumentTag::long("files"));
        field.positional = Some(PositionalTag::default());
        let errors = validate_model(&model(vec![ClassDescriptor::new("example.Tool").with_field(field)]));
        assert_eq!(
            errors,
            vec![ModelError::ConflictingTags("example.Tool.files".to_string())]
        );
    }

    #[test]
    fn test_rejects_unknown_plugin_descriptor_and_class() {
        let mut tool = ClassDescriptor::new("example.Tool");
        tool.plugin_descriptors = vec!["filters".into()];
        let errors = validate_model(&model(vec![tool.clone()]));
        assert!(matches!(
            errors.as_slice(),
            [ModelError::UnknownPluginDescriptor { .. }]
        ));

        let mut with_descriptor = model(vec![tool]);
        with_descriptor.plugin_descriptors.push(PluginDescriptorModel {
            name: "filters".into(),
            display_name: "readFilter".into(),
            class: "example.Missing".into(),
            plugins: vec![],
            default_instances: vec![],
        });
        assert_eq!(
            validate_model(&with_descriptor),
            vec![ModelError::UnknownPluginClass {
                descriptor: "filters".into(),
                class: "example.Missing".into(),
            }]
        );
    }

    #[test]
    fn test_rejects_empty_enum() {
        let mut mode = ClassDescriptor::new("example.Mode");
        mode.enum_constants = Some(vec![]);
        assert_eq!(
            validate_model(&model(vec![mode])),
            vec![ModelError::EmptyEnum("example.Mode".to_string())]
        );
    }

    #[test]
    fn test_accepts_valid_model() {
        let mut base = ClassDescriptor::new("example.Base");
        base.fields.push(FieldDescriptor::new("x", "int").argument(ArgumentTag::long("x")));
        let mut tool = ClassDescriptor::new("example.Tool")
            .with_field(FieldDescriptor::new("y", "int").argument(ArgumentTag::long("y").with_short("Y")));
        tool.superclass = Some("example.Base".into());
        assert!(validate_model(&model(vec![base, tool])).is_empty());
    }
}
