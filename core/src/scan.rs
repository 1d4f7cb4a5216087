//! Reflective argument scanner.
//!
//! Walks an instantiated container through a [`FieldIntrospector`],
//! recursing into argument collections and plugin instances, and produces a
//! flat, deduplicated list of [`ArgumentDefinition`]s plus at most one
//! [`PositionalArgumentDefinition`].
//!
//! # Example
//!
//! ```
//! use argdoc_core::*;
//!
//! let mut model = SourceModel::default();
//! model.classes.push(
//!     ClassDescriptor::new("example.Shared").with_field(
//!         FieldDescriptor::new("verbose", "boolean")
//!             .with_value(FieldValue::Bool(false))
//!             .argument(ArgumentTag::long("verbose").with_short("v")),
//!     ),
//! );
//! model.classes.push(
//!     ClassDescriptor::new("example.Tool")
//!         .with_field(
//!             FieldDescriptor::new("shared", "example.Shared")
//!                 .with_value(FieldValue::New { new: "example.Shared".into() })
//!                 .collection(),
//!         )
//!         .with_field(
//!             FieldDescriptor::new("output", "File").argument(ArgumentTag::long("output")),
//!         ),
//! );
//! let registry = ClassRegistry::new(model);
//!
//! let scan = ArgumentScanner::new(&registry).scan_class("example.Tool", &[]).unwrap();
//! let names: Vec<_> = scan.named.iter().map(|d| d.display_name()).collect();
//! assert_eq!(names, vec!["--verbose", "--output"]);
//! ```

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::ScanError;
use crate::introspect::{FieldIntrospector, PluginDescriptor, TaggedField};
use crate::model::{ArgumentTag, FieldTag, PositionalTag};
use crate::types::{
    ArgumentDefinition, ArgumentOrigin, Instance, NumericBounds, PluginOwner,
    PositionalArgumentDefinition, Value,
};

/// Output of one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub named: Vec<ArgumentDefinition>,
    pub positional: Option<PositionalArgumentDefinition>,
}

#[derive(Default)]
struct Accumulator {
    named: Vec<ArgumentDefinition>,
    positional: Option<PositionalArgumentDefinition>,
}

/// Scans argument containers through a [`FieldIntrospector`].
pub struct ArgumentScanner<'a> {
    introspector: &'a dyn FieldIntrospector,
}

impl<'a> ArgumentScanner<'a> {
    pub fn new(introspector: &'a dyn FieldIntrospector) -> Self {
        Self { introspector }
    }

    /// Instantiates `class` and scans the result.
    ///
    /// # Errors
    ///
    /// Fails with [`ScanError::NoDefaultConstructor`] when the class cannot be
    /// instantiated, and with any error [`scan`](Self::scan) reports.
    pub fn scan_class(
        &self,
        class: &str,
        plugins: &[&dyn PluginDescriptor],
    ) -> Result<ScanResult, ScanError> {
        let root = self.introspector.instantiate(class)?;
        self.scan(&root, plugins)
    }

    /// Scans `root`, then the control arguments and default instances of each
    /// plugin descriptor.
    pub fn scan(
        &self,
        root: &Instance,
        plugins: &[&dyn PluginDescriptor],
    ) -> Result<ScanResult, ScanError> {
        let mut acc = Accumulator::default();
        self.walk(root, &ArgumentOrigin::Container, &mut Vec::new(), &mut acc)?;

        for descriptor in plugins {
            let display_name = descriptor.display_name().to_string();
            let control = self.introspector.instantiate(descriptor.descriptor_class())?;
            let origin = ArgumentOrigin::DescriptorControl {
                descriptor: display_name.clone(),
            };
            self.walk(&control, &origin, &mut Vec::new(), &mut acc)?;

            for plugin in descriptor.default_instances(self.introspector)? {
                let origin = ArgumentOrigin::Plugin(PluginOwner {
                    descriptor: display_name.clone(),
                    plugin_class: plugin.class.clone(),
                });
                self.walk(&plugin, &origin, &mut Vec::new(), &mut acc)?;
            }
        }

        let named = close_mutex(deduplicate(acc.named)?);
        debug!(
            root = %root.class,
            named = named.len(),
            positional = acc.positional.is_some(),
            "Scanned argument container"
        );
        Ok(ScanResult {
            named,
            positional: acc.positional,
        })
    }

    fn walk(
        &self,
        instance: &Instance,
        origin: &ArgumentOrigin,
        stack: &mut Vec<String>,
        acc: &mut Accumulator,
    ) -> Result<(), ScanError> {
        if stack.contains(&instance.class) {
            let path = stack
                .iter()
                .chain(std::iter::once(&instance.class))
                .cloned()
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ScanError::CollectionCycle { path });
        }
        stack.push(instance.class.clone());

        for field in self.introspector.list_tagged_fields(&instance.class)? {
            match field.tag {
                FieldTag::Argument(tag) => {
                    let def = self.named_definition(instance, &field, tag, origin)?;
                    acc.named.push(def);
                }
                FieldTag::Collection(_) => match self.introspector.field_value(instance, &field) {
                    Some(Value::Object(inner)) => {
                        debug!(collection = %field.location(), class = %inner.class, "Entering argument collection");
                        self.walk(inner, origin, stack, acc)?;
                    }
                    Some(Value::Null) | None => {
                        return Err(ScanError::NullCollection {
                            location: field.location(),
                        });
                    }
                    Some(_) => {
                        return Err(ScanError::InvalidCollection {
                            location: field.location(),
                        });
                    }
                },
                FieldTag::Positional(tag) => {
                    let def = self.positional_definition(instance, &field, tag)?;
                    if let Some(existing) = &acc.positional {
                        return Err(ScanError::DuplicatePositional {
                            first: existing.location(),
                            second: def.location(),
                        });
                    }
                    acc.positional = Some(def);
                }
            }
        }

        stack.pop();
        Ok(())
    }

    fn named_definition(
        &self,
        instance: &Instance,
        field: &TaggedField<'_>,
        tag: &ArgumentTag,
        origin: &ArgumentOrigin,
    ) -> Result<ArgumentDefinition, ScanError> {
        let location = field.location();
        let field_type = self.introspector.resolve_type(&field.field.signature)?;

        let non_empty = |name: &Option<String>| name.clone().filter(|n| !n.is_empty());
        let mut long_name = non_empty(&tag.full_name);
        let short_name = non_empty(&tag.short_name);
        if long_name.is_none() && short_name.is_none() {
            long_name = Some(field.field.name.clone());
        }
        for name in long_name.iter().chain(short_name.iter()) {
            if name.starts_with('-') || name.chars().any(char::is_whitespace) {
                return Err(ScanError::InvalidArgumentName {
                    name: name.clone(),
                    location,
                });
            }
        }

        let bounds = NumericBounds {
            min_value: tag.min_value,
            max_value: tag.max_value,
            min_recommended: tag.min_recommended_value,
            max_recommended: tag.max_recommended_value,
        };
        if !bounds.is_empty() && !field_type.is_numeric() {
            return Err(ScanError::BoundsOnNonNumeric {
                location,
                type_name: field_type.display_name(),
            });
        }
        check_order(&location, "value", bounds.min_value, bounds.max_value)?;
        check_order(
            &location,
            "recommended value",
            bounds.min_recommended,
            bounds.max_recommended,
        )?;
        check_order(
            &location,
            "elements",
            tag.min_elements.map(|n| n as f64),
            tag.max_elements.map(|n| n as f64),
        )?;

        let value = self
            .introspector
            .field_value(instance, field)
            .cloned()
            .unwrap_or_default();
        let is_optional = tag.optional || (!value.is_null() && !value.is_empty_collection());

        let mut def = ArgumentDefinition::new(field.declaring_class, &field.field.name, field_type);
        def.long_name = long_name;
        def.short_name = short_name;
        def.containing_class = instance.class.clone();
        def.doc_string = tag.doc.clone().unwrap_or_default();
        def.is_optional = is_optional;
        def.default_value = value.repr();
        def.default_json = value.to_json();
        def.bounds = bounds;
        def.min_elements = tag.min_elements;
        def.max_elements = tag.max_elements;
        def.mutex_targets = tag
            .mutex
            .iter()
            .map(|name| name.trim_start_matches('-').to_string())
            .collect();
        def.is_hidden = field.field.hidden;
        def.is_advanced = field.field.advanced;
        def.is_common = tag.common;
        def.is_sensitive = tag.sensitive;
        def.deprecation = field.field.deprecated.clone();
        def.origin = origin.clone();
        def.workflow = field.field.workflow_resource.clone();

        debug!(argument = %def.display_name(), location = %def.location(), "Found argument");
        Ok(def)
    }

    fn positional_definition(
        &self,
        instance: &Instance,
        field: &TaggedField<'_>,
        tag: &PositionalTag,
    ) -> Result<PositionalArgumentDefinition, ScanError> {
        let location = field.location();
        check_order(
            &location,
            "elements",
            tag.min_elements.map(|n| n as f64),
            tag.max_elements.map(|n| n as f64),
        )?;
        let value = self
            .introspector
            .field_value(instance, field)
            .cloned()
            .unwrap_or_default();
        Ok(PositionalArgumentDefinition {
            field_name: field.field.name.clone(),
            declaring_class: field.declaring_class.to_string(),
            doc_string: tag.doc.clone().unwrap_or_default(),
            field_type: self.introspector.resolve_type(&field.field.signature)?,
            min_elements: tag.min_elements,
            max_elements: tag.max_elements,
            default_value: value.repr(),
        })
    }
}

fn check_order(
    location: &str,
    what: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), ScanError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ScanError::InvalidBounds {
            location: location.to_string(),
            detail: format!("minimum {what} {min} exceeds maximum {max}"),
        }),
        _ => Ok(()),
    }
}

/// A plugin argument may share a name with its own descriptor's control argument.
fn is_permitted_alias(existing: &ArgumentDefinition, candidate: &ArgumentDefinition) -> bool {
    match (&existing.origin, &candidate.origin) {
        (ArgumentOrigin::DescriptorControl { descriptor }, ArgumentOrigin::Plugin(owner)) => {
            *descriptor == owner.descriptor
        }
        _ => false,
    }
}

/// Rejects ambiguous names. Control arguments are always scanned before the
/// plugin instances of their descriptor, so the kept copy is the control one.
///
/// A plugin argument is folded into its descriptor's control argument only
/// when every one of its names is shared with it; a partial overlap would
/// silently hide the plugin's other name and is reported as ambiguous.
fn deduplicate(defs: Vec<ArgumentDefinition>) -> Result<Vec<ArgumentDefinition>, ScanError> {
    let mut kept: Vec<ArgumentDefinition> = Vec::with_capacity(defs.len());
    let mut by_alias: HashMap<String, usize> = HashMap::new();

    'defs: for def in defs {
        let collisions: Vec<(&str, usize)> = def
            .aliases()
            .filter_map(|alias| by_alias.get(alias).map(|&idx| (alias, idx)))
            .collect();

        if let Some(&(alias, idx)) = collisions.first() {
            let existing = &kept[idx];
            let fully_shared = collisions.len() == def.aliases().count()
                && collisions.iter().all(|&(_, other)| other == idx);
            if fully_shared && is_permitted_alias(existing, &def) {
                debug!(
                    argument = alias,
                    plugin = %def.location(),
                    "Plugin argument aliases its descriptor's control argument"
                );
                continue 'defs;
            }
            let (alias, idx) = collisions
                .iter()
                .copied()
                .find(|&(_, other)| !is_permitted_alias(&kept[other], &def))
                .unwrap_or((alias, idx));
            return Err(ScanError::DuplicateArgument {
                name: alias.to_string(),
                first: kept[idx].location(),
                second: def.location(),
            });
        }

        let idx = kept.len();
        for alias in def.aliases() {
            by_alias.insert(alias.to_string(), idx);
        }
        kept.push(def);
    }

    Ok(kept)
}

/// Resolves mutex targets to display names and makes exclusion symmetric.
fn close_mutex(mut defs: Vec<ArgumentDefinition>) -> Vec<ArgumentDefinition> {
    let mut resolved: Vec<BTreeSet<String>> = vec![BTreeSet::new(); defs.len()];
    for (idx, def) in defs.iter().enumerate() {
        for target in &def.mutex_targets {
            match defs.iter().position(|other| other.matches(target)) {
                Some(other) if other != idx => {
                    resolved[idx].insert(defs[other].display_name());
                    resolved[other].insert(def.display_name());
                }
                Some(_) => {}
                None => {
                    warn!(
                        argument = %def.display_name(),
                        target = %target,
                        "Mutually exclusive argument not found"
                    );
                    resolved[idx].insert(format!("--{target}"));
                }
            }
        }
    }
    for (def, targets) in defs.iter_mut().zip(resolved) {
        def.mutex_targets = targets;
    }
    defs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::ClassRegistry;
    use crate::model::{ClassDescriptor, FieldDescriptor, FieldValue, PluginDescriptorModel, SourceModel};

    fn new_value(class: &str) -> FieldValue {
        FieldValue::New {
            new: class.to_string(),
        }
    }

    fn scan(model: SourceModel, class: &str) -> Result<ScanResult, ScanError> {
        let registry = ClassRegistry::new(model);
        let descriptors = registry.plugin_descriptors_for(class)?;
        let plugins: Vec<&dyn PluginDescriptor> =
            descriptors.iter().map(|d| *d as &dyn PluginDescriptor).collect();
        ArgumentScanner::new(&registry).scan_class(class, &plugins)
    }

    fn plugin_model(plugin_arg: &str) -> SourceModel {
        let mut model = SourceModel::default();
        let mut tool = ClassDescriptor::new("example.Tool").with_field(
            FieldDescriptor::new("input", "File").argument(ArgumentTag::long("input")),
        );
        tool.plugin_descriptors = vec!["filters".into()];
        model.classes.push(tool);
        model.classes.push(
            ClassDescriptor::new("example.FilterDescriptor").with_field(
                FieldDescriptor::new("names", "List<String>")
                    .with_value(FieldValue::List(vec![]))
                    .argument(ArgumentTag::long("read-filter").optional()),
            ),
        );
        model.classes.push(
            ClassDescriptor::new("example.LengthFilter").with_field(
                FieldDescriptor::new("max", "int")
                    .with_value(FieldValue::Int(100))
                    .argument(ArgumentTag::long(plugin_arg)),
            ),
        );
        model.plugin_descriptors.push(PluginDescriptorModel {
            name: "filters".into(),
            display_name: "readFilter".into(),
            class: "example.FilterDescriptor".into(),
            plugins: vec!["example.LengthFilter".into()],
            default_instances: vec!["example.LengthFilter".into()],
        });
        model
    }

    #[test]
    fn test_field_name_becomes_long_name_when_unnamed() {
        let mut model = SourceModel::default();
        model.classes.push(
            ClassDescriptor::new("example.Tool").with_field(
                FieldDescriptor::new("threads", "int")
                    .with_value(FieldValue::Int(1))
                    .argument(ArgumentTag::default()),
            ),
        );
        let result = scan(model, "example.Tool").unwrap();
        assert_eq!(result.named[0].long_name.as_deref(), Some("threads"));
        assert!(result.named[0].is_optional);
        assert_eq!(result.named[0].default_value, "1");
    }

    #[test]
    fn test_null_collection_is_fatal() {
        let mut model = SourceModel::default();
        model.classes.push(ClassDescriptor::new("example.Args"));
        model.classes.push(
            ClassDescriptor::new("example.Tool")
                .with_field(FieldDescriptor::new("args", "example.Args").collection()),
        );
        assert_eq!(
            scan(model, "example.Tool"),
            Err(ScanError::NullCollection {
                location: "example.Tool.args".into()
            })
        );
    }

    #[test]
    fn test_duplicate_long_name_names_both_declarations() {
        let mut model = SourceModel::default();
        model.classes.push(
            ClassDescriptor::new("example.Left")
                .with_field(FieldDescriptor::new("a", "int").argument(ArgumentTag::long("foo"))),
        );
        model.classes.push(
            ClassDescriptor::new("example.Right")
                .with_field(FieldDescriptor::new("b", "int").argument(ArgumentTag::long("foo"))),
        );
        model.classes.push(
            ClassDescriptor::new("example.Tool")
                .with_field(
                    FieldDescriptor::new("left", "example.Left")
                        .with_value(new_value("example.Left"))
                        .collection(),
                )
                .with_field(
                    FieldDescriptor::new("right", "example.Right")
                        .with_value(new_value("example.Right"))
                        .collection(),
                ),
        );
        assert_eq!(
            scan(model, "example.Tool"),
            Err(ScanError::DuplicateArgument {
                name: "foo".into(),
                first: "example.Left.a".into(),
                second: "example.Right.b".into(),
            })
        );
    }

    #[test]
    fn test_second_positional_field_is_fatal() {
        let mut model = SourceModel::default();
        model.classes.push(
            ClassDescriptor::new("example.Extra")
                .with_field(FieldDescriptor::new("more", "List<String>").positional(PositionalTag::default())),
        );
        model.classes.push(
            ClassDescriptor::new("example.Tool")
                .with_field(FieldDescriptor::new("files", "List<File>").positional(PositionalTag::default()))
                .with_field(
                    FieldDescriptor::new("extra", "example.Extra")
                        .with_value(new_value("example.Extra"))
                        .collection(),
                ),
        );
        assert!(matches!(
            scan(model, "example.Tool"),
            Err(ScanError::DuplicatePositional { .. })
        ));
    }

    #[test]
    fn test_plugin_arguments_are_flagged_with_owner() {
        let result = scan(plugin_model("max-length"), "example.Tool").unwrap();
        let names: Vec<_> = result.named.iter().map(|d| d.display_name()).collect();
        assert_eq!(names, vec!["--input", "--read-filter", "--max-length"]);

        let plugin_arg = &result.named[2];
        assert!(plugin_arg.is_controlled_by_plugin());
        let owner = plugin_arg.plugin_owner().unwrap();
        assert_eq!(owner.descriptor, "readFilter");
        assert_eq!(owner.plugin_class, "example.LengthFilter");
        assert!(!result.named[1].is_controlled_by_plugin());
    }

    #[test]
    fn test_plugin_argument_may_alias_control_argument() {
        let result = scan(plugin_model("read-filter"), "example.Tool").unwrap();
        let names: Vec<_> = result.named.iter().map(|d| d.display_name()).collect();
        assert_eq!(names, vec!["--input", "--read-filter"]);
        assert!(!result.named[1].is_controlled_by_plugin());
    }

    #[test]
    fn test_plugin_argument_may_not_alias_tool_argument() {
        assert!(matches!(
            scan(plugin_model("input"), "example.Tool"),
            Err(ScanError::DuplicateArgument { .. })
        ));
    }

    #[test]
    fn test_plugin_argument_partly_aliasing_control_argument_is_fatal() {
        let mut model = plugin_model("max-length");
        if let Some(tag) = model.classes[2].fields[0].argument.as_mut() {
            tag.short_name = Some("read-filter".into());
        }
        match scan(model, "example.Tool") {
            Err(ScanError::DuplicateArgument { name, first, second }) => {
                assert_eq!(name, "read-filter");
                assert_eq!(first, "example.FilterDescriptor.names");
                assert_eq!(second, "example.LengthFilter.max");
            }
            other => panic!("expected a duplicate argument error, got {other:?}"),
        }
    }

    #[test]
    fn test_mutex_is_symmetric_and_uses_display_names() {
        let mut model = SourceModel::default();
        let mut a = ArgumentTag::long("alpha").with_short("a");
        a.mutex = vec!["beta".into()];
        model.classes.push(
            ClassDescriptor::new("example.Tool")
                .with_field(FieldDescriptor::new("a", "int").argument(a))
                .with_field(FieldDescriptor::new("b", "int").argument(ArgumentTag::long("beta"))),
        );
        let result = scan(model, "example.Tool").unwrap();
        assert_eq!(
            result.named[0].mutex_targets.iter().collect::<Vec<_>>(),
            vec!["--beta"]
        );
        assert_eq!(
            result.named[1].mutex_targets.iter().collect::<Vec<_>>(),
            vec!["--alpha"]
        );
    }

    #[test]
    fn test_bounds_on_string_argument_are_rejected() {
        let mut model = SourceModel::default();
        let mut tag = ArgumentTag::long("name");
        tag.min_value = Some(0.0);
        model.classes.push(
            ClassDescriptor::new("example.Tool")
                .with_field(FieldDescriptor::new("name", "String").argument(tag)),
        );
        assert!(matches!(
            scan(model, "example.Tool"),
            Err(ScanError::BoundsOnNonNumeric { .. })
        ));
    }

    #[test]
    fn test_dashed_names_are_rejected() {
        let mut model = SourceModel::default();
        model.classes.push(
            ClassDescriptor::new("example.Tool")
                .with_field(FieldDescriptor::new("x", "int").argument(ArgumentTag::long("--x"))),
        );
        assert!(matches!(
            scan(model, "example.Tool"),
            Err(ScanError::InvalidArgumentName { .. })
        ));
    }
}
