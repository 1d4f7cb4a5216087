//! Introspection capabilities and their source-model implementation.
//!
//! The scanner never looks at the model directly. It asks a
//! [`FieldIntrospector`] for tagged fields, values and types, and the
//! property-map builder asks a [`DocCommentProvider`] for prose. Plugin
//! descriptors are reached through [`PluginDescriptor`]. [`ClassRegistry`]
//! implements all three over a [`SourceModel`].

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::error::ScanError;
use crate::model::{
    ClassDescriptor, DocComment, FieldDescriptor, FieldTag, FieldValue, PluginDescriptorModel,
    SourceModel, simple_name,
};
use crate::signature::TypeSignature;
use crate::types::{EnumConstant, EnumType, Instance, TypeDescriptor, Value};

/// A declaration whose documentation can be looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decl<'a> {
    Class(&'a str),
    Field { class: &'a str, field: &'a str },
    EnumConstant { class: &'a str, constant: &'a str },
}

/// Source of prose documentation for declarations.
pub trait DocCommentProvider {
    /// First-sentence summary of the declaration's comment.
    fn summary(&self, decl: Decl<'_>) -> Option<String>;
    /// Complete comment text.
    fn full_doc(&self, decl: Decl<'_>) -> Option<String>;
    /// Inline custom tags whose names start with `prefix.`, prefix stripped.
    fn inline_custom_tags(&self, decl: Decl<'_>, prefix: &str) -> BTreeMap<String, String>;
}

/// A field carrying exactly one argument marker.
#[derive(Debug, Clone, Copy)]
pub struct TaggedField<'a> {
    pub declaring_class: &'a str,
    pub field: &'a FieldDescriptor,
    pub tag: FieldTag<'a>,
}

impl TaggedField<'_> {
    /// `Class.field` of the declaration.
    pub fn location(&self) -> String {
        format!("{}.{}", self.declaring_class, self.field.name)
    }
}

/// Runtime view of argument containers.
pub trait FieldIntrospector {
    /// Tagged fields of `class`, own fields first, then up the superclass chain.
    fn list_tagged_fields(&self, class: &str) -> Result<Vec<TaggedField<'_>>, ScanError>;

    /// Value of `field` inside `instance`.
    fn field_value<'i>(&self, instance: &'i Instance, field: &TaggedField<'_>) -> Option<&'i Value> {
        instance.get(field.declaring_class, &field.field.name)
    }

    /// Builds an instance of `class` through its no-argument constructor.
    fn instantiate(&self, class: &str) -> Result<Instance, ScanError>;

    /// Resolves a type signature into a closed [`TypeDescriptor`].
    fn resolve_type(&self, signature: &str) -> Result<TypeDescriptor, ScanError>;
}

/// A pluggable argument set selected at runtime.
pub trait PluginDescriptor {
    fn display_name(&self) -> &str;
    /// Class whose own arguments control plugin selection.
    fn descriptor_class(&self) -> &str;
    /// Plugin instances selected by default.
    fn default_instances(
        &self,
        introspector: &dyn FieldIntrospector,
    ) -> Result<Vec<Instance>, ScanError>;
}

impl PluginDescriptor for PluginDescriptorModel {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn descriptor_class(&self) -> &str {
        &self.class
    }

    fn default_instances(
        &self,
        introspector: &dyn FieldIntrospector,
    ) -> Result<Vec<Instance>, ScanError> {
        self.default_instances
            .iter()
            .map(|class| introspector.instantiate(class))
            .collect()
    }
}

/// Indexed [`SourceModel`] implementing every introspection capability.
///
/// # Examples
///
/// ```
/// use argdoc_core::*;
///
/// let mut model = SourceModel::default();
/// model.classes.push(
///     ClassDescriptor::new("example.Tool").with_field(
///         FieldDescriptor::new("count", "int")
///             .with_value(FieldValue::Int(3))
///             .argument(ArgumentTag::long("count")),
///     ),
/// );
/// let registry = ClassRegistry::new(model);
/// let instance = registry.instantiate("example.Tool").unwrap();
/// assert_eq!(instance.get("example.Tool", "count"), Some(&Value::Int(3)));
/// ```
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    model: SourceModel,
    by_name: HashMap<String, usize>,
    by_simple_name: HashMap<String, Vec<usize>>,
    descriptors: HashMap<String, usize>,
}

impl ClassRegistry {
    pub fn new(model: SourceModel) -> Self {
        let mut by_name = HashMap::new();
        let mut by_simple_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, class) in model.classes.iter().enumerate() {
            by_name.entry(class.name.clone()).or_insert(idx);
            by_simple_name
                .entry(class.simple_name().to_string())
                .or_default()
                .push(idx);
        }
        let descriptors = model
            .plugin_descriptors
            .iter()
            .enumerate()
            .map(|(idx, d)| (d.name.clone(), idx))
            .collect();
        Self {
            model,
            by_name,
            by_simple_name,
            descriptors,
        }
    }

    pub fn model(&self) -> &SourceModel {
        &self.model
    }

    /// All classes in model order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.model.classes.iter()
    }

    /// Finds a class by fully-qualified name, or by an unambiguous simple name.
    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        if let Some(&idx) = self.by_name.get(name) {
            return Some(&self.model.classes[idx]);
        }
        match self.by_simple_name.get(simple_name(name)).map(Vec::as_slice) {
            Some([idx]) if !name.contains('.') => Some(&self.model.classes[*idx]),
            _ => None,
        }
    }

    pub fn plugin_descriptor(&self, name: &str) -> Option<&PluginDescriptorModel> {
        self.descriptors
            .get(name)
            .map(|&idx| &self.model.plugin_descriptors[idx])
    }

    /// Plugin descriptors consumed by `class` or any of its superclasses.
    pub fn plugin_descriptors_for(
        &self,
        class: &str,
    ) -> Result<Vec<&PluginDescriptorModel>, ScanError> {
        let mut seen = HashSet::new();
        let mut descriptors = Vec::new();
        for declaring in self.superclass_chain(class)? {
            for name in &declaring.plugin_descriptors {
                if !seen.insert(name.as_str()) {
                    continue;
                }
                let descriptor = self
                    .plugin_descriptor(name)
                    .ok_or_else(|| ScanError::UnknownPluginDescriptor(name.clone()))?;
                descriptors.push(descriptor);
            }
        }
        Ok(descriptors)
    }

    /// Summary of a program group, if the model declares one.
    pub fn program_group_summary(&self, group: &str) -> Option<&str> {
        self.model
            .program_groups
            .iter()
            .find(|g| g.name == group)
            .and_then(|g| g.summary.as_deref())
    }

    /// `class` followed by its superclasses, nearest first.
    pub fn superclass_chain(&self, class: &str) -> Result<Vec<&ClassDescriptor>, ScanError> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(class.to_string());
        while let Some(name) = next {
            let descriptor = self
                .class(&name)
                .ok_or_else(|| ScanError::UnknownClass(name.clone()))?;
            if !visited.insert(descriptor.name.as_str()) {
                break;
            }
            chain.push(descriptor);
            next = descriptor.superclass.clone();
        }
        Ok(chain)
    }

    fn instantiate_with(&self, name: &str, stack: &mut Vec<String>) -> Result<Instance, ScanError> {
        let class = self
            .class(name)
            .ok_or_else(|| ScanError::UnknownClass(name.to_string()))?;
        if !class.default_constructor {
            return Err(ScanError::NoDefaultConstructor(class.name.clone()));
        }
        if stack.iter().any(|entry| *entry == class.name) {
            let path = stack
                .iter()
                .cloned()
                .chain(std::iter::once(class.name.clone()))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ScanError::CollectionCycle { path });
        }

        stack.push(class.name.clone());
        let mut instance = Instance::new(class.name.clone());
        for declaring in self.superclass_chain(&class.name)? {
            for field in &declaring.fields {
                let value = self.materialize(&field.value, stack)?;
                instance
                    .fields
                    .insert((declaring.name.clone(), field.name.clone()), value);
            }
        }
        stack.pop();
        Ok(instance)
    }

    fn materialize(&self, value: &FieldValue, stack: &mut Vec<String>) -> Result<Value, ScanError> {
        Ok(match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::Int(*i),
            FieldValue::Float(x) => Value::Float(*x),
            FieldValue::Str(s) => Value::Str(s.clone()),
            FieldValue::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| self.materialize(item, stack))
                    .collect::<Result<_, _>>()?,
            ),
            FieldValue::New { new } => Value::Object(self.instantiate_with(new, stack)?),
        })
    }

    fn resolve_signature(&self, sig: &TypeSignature) -> TypeDescriptor {
        let base = if let Some(kind) = sig.collection_kind() {
            TypeDescriptor::Collection {
                kind,
                elements: sig
                    .params
                    .iter()
                    .map(|param| self.resolve_signature(param))
                    .collect(),
            }
        } else if let Some(kind) = sig.scalar_kind() {
            TypeDescriptor::Scalar(kind)
        } else {
            match self.class(&sig.name) {
                Some(class) => match &class.enum_constants {
                    Some(constants) => TypeDescriptor::Enum(EnumType {
                        name: class.name.clone(),
                        constants: constants
                            .iter()
                            .map(|c| EnumConstant {
                                name: c.name.clone(),
                                help_doc: c.help_doc.clone(),
                            })
                            .collect(),
                        self_documenting: class.self_documenting,
                    }),
                    None => TypeDescriptor::Class(class.name.clone()),
                },
                None => TypeDescriptor::Class(sig.name.clone()),
            }
        };

        (0..sig.array_depth).fold(base, |inner, _| TypeDescriptor::Collection {
            kind: crate::types::CollectionKind::Array,
            elements: vec![inner],
        })
    }

    fn doc_for(&self, decl: Decl<'_>) -> Option<&DocComment> {
        match decl {
            Decl::Class(class) => self.class(class)?.doc.as_ref(),
            Decl::Field { class, field } => self.class(class)?.field(field)?.doc.as_ref(),
            Decl::EnumConstant { class, constant } => self
                .class(class)?
                .enum_constants
                .as_ref()?
                .iter()
                .find(|c| c.name == constant)?
                .doc
                .as_ref(),
        }
    }
}

impl FieldIntrospector for ClassRegistry {
    fn list_tagged_fields(&self, class: &str) -> Result<Vec<TaggedField<'_>>, ScanError> {
        let mut tagged = Vec::new();
        for declaring in self.superclass_chain(class)? {
            for field in &declaring.fields {
                if field.tag_count() > 1 {
                    return Err(ScanError::ConflictingTags {
                        location: format!("{}.{}", declaring.name, field.name),
                    });
                }
                if let Some(tag) = field.tag() {
                    tagged.push(TaggedField {
                        declaring_class: &declaring.name,
                        field,
                        tag,
                    });
                }
            }
        }
        debug!(class, fields = tagged.len(), "Listed tagged fields");
        Ok(tagged)
    }

    fn instantiate(&self, class: &str) -> Result<Instance, ScanError> {
        self.instantiate_with(class, &mut Vec::new())
    }

    fn resolve_type(&self, signature: &str) -> Result<TypeDescriptor, ScanError> {
        let sig = TypeSignature::parse(signature)?;
        Ok(self.resolve_signature(&sig))
    }
}

impl DocCommentProvider for ClassRegistry {
    fn summary(&self, decl: Decl<'_>) -> Option<String> {
        self.doc_for(decl)
            .and_then(|doc| doc.summary.clone())
            .filter(|s| !s.trim().is_empty())
    }

    fn full_doc(&self, decl: Decl<'_>) -> Option<String> {
        self.doc_for(decl)
            .and_then(|doc| doc.full.clone())
            .filter(|s| !s.trim().is_empty())
    }

    fn inline_custom_tags(&self, decl: Decl<'_>, prefix: &str) -> BTreeMap<String, String> {
        let Some(doc) = self.doc_for(decl) else {
            return BTreeMap::new();
        };
        let dotted = format!("{prefix}.");
        doc.tags
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(&dotted)
                    .map(|short| (short.to_string(), value.clone()))
            })
            .collect()
    }
}
