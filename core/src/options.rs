//! Legal values of enumeration-typed arguments.

use crate::introspect::{Decl, DocCommentProvider};
use crate::types::{ArgumentDefinition, EnumOption, EnumType, TypeDescriptor};

/// Options of `def`, in declaration order.
///
/// Empty unless the argument is an enumeration or a single-parameter
/// collection of one.
pub fn resolve_options(def: &ArgumentDefinition, docs: &dyn DocCommentProvider) -> Vec<EnumOption> {
    resolve_type_options(&def.field_type, docs)
}

/// Options of an arbitrary type; see [`resolve_options`].
pub fn resolve_type_options(ty: &TypeDescriptor, docs: &dyn DocCommentProvider) -> Vec<EnumOption> {
    let Some(enum_type) = option_enum(ty) else {
        return Vec::new();
    };
    enum_type
        .constants
        .iter()
        .map(|constant| {
            let summary = if enum_type.self_documenting {
                constant.help_doc.clone()
            } else {
                docs.summary(Decl::EnumConstant {
                    class: &enum_type.name,
                    constant: &constant.name,
                })
            };
            EnumOption {
                name: constant.name.clone(),
                summary: summary.unwrap_or_default(),
            }
        })
        .collect()
}

fn option_enum(ty: &TypeDescriptor) -> Option<&EnumType> {
    match ty {
        TypeDescriptor::Enum(e) => Some(e),
        TypeDescriptor::Collection { elements, .. } => match elements.as_slice() {
            [TypeDescriptor::Enum(e)] => Some(e),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::{CollectionKind, EnumConstant, ScalarKind};

    struct Docs;

    impl DocCommentProvider for Docs {
        fn summary(&self, decl: Decl<'_>) -> Option<String> {
            match decl {
                Decl::EnumConstant { constant: "FAST", .. } => Some("Go fast".into()),
                _ => None,
            }
        }

        fn full_doc(&self, _decl: Decl<'_>) -> Option<String> {
            None
        }

        fn inline_custom_tags(&self, _decl: Decl<'_>, _prefix: &str) -> BTreeMap<String, String> {
            BTreeMap::new()
        }
    }

    fn mode(self_documenting: bool) -> TypeDescriptor {
        TypeDescriptor::Enum(EnumType {
            name: "example.Mode".into(),
            constants: vec![
                EnumConstant {
                    name: "FAST".into(),
                    help_doc: Some("Fast mode".into()),
                },
                EnumConstant {
                    name: "SLOW".into(),
                    help_doc: None,
                },
            ],
            self_documenting,
        })
    }

    #[test]
    fn test_enum_constants_use_doc_comments() {
        let options = resolve_type_options(&mode(false), &Docs);
        assert_eq!(
            options,
            vec![
                EnumOption {
                    name: "FAST".into(),
                    summary: "Go fast".into()
                },
                EnumOption {
                    name: "SLOW".into(),
                    summary: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_self_documenting_enum_uses_help_text() {
        let options = resolve_type_options(&mode(true), &Docs);
        assert_eq!(options[0].summary, "Fast mode");
    }

    #[test]
    fn test_collection_of_enum_resolves_element_options() {
        let list = TypeDescriptor::Collection {
            kind: CollectionKind::List,
            elements: vec![mode(false)],
        };
        assert_eq!(
            resolve_type_options(&list, &Docs),
            vec![
                EnumOption {
                    name: "FAST".into(),
                    summary: "Go fast".into()
                },
                EnumOption {
                    name: "SLOW".into(),
                    summary: String::new()
                },
            ]
        );

        let set = TypeDescriptor::Collection {
            kind: CollectionKind::Set,
            elements: vec![mode(true)],
        };
        let options = resolve_type_options(&set, &Docs);
        let summaries: Vec<&str> = options.iter().map(|o| o.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Fast mode", ""]);
    }

    #[test]
    fn test_maps_and_nested_collections_have_no_options() {
        let map = TypeDescriptor::Collection {
            kind: CollectionKind::Map,
            elements: vec![TypeDescriptor::Scalar(ScalarKind::String), mode(false)],
        };
        assert!(resolve_type_options(&map, &Docs).is_empty());

        let nested = TypeDescriptor::Collection {
            kind: CollectionKind::List,
            elements: vec![TypeDescriptor::Collection {
                kind: CollectionKind::Set,
                elements: vec![mode(false)],
            }],
        };
        assert!(resolve_type_options(&nested, &Docs).is_empty());
        assert!(resolve_type_options(&TypeDescriptor::Scalar(ScalarKind::Int), &Docs).is_empty());
    }
}
