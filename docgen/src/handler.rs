//! Doclets: named hook sets driving the single generation pipeline.
//!
//! A [`Doclet`] is plain data. Its [`Hooks`] decide which classes become
//! work units, how arguments are classified, what each argument record and
//! property map gain, and its outputs name the templates rendered per unit
//! and per run.

use std::fmt;

use argdoc_core::{
    ArgumentCategory, ArgumentDefinition, ClassDescriptor, ClassRegistry, ClassifiedArguments,
    classify,
};
use serde_json::json;

use crate::completion::completion_arrays;
use crate::config::DocConfig;
use crate::error::{DocError, Result};
use crate::properties::{ALL_ARGUMENTS, ArgumentRecord, RecordSource, WorkUnitProperties};
use crate::wdl::{map_wdl_type, wdl_identifier};
use crate::work_unit::{WorkUnitRegistry, WorkUnitShell};

/// Everything a property-map hook may read about the unit being built.
#[derive(Clone, Copy)]
pub struct UnitContext<'a> {
    pub shell: &'a WorkUnitShell,
    pub class: &'a ClassDescriptor,
    pub classified: &'a ClassifiedArguments,
    pub registry: &'a ClassRegistry,
    pub units: &'a WorkUnitRegistry,
    pub config: &'a DocConfig,
}

pub type IncludeHook = fn(&ClassDescriptor) -> bool;
pub type ClassifyHook = fn(&ArgumentDefinition) -> ArgumentCategory;
pub type ResolveTypeHook = fn(RecordSource<'_>, ArgumentRecord) -> Result<ArgumentRecord>;
pub type PropertyMapHook = fn(&UnitContext<'_>, WorkUnitProperties) -> Result<WorkUnitProperties>;

/// Injection points of the pipeline.
#[derive(Clone, Copy)]
pub struct Hooks {
    pub include: IncludeHook,
    pub classify: ClassifyHook,
    pub resolve_type: ResolveTypeHook,
    pub build_property_map: PropertyMapHook,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            include: |_| true,
            classify,
            resolve_type: |_, record| Ok(record),
            build_property_map: |_, properties| Ok(properties),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

/// Built-in doclets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum DocletKind {
    /// HTML pages, JSON manifests and an index page.
    Html,
    /// WDL tasks and their inputs JSON.
    Wdl,
    /// One bash completion script.
    Bash,
}

impl fmt::Display for DocletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Wdl => write!(f, "wdl"),
            Self::Bash => write!(f, "bash"),
        }
    }
}

/// One file rendered per work unit.
#[derive(Debug, Clone, Copy)]
pub struct UnitOutput {
    /// Template name; `None` writes the canonical JSON map instead.
    pub template: Option<&'static str>,
    pub file_name: fn(&WorkUnitProperties, &DocConfig) -> String,
}

/// One file rendered per run.
#[derive(Debug, Clone, Copy)]
pub struct IndexOutput {
    pub template: &'static str,
    pub file_name: fn(&DocConfig) -> String,
}

/// A named hook set plus the files it produces.
#[derive(Debug, Clone)]
pub struct Doclet {
    pub name: &'static str,
    pub hooks: Hooks,
    pub unit_outputs: Vec<UnitOutput>,
    pub index_outputs: Vec<IndexOutput>,
}

impl Doclet {
    pub fn for_kind(kind: DocletKind) -> Self {
        match kind {
            DocletKind::Html => Self::html(),
            DocletKind::Wdl => Self::wdl(),
            DocletKind::Bash => Self::bash(),
        }
    }

    /// Help pages with the default classifier, plus a JSON manifest per unit.
    pub fn html() -> Self {
        Self {
            name: "html",
            hooks: Hooks::default(),
            unit_outputs: vec![
                UnitOutput {
                    template: Some("unit.html"),
                    file_name: |props, _| props.filename.clone(),
                },
                UnitOutput {
                    template: None,
                    file_name: |props, _| format!("{}.json", props.name),
                },
            ],
            index_outputs: vec![IndexOutput {
                template: "index.html",
                file_name: |config| format!("index.{}", config.index_extension()),
            }],
        }
    }

    /// WDL tasks for classes that declare workflow runtime properties.
    pub fn wdl() -> Self {
        Self {
            name: "wdl",
            hooks: Hooks {
                include: |class| class.workflow.is_some(),
                resolve_type: wdl_record,
                build_property_map: wdl_properties,
                ..Hooks::default()
            },
            unit_outputs: vec![
                UnitOutput {
                    template: Some("task.wdl"),
                    file_name: |props, _| format!("{}.wdl", props.name),
                },
                UnitOutput {
                    template: Some("inputs.json"),
                    file_name: |props, _| format!("{}Inputs.json", props.name),
                },
            ],
            index_outputs: Vec::new(),
        }
    }

    /// A single completion script covering every unit.
    pub fn bash() -> Self {
        Self {
            name: "bash",
            hooks: Hooks {
                build_property_map: completion_properties,
                ..Hooks::default()
            },
            unit_outputs: Vec::new(),
            index_outputs: vec![IndexOutput {
                template: "completion.sh",
                file_name: |config| format!("{}-completion.sh", config.completion.caller_script()),
            }],
        }
    }
}

fn wdl_record(source: RecordSource<'_>, record: ArgumentRecord) -> Result<ArgumentRecord> {
    let mapping = map_wdl_type(source.field_type, source.default_json, source.workflow).map_err(
        |type_name| DocError::UnmappedType {
            location: source.location(),
            type_name,
        },
    )?;
    let wdl_name = if record.kind == ArgumentCategory::Positional.as_str() {
        source.field_name.to_string()
    } else {
        wdl_identifier(&record.name)
    };
    Ok(record
        .with_extra("wdlName", wdl_name)
        .with_extra("wdlType", mapping.wdl_type)
        .with_extra("wdlInputType", mapping.input_type)
        .with_extra("wdlDefaultValue", mapping.default_value))
}

fn wdl_properties(ctx: &UnitContext<'_>, properties: WorkUnitProperties) -> Result<WorkUnitProperties> {
    let runtime = ctx.class.workflow.clone().unwrap_or_default();

    let outputs: Vec<serde_json::Value> = ctx
        .classified
        .named()
        .filter(|(_, def)| def.workflow.as_ref().is_some_and(|w| w.output))
        .filter_map(|(_, def)| {
            let name = def.display_name();
            properties
                .arguments(ALL_ARGUMENTS)
                .iter()
                .find(|record| record.name == name)
        })
        .map(|record| {
            json!({
                "name": record.extra.get("wdlName").cloned().unwrap_or_default(),
                "type": record.extra.get("wdlType").cloned().unwrap_or_default(),
            })
        })
        .collect();

    Ok(properties
        .with_extra("runtimeProperties", serde_json::to_value(runtime)?)
        .with_extra("wdlOutputs", outputs))
}

fn completion_properties(
    _ctx: &UnitContext<'_>,
    properties: WorkUnitProperties,
) -> Result<WorkUnitProperties> {
    let arrays = serde_json::to_value(completion_arrays(&properties))?;
    Ok(properties.with_extra("completion", arrays))
}

#[cfg(test)]
mod tests {
    use argdoc_core::{ScalarKind, TypeDescriptor};

    use super::*;
    use crate::properties::NA;

    fn record(name: &str) -> ArgumentRecord {
        ArgumentRecord {
            name: name.into(),
            synonyms: NA.into(),
            required: "no".into(),
            type_name: "File".into(),
            summary: String::new(),
            fulltext: String::new(),
            default_value: "null".into(),
            min_value: NA.into(),
            max_value: NA.into(),
            min_rec_value: NA.into(),
            max_rec_value: NA.into(),
            min_elements: NA.into(),
            max_elements: NA.into(),
            kind: "optional".into(),
            options: vec![],
            attributes: NA.into(),
            other_argument_required: NA.into(),
            exclusive_of: NA.into(),
            collection: false,
            deprecated: false,
            deprecation_detail: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_wdl_record_adds_type_keys() {
        let ty = TypeDescriptor::Scalar(ScalarKind::File);
        let source = RecordSource {
            declaring_class: "example.Tool",
            field_name: "output",
            field_type: &ty,
            default_json: &serde_json::Value::Null,
            workflow: None,
        };
        let record = wdl_record(source, record("--output-file")).unwrap();
        assert_eq!(record.extra["wdlName"], "output_file");
        assert_eq!(record.extra["wdlType"], "File");
        assert_eq!(record.extra["wdlInputType"], "File");
        assert_eq!(record.extra["wdlDefaultValue"], serde_json::Value::Null);
    }

    #[test]
    fn test_wdl_record_reports_unmapped_type() {
        let ty = TypeDescriptor::Class("example.Opaque".into());
        let source = RecordSource {
            declaring_class: "example.Tool",
            field_name: "thing",
            field_type: &ty,
            default_json: &serde_json::Value::Null,
            workflow: None,
        };
        let err = wdl_record(source, record("--thing")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no WDL type for Opaque on argument example.Tool.thing"
        );
    }

    #[test]
    fn test_doclet_output_names() {
        let config = DocConfig {
            index_file_extension: "htm".into(),
            ..Default::default()
        };
        let html = Doclet::for_kind(DocletKind::Html);
        assert_eq!((html.index_outputs[0].file_name)(&config), "index.htm");

        let bash = Doclet::bash();
        assert_eq!((bash.index_outputs[0].file_name)(&config), "tool-completion.sh");
        assert!(bash.unit_outputs.is_empty());

        let mut class = ClassDescriptor::new("example.Tool");
        assert!(!(Doclet::wdl().hooks.include)(&class));
        class.workflow = Some(Default::default());
        assert!((Doclet::wdl().hooks.include)(&class));
    }
}
