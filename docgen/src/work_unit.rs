//! Work-unit discovery (phase 1).
//!
//! Every documented class becomes a [`WorkUnitShell`] carrying its resolved
//! name, group and prose. The resulting [`WorkUnitRegistry`] is complete
//! before any property map is built, so cross-references can be resolved
//! from any unit.

use std::collections::HashMap;

use argdoc_core::{ClassDescriptor, ClassRegistry, Decl, Deprecation, DocCommentProvider};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::DocConfig;
use crate::handler::Doclet;

/// Group assigned to units that declare none.
pub const DEFAULT_GROUP_NAME: &str = "Miscellaneous";
/// Group summary used when neither the feature nor the program group has one.
pub const DEFAULT_GROUP_SUMMARY: &str = "Tools that do not belong to a documented group";
/// Summary used when a unit has no documentation at all.
pub const DEFAULT_SUMMARY: &str = "No summary available";

/// A documented class with its name and group resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkUnitShell {
    /// Fully-qualified class name.
    pub class_name: String,
    pub name: String,
    pub filename: String,
    pub group_name: String,
    pub group_summary: String,
    pub summary: String,
    pub description: String,
    pub beta: bool,
    pub experimental: bool,
    pub deprecation: Option<Deprecation>,
}

/// Phase-1 result: every work unit of the run, by class.
#[derive(Debug, Clone, Default)]
pub struct WorkUnitRegistry {
    units: Vec<WorkUnitShell>,
    by_class: HashMap<String, usize>,
    warnings: Vec<String>,
}

impl WorkUnitRegistry {
    /// Shells in discovery order.
    pub fn units(&self) -> &[WorkUnitShell] {
        &self.units
    }

    pub fn get(&self, class_name: &str) -> Option<&WorkUnitShell> {
        self.by_class.get(class_name).map(|&idx| &self.units[idx])
    }

    /// Finds a unit by class name or by simple unit name.
    pub fn find(&self, name: &str) -> Option<&WorkUnitShell> {
        self.get(name)
            .or_else(|| self.units.iter().find(|unit| unit.name == name))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Soft warnings raised while resolving names and groups.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn push(&mut self, shell: WorkUnitShell) {
        self.by_class.insert(shell.class_name.clone(), self.units.len());
        self.units.push(shell);
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

/// Discovers every work unit `doclet` documents.
///
/// A class is a work unit when it carries an enabled feature marker and the
/// doclet's `include` hook accepts it. Hidden classes are skipped unless the
/// configuration includes hidden features.
pub fn discover_work_units(
    registry: &ClassRegistry,
    config: &DocConfig,
    doclet: &Doclet,
) -> WorkUnitRegistry {
    let mut units = WorkUnitRegistry::default();

    for class in registry.classes() {
        let Some(feature) = &class.feature else {
            continue;
        };
        if !feature.enabled {
            continue;
        }
        if class.hidden && !config.include_hidden {
            debug!(class = %class.name, "Skipping hidden class");
            continue;
        }
        if !(doclet.hooks.include)(class) {
            debug!(class = %class.name, doclet = doclet.name, "Class not handled by doclet");
            continue;
        }

        let shell = resolve_shell(registry, config, class, &mut units);
        debug!(class = %class.name, group = %shell.group_name, "Discovered work unit");
        units.push(shell);
    }

    units
}

fn resolve_shell(
    registry: &ClassRegistry,
    config: &DocConfig,
    class: &ClassDescriptor,
    units: &mut WorkUnitRegistry,
) -> WorkUnitShell {
    let feature = class.feature.as_ref();
    let program = class.program.as_ref();
    let name = class.simple_name().to_string();

    let group_name = feature
        .and_then(|f| f.group_name.clone())
        .or_else(|| program.and_then(|p| p.program_group.clone()))
        .filter(|g| !g.trim().is_empty());
    let group_name = match group_name {
        Some(group) => group,
        None => {
            units.warn(format!(
                "No group name declared for {}; using \"{DEFAULT_GROUP_NAME}\"",
                class.name
            ));
            DEFAULT_GROUP_NAME.to_string()
        }
    };

    let group_summary = feature
        .and_then(|f| f.group_summary.clone())
        .or_else(|| registry.program_group_summary(&group_name).map(String::from))
        .filter(|s| !s.trim().is_empty());
    let group_summary = match group_summary {
        Some(summary) => summary,
        None => {
            units.warn(format!("No group summary declared for group {group_name}"));
            DEFAULT_GROUP_SUMMARY.to_string()
        }
    };

    let summary = feature
        .and_then(|f| f.summary.clone())
        .or_else(|| program.and_then(|p| p.one_line_summary.clone()))
        .or_else(|| registry.summary(Decl::Class(&class.name)))
        .filter(|s| !s.trim().is_empty());
    let summary = match summary {
        Some(summary) => summary,
        None => {
            units.warn(format!("No summary available for {}", class.name));
            DEFAULT_SUMMARY.to_string()
        }
    };

    let description = program
        .and_then(|p| p.summary.clone())
        .or_else(|| registry.full_doc(Decl::Class(&class.name)))
        .unwrap_or_default();

    WorkUnitShell {
        class_name: class.name.clone(),
        filename: format!("{name}.{}", config.output_extension()),
        name,
        group_name,
        group_summary,
        summary,
        description,
        beta: class.beta,
        experimental: class.experimental,
        deprecation: class.deprecated.clone(),
    }
}
