//! The generation driver.
//!
//! A run is two-phase: discovery builds the complete [`WorkUnitRegistry`],
//! then every unit is scanned, classified and turned into a frozen
//! [`WorkUnitProperties`] on the rayon pool. Rendering and file writes happen
//! afterwards on the calling thread, in name order.

use std::path::{Path, PathBuf};

use argdoc_core::{
    ArgumentScanner, ClassRegistry, Decl, DocCommentProvider, PluginDescriptor, SourceModel,
    classify_all, simple_name, validate_model,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CompletionConfig, DocConfig};
use crate::error::{DocError, Result};
use crate::handler::{Doclet, UnitContext};
use crate::properties::{
    ALL_ARGUMENTS, DocReference, PluginInstanceSummary, PropertyMapBuilder, WorkUnitProperties,
    argument_groups,
};
use crate::render::Renderer;
use crate::work_unit::{WorkUnitRegistry, WorkUnitShell, discover_work_units};

/// A fully built work unit.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub shell: WorkUnitShell,
    pub properties: WorkUnitProperties,
    /// Soft warnings raised while building this unit.
    pub warnings: Vec<String>,
}

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub doclet: String,
    pub work_units: usize,
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
    pub warnings: usize,
}

/// Builds the property map of one discovered unit.
///
/// # Errors
///
/// Any scan, ordering, cross-reference or hook failure aborts the unit.
pub fn build_work_unit(
    registry: &ClassRegistry,
    units: &WorkUnitRegistry,
    config: &DocConfig,
    doclet: &Doclet,
    shell: &WorkUnitShell,
) -> Result<WorkUnit> {
    let class = registry
        .class(&shell.class_name)
        .ok_or_else(|| DocError::UnknownWorkUnit(shell.class_name.clone()))?;

    let descriptors = registry
        .plugin_descriptors_for(&class.name)
        .map_err(|e| DocError::scan(&shell.name, e))?;
    let plugins: Vec<&dyn PluginDescriptor> = descriptors
        .iter()
        .map(|descriptor| *descriptor as &dyn PluginDescriptor)
        .collect();

    let scan = ArgumentScanner::new(registry)
        .scan_class(&class.name, &plugins)
        .map_err(|e| DocError::scan(&shell.name, e))?;
    let classified = classify_all(scan, config.visibility(), doclet.hooks.classify)?;

    let mut warnings = Vec::new();
    let groups = argument_groups(&classified, registry, doclet.hooks.resolve_type, &mut warnings)?;

    let mut extradocs = Vec::new();
    for target in class.feature.iter().flat_map(|f| &f.extra_docs) {
        if let Some(unit) = units.find(target) {
            extradocs.push(DocReference {
                name: unit.name.clone(),
                filename: unit.filename.clone(),
            });
            continue;
        }
        // A documented class this doclet (or the hidden filter) left out is
        // dropped; anything else is a dangling reference.
        let documented = registry
            .class(target)
            .is_some_and(|other| other.feature.as_ref().is_some_and(|f| f.enabled));
        if !documented {
            return Err(DocError::UnresolvedReference {
                unit: shell.name.clone(),
                target: target.clone(),
            });
        }
        warn!(
            unit = %shell.name,
            target = %target,
            doclet = doclet.name,
            "Skipping extradoc outside this run"
        );
        warnings.push(format!(
            "{}: extradoc {target} is not documented by the {} doclet",
            shell.name, doclet.name
        ));
    }

    let custom_tags =
        registry.inline_custom_tags(Decl::Class(&class.name), &config.custom_tag_prefix);

    let mut builder = PropertyMapBuilder::new(shell, config)
        .with_arguments(groups)?
        .with_extradocs(extradocs)
        .with_custom_tags(custom_tags);
    for descriptor in &descriptors {
        let instances = descriptor
            .default_instances
            .iter()
            .map(|plugin| plugin_summary(registry, units, plugin))
            .collect();
        builder = builder.with_plugin_defaults(&descriptor.display_name, instances)?;
    }

    let ctx = UnitContext {
        shell,
        class,
        classified: &classified,
        registry,
        units,
        config,
    };
    let properties = (doclet.hooks.build_property_map)(&ctx, builder.build())?;

    debug!(
        unit = %shell.name,
        arguments = properties.arguments(ALL_ARGUMENTS).len(),
        warnings = warnings.len(),
        "Built work unit"
    );
    Ok(WorkUnit {
        shell: shell.clone(),
        properties,
        warnings,
    })
}

fn plugin_summary(
    registry: &ClassRegistry,
    units: &WorkUnitRegistry,
    plugin: &str,
) -> PluginInstanceSummary {
    let class_name = registry
        .class(plugin)
        .map(|class| class.name.as_str())
        .unwrap_or(plugin);
    let unit = units.get(class_name);
    PluginInstanceSummary {
        name: simple_name(class_name).to_string(),
        summary: unit
            .map(|u| u.summary.clone())
            .or_else(|| registry.summary(Decl::Class(class_name)))
            .unwrap_or_default(),
        filename: unit.map(|u| u.filename.clone()),
    }
}

/// Builds every discovered unit in parallel and returns them sorted by name.
///
/// The first failing unit aborts the run.
pub fn build_all(
    registry: &ClassRegistry,
    units: &WorkUnitRegistry,
    config: &DocConfig,
    doclet: &Doclet,
) -> Result<Vec<WorkUnit>> {
    let jobs = config
        .jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| default_parallel_jobs(units.len()));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| DocError::ThreadPool(e.to_string()))?;

    let mut built: Vec<WorkUnit> = pool.install(|| {
        units
            .units()
            .par_iter()
            .map(|shell| build_work_unit(registry, units, config, doclet, shell))
            .collect::<Result<Vec<_>>>()
    })?;

    built.sort_by(|a, b| {
        a.properties
            .name
            .cmp(&b.properties.name)
            .then_with(|| a.shell.class_name.cmp(&b.shell.class_name))
    });
    Ok(built)
}

fn default_parallel_jobs(unit_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.min(unit_count.max(1))
}

/// One group on the index page.
#[derive(Debug, Clone, Serialize)]
pub struct GroupIndex<'a> {
    pub name: &'a str,
    pub summary: &'a str,
    pub units: Vec<&'a WorkUnitProperties>,
}

/// Context of the per-run outputs (index page, completion script).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexProperties<'a> {
    pub version: &'a str,
    pub timestamp: &'a str,
    /// Groups sorted by name, units inside sorted by name.
    pub groups: Vec<GroupIndex<'a>>,
    pub units: Vec<&'a WorkUnitProperties>,
    pub completion: &'a CompletionConfig,
    pub caller_script_name: &'a str,
    /// Caller script name usable as a shell function name.
    pub caller_function: String,
}

impl<'a> IndexProperties<'a> {
    pub fn new(units: &'a [WorkUnit], config: &'a DocConfig) -> Self {
        let mut groups: Vec<GroupIndex<'a>> = Vec::new();
        for unit in units {
            let props = &unit.properties;
            match groups.iter_mut().find(|g| g.name == props.group) {
                Some(group) => group.units.push(props),
                None => groups.push(GroupIndex {
                    name: &props.group,
                    summary: &props.group_summary,
                    units: vec![props],
                }),
            }
        }
        groups.sort_by(|a, b| a.name.cmp(b.name));

        let caller = config.completion.caller_script();
        Self {
            version: &config.absolute_version,
            timestamp: &config.build_timestamp,
            groups,
            units: units.iter().map(|unit| &unit.properties).collect(),
            completion: &config.completion,
            caller_script_name: caller,
            caller_function: caller
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect(),
        }
    }
}

/// Runs `doclet` over `model` and writes every output under
/// `config.output_dir`.
///
/// # Errors
///
/// Configuration and model validation run first; any later failure aborts
/// the run, possibly after some files were written.
pub fn generate(
    model: SourceModel,
    config: &DocConfig,
    doclet: &Doclet,
    renderer: &dyn Renderer,
) -> Result<RunReport> {
    config.validate()?;
    if let Some(err) = validate_model(&model).into_iter().next() {
        return Err(err.into());
    }

    let registry = ClassRegistry::new(model);
    let units = discover_work_units(&registry, config, doclet);
    info!(doclet = doclet.name, work_units = units.len(), "Discovered work units");

    let built = build_all(&registry, &units, config, doclet)?;

    std::fs::create_dir_all(&config.output_dir)?;
    let mut files = Vec::new();

    for unit in &built {
        let data = serde_json::to_value(&unit.properties)?;
        for output in &doclet.unit_outputs {
            let text = match output.template {
                Some(template) => renderer.render(template, &data)?,
                None => unit.properties.to_json()?,
            };
            let name = (output.file_name)(&unit.properties, config);
            files.push(write_output(&config.output_dir, &name, &text)?);
        }
    }

    if !doclet.index_outputs.is_empty() {
        let data = serde_json::to_value(IndexProperties::new(&built, config))?;
        for output in &doclet.index_outputs {
            let text = renderer.render(output.template, &data)?;
            let name = (output.file_name)(config);
            files.push(write_output(&config.output_dir, &name, &text)?);
        }
    }

    let warnings = units.warnings().len() + built.iter().map(|u| u.warnings.len()).sum::<usize>();
    info!(
        doclet = doclet.name,
        work_units = built.len(),
        files = files.len(),
        warnings,
        "Documentation run complete"
    );

    Ok(RunReport {
        doclet: doclet.name.to_string(),
        work_units: built.len(),
        files,
        warnings,
    })
}

/// Builds the property map of the single unit named `class`, by class name
/// or simple name, without writing anything.
pub fn inspect(
    model: SourceModel,
    config: &DocConfig,
    doclet: &Doclet,
    class: &str,
) -> Result<WorkUnitProperties> {
    config.validate()?;
    if let Some(err) = validate_model(&model).into_iter().next() {
        return Err(err.into());
    }

    let registry = ClassRegistry::new(model);
    let units = discover_work_units(&registry, config, doclet);
    let shell = units
        .find(class)
        .ok_or_else(|| DocError::UnknownWorkUnit(class.to_string()))?;
    Ok(build_work_unit(&registry, &units, config, doclet, shell)?.properties)
}

fn write_output(dir: &Path, name: &str, text: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, text)?;
    debug!(path = %path.display(), bytes = text.len(), "Wrote output");
    Ok(path)
}
