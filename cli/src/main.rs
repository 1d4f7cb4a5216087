use std::path::{Path, PathBuf};

use argdoc_core::{SourceModel, validate_model};
use argdoc_docgen::{DocConfig, Doclet, DocletKind, TeraRenderer, generate, inspect};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "argdoc")]
#[command(about = "Generate documentation, WDL tasks and shell completion from argument models")]
#[command(version)]
struct Cli {
    /// Log scanner and pipeline decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render every documented work unit with one doclet.
    Generate(GenerateArgs),
    /// Print the canonical JSON property map of one work unit.
    Inspect(InspectArgs),
    /// Check a source model for structural errors.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ModelArgs {
    /// Source model file (YAML, or JSON when the extension is .json).
    #[arg(long)]
    model: PathBuf,
}

/// Flags shared by every command that builds property maps.
#[derive(Debug, Args)]
struct BuildArgs {
    /// Doclet deciding what is documented and how.
    #[arg(long, value_enum, default_value_t = DocletKind::Html)]
    doclet: DocletKind,
    /// YAML configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Document hidden work units and arguments.
    #[arg(long)]
    include_hidden: bool,
    /// Render plugin-controlled arguments in their own group.
    #[arg(long)]
    show_dependent_arguments: bool,
    /// Version string stamped into every page.
    #[arg(long)]
    absolute_version: Option<String>,
    /// Build timestamp stamped into every page (RFC 3339).
    #[arg(long)]
    build_timestamp: Option<String>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[command(flatten)]
    build: BuildArgs,
    /// Output directory.
    #[arg(long)]
    output: PathBuf,
    /// Directory of templates overriding the embedded ones by name.
    #[arg(long, conflicts_with = "use_default_templates")]
    settings_dir: Option<PathBuf>,
    /// Ignore any configured settings directory.
    #[arg(long)]
    use_default_templates: bool,
    /// Extension of per-unit pages.
    #[arg(long)]
    output_file_extension: Option<String>,
    /// Extension of the index page.
    #[arg(long)]
    index_file_extension: Option<String>,
    /// Worker threads for building work units.
    #[arg(long)]
    jobs: Option<usize>,
    /// Launcher script the bash completion is registered for.
    #[arg(long)]
    caller_script_name: Option<String>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[command(flatten)]
    build: BuildArgs,
    /// Class name or simple name of the work unit.
    #[arg(long)]
    class: String,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    model: ModelArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let model = load_model(&args.model.model)?;
    let mut config = build_config(&args.build)?;

    config.output_dir = args.output;
    if let Some(dir) = args.settings_dir {
        config.settings_dir = Some(dir);
    }
    if args.use_default_templates {
        config.use_default_templates = true;
        config.settings_dir = None;
    }
    if let Some(ext) = args.output_file_extension {
        config.output_file_extension = ext;
    }
    if let Some(ext) = args.index_file_extension {
        config.index_file_extension = ext;
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    if let Some(name) = args.caller_script_name {
        config.completion.caller_script_name = name;
    }
    config.validate().map_err(|e| e.to_string())?;

    let renderer = TeraRenderer::new(&config).map_err(|e| e.to_string())?;
    let doclet = Doclet::for_kind(args.build.doclet);
    debug!(doclet = doclet.name, output = %config.output_dir.display(), "Starting run");

    let report = generate(model, &config, &doclet, &renderer).map_err(|e| e.to_string())?;
    let raw = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("Failed to serialize run report: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let model = load_model(&args.model.model)?;
    let config = build_config(&args.build)?;
    let doclet = Doclet::for_kind(args.build.doclet);

    let properties =
        inspect(model, &config, &doclet, &args.class).map_err(|e| e.to_string())?;
    let raw = properties.to_json().map_err(|e| e.to_string())?;
    println!("{raw}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let model = load_model(&args.model.model)?;
    if let Some(err) = validate_model(&model).into_iter().next() {
        return Err(format!("invalid source model: {err}"));
    }
    let work_units = model
        .classes
        .iter()
        .filter(|class| class.feature.as_ref().is_some_and(|f| f.enabled))
        .count();
    println!(
        "Validated {} class(es), {} plugin descriptor(s), {} work unit(s).",
        model.classes.len(),
        model.plugin_descriptors.len(),
        work_units
    );
    Ok(())
}

fn load_model(path: &Path) -> Result<SourceModel, String> {
    SourceModel::load(path)
        .map_err(|err| format!("Failed to load model '{}': {err}", path.display()))
}

fn build_config(args: &BuildArgs) -> Result<DocConfig, String> {
    let mut config = match &args.config {
        Some(path) => DocConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => DocConfig::default(),
    };
    if args.include_hidden {
        config.include_hidden = true;
    }
    if args.show_dependent_arguments {
        config.show_dependent_arguments = true;
    }
    if let Some(version) = &args.absolute_version {
        config.absolute_version = version.clone();
    }
    if let Some(timestamp) = &args.build_timestamp {
        config.build_timestamp = timestamp.clone();
    }
    Ok(config)
}
