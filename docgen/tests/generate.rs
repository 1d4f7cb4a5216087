use std::fs;
use std::path::{Path, PathBuf};

use argdoc_core::SourceModel;
use argdoc_docgen::{DocConfig, DocError, Doclet, TeraRenderer, generate, inspect};
use serde_json::Value;
use tempfile::TempDir;

fn fixture() -> SourceModel {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tools.yaml");
    SourceModel::load(path).unwrap()
}

fn config(dir: &TempDir) -> DocConfig {
    DocConfig {
        output_dir: dir.path().to_path_buf(),
        absolute_version: "4.2.0".into(),
        build_timestamp: "2024-01-01T00:00:00+00:00".into(),
        ..Default::default()
    }
}

fn names(records: &Value) -> Vec<&str> {
    records
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["name"].as_str().unwrap())
        .collect()
}

fn file_names(files: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = files
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_html_doclet_writes_pages_manifests_and_index() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = TeraRenderer::new(&config).unwrap();

    let report = generate(fixture(), &config, &Doclet::html(), &renderer).unwrap();

    assert_eq!(report.doclet, "html");
    assert_eq!(report.work_units, 2);
    assert_eq!(report.warnings, 0);
    assert_eq!(
        file_names(&report.files),
        vec![
            "CountReads.html",
            "CountReads.json",
            "PrintReads.html",
            "PrintReads.json",
            "index.html",
        ]
    );

    let page = fs::read_to_string(dir.path().join("PrintReads.html")).unwrap();
    assert!(page.contains("Print reads from a file"));
    assert!(page.contains("--input"));

    let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(index.contains("Read Data Manipulation"));
    assert!(index.contains("href=\"CountReads.html\""));
}

#[test]
fn test_manifest_follows_canonical_shape() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = TeraRenderer::new(&config).unwrap();
    generate(fixture(), &config, &Doclet::html(), &renderer).unwrap();

    let text = fs::read_to_string(dir.path().join("PrintReads.json")).unwrap();
    let manifest: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(manifest["group"], "Read Data Manipulation");
    assert_eq!(manifest["groupSummary"], "Tools that manipulate read data");
    assert_eq!(manifest["description"], "Prints every read that passes the read filters.");
    assert_eq!(manifest["version"], "4.2.0");
    assert_eq!(manifest["note"], "Handles BAM and CRAM");

    let arguments = &manifest["arguments"];
    assert_eq!(
        names(&arguments["all"]),
        vec!["--input", "--mode", "--output", "--quality", "--read-filter", "--verbosity"]
    );
    assert_eq!(names(&arguments["required"]), vec!["--input", "--output"]);
    assert_eq!(names(&arguments["common"]), vec!["--verbosity"]);
    assert_eq!(names(&arguments["advanced"]), vec!["--quality"]);
    assert_eq!(names(&arguments["optional"]), vec!["--mode", "--read-filter"]);
    assert!(arguments["dependent"].as_array().unwrap().is_empty());
    assert!(arguments["positional"].as_array().unwrap().is_empty());

    let input = &arguments["required"][0];
    assert_eq!(input["synonyms"], "-I");
    assert_eq!(input["required"], "yes");
    assert_eq!(input["type"], "File");
    assert_eq!(input["defaultValue"], "null");

    let quality = &arguments["advanced"][0];
    assert_eq!(quality["minValue"], "0");
    assert_eq!(quality["maxValue"], "100");
    assert_eq!(quality["minRecValue"], "NA");
    assert_eq!(quality["maxRecValue"], "NA");
    assert_eq!(quality["defaultValue"], "20");

    let mode = &arguments["optional"][0];
    assert_eq!(mode["type"], "Mode");
    assert_eq!(mode["options"][0]["name"], "FAST");
    assert_eq!(mode["options"][0]["summary"], "Trade accuracy for speed");
    assert_eq!(mode["options"][1]["name"], "ACCURATE");

    assert_eq!(manifest["extradocs"][0]["name"], "CountReads");
    assert_eq!(manifest["extradocs"][0]["filename"], "CountReads.html");

    let defaults = &manifest["pluginDefaultInstances"]["readFilter"];
    assert_eq!(defaults[0]["name"], "MappingQualityFilter");
    assert_eq!(defaults[0]["summary"], "Keep reads above a mapping quality");
    assert_eq!(defaults[0]["filename"], Value::Null);
    assert_eq!(manifest["readFilter"], *defaults);
}

#[test]
fn test_mutex_and_positional_arguments() {
    let dir = TempDir::new().unwrap();
    let properties = inspect(fixture(), &config(&dir), &Doclet::html(), "CountReads").unwrap();

    let intervals = &properties.arguments("optional")[0];
    assert_eq!(intervals.name, "--intervals");
    assert_eq!(intervals.exclusive_of, "--whole-genome");
    let whole_genome = &properties.arguments("optional")[2];
    assert_eq!(whole_genome.name, "--whole-genome");
    assert_eq!(whole_genome.exclusive_of, "--intervals");

    let positional = &properties.arguments("positional")[0];
    assert_eq!(positional.name, "[NA - Positional]");
    assert_eq!(positional.required, "no");
    assert_eq!(positional.type_name, "List[File]");
}

#[test]
fn test_collection_of_enum_lists_element_options() {
    let dir = TempDir::new().unwrap();
    let properties = inspect(fixture(), &config(&dir), &Doclet::html(), "CountReads").unwrap();

    let modes = &properties.arguments("optional")[1];
    assert_eq!(modes.name, "--modes");
    assert_eq!(modes.type_name, "List[Mode]");
    let options: Vec<(&str, &str)> = modes
        .options
        .iter()
        .map(|option| (option.name.as_str(), option.summary.as_str()))
        .collect();
    assert_eq!(
        options,
        vec![("FAST", "Trade accuracy for speed"), ("ACCURATE", "Slow but exact")]
    );
}

#[test]
fn test_dependent_arguments_shown_on_request() {
    let dir = TempDir::new().unwrap();
    let hidden = inspect(fixture(), &config(&dir), &Doclet::html(), "PrintReads").unwrap();
    assert!(
        hidden
            .arguments("all")
            .iter()
            .all(|record| record.name != "--minimum-mapping-quality")
    );

    let shown = DocConfig {
        show_dependent_arguments: true,
        ..config(&dir)
    };
    let properties = inspect(fixture(), &shown, &Doclet::html(), "PrintReads").unwrap();
    let dependent = properties.arguments("dependent");
    assert_eq!(dependent.len(), 1);
    assert_eq!(dependent[0].name, "--minimum-mapping-quality");
    assert!(
        properties
            .arguments("all")
            .iter()
            .any(|record| record.name == "--minimum-mapping-quality")
    );
}

#[test]
fn test_wdl_doclet_only_documents_workflow_tools() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = TeraRenderer::new(&config).unwrap();

    let report = generate(fixture(), &config, &Doclet::wdl(), &renderer).unwrap();
    assert_eq!(report.work_units, 1);
    assert_eq!(report.warnings, 1);
    assert_eq!(
        file_names(&report.files),
        vec!["PrintReads.wdl", "PrintReadsInputs.json"]
    );

    let inputs: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("PrintReadsInputs.json")).unwrap())
            .unwrap();
    assert_eq!(inputs["PrintReads.input"], Value::Null);
    assert_eq!(inputs["PrintReads.mode"], "FAST");
    assert_eq!(inputs["PrintReads.quality"], 20);
    assert_eq!(inputs["PrintReads.read_filter"], serde_json::json!([]));

    let task = fs::read_to_string(dir.path().join("PrintReads.wdl")).unwrap();
    assert!(task.contains("workflow PrintReads {"));
    assert!(task.contains("String output"));
    assert!(task.contains("memory: \"2G\""));
}

#[test]
fn test_bash_doclet_writes_one_completion_script() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.completion.caller_script_name = "gatk".into();
    config.completion.pre_legal_args = "--help".into();
    let renderer = TeraRenderer::new(&config).unwrap();

    let report = generate(fixture(), &config, &Doclet::bash(), &renderer).unwrap();
    assert_eq!(file_names(&report.files), vec!["gatk-completion.sh"]);

    let script = fs::read_to_string(dir.path().join("gatk-completion.sh")).unwrap();
    assert!(script.contains("complete -o default -F _gatk_complete gatk"));
    assert!(script.contains("CountReads PrintReads"));
    assert!(script.contains("legal_args=(--help \"--input\" \"--intervals\" \"--modes\" \"--whole-genome\" )"));
}

#[test]
fn test_unknown_class_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = inspect(fixture(), &config(&dir), &Doclet::html(), "NoSuchTool").unwrap_err();
    assert!(matches!(err, DocError::UnknownWorkUnit(ref name) if name == "NoSuchTool"));
}

#[test]
fn test_conflicting_config_aborts_before_writing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let config = DocConfig {
        output_dir: out.clone(),
        settings_dir: Some(dir.path().to_path_buf()),
        use_default_templates: true,
        ..Default::default()
    };
    let renderer = TeraRenderer::new(&DocConfig::default()).unwrap();
    let err = generate(fixture(), &config, &Doclet::html(), &renderer).unwrap_err();
    assert!(matches!(err, DocError::Config(_)));
    assert!(!out.exists());
}
