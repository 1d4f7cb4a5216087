//! Template rendering.
//!
//! Default templates are compiled into the crate. A settings directory may
//! override any of them, or add new ones, by file name (`unit.html.tera`
//! overrides `unit.html`).

use std::collections::HashMap;
use std::path::Path;

use tera::{Context, Tera, Value};
use tracing::debug;

use crate::config::DocConfig;
use crate::error::{DocError, Result};

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("unit.html", include_str!("../templates/unit.html.tera")),
    ("index.html", include_str!("../templates/index.html.tera")),
    ("task.wdl", include_str!("../templates/task.wdl.tera")),
    ("inputs.json", include_str!("../templates/inputs.json.tera")),
    ("completion.sh", include_str!("../templates/completion.sh.tera")),
];

const TEMPLATE_SUFFIX: &str = ".tera";

/// Turns a property map into output text.
pub trait Renderer: Sync {
    /// Renders `template` with `data` as its context.
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String>;
}

/// [`Renderer`] backed by Tera.
#[derive(Debug)]
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Loads the embedded templates, then the overrides in `settings_dir`
    /// unless the configuration asks for the defaults only.
    pub fn new(config: &DocConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(DEFAULT_TEMPLATES.iter().copied())
            .map_err(|e| DocError::template("<embedded>", e))?;

        if let Some(dir) = &config.settings_dir {
            if !config.use_default_templates {
                load_overrides(&mut tera, dir)?;
            }
        }

        tera.register_filter("bash_words", bash_words);
        Ok(Self { tera })
    }

    /// Names of every loaded template, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String> {
        let context =
            Context::from_value(data.clone()).map_err(|e| DocError::template(template, e))?;
        self.tera
            .render(template, &context)
            .map_err(|e| DocError::template(template, e))
    }
}

fn load_overrides(tera: &mut Tera, dir: &Path) -> Result<()> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let name = file_name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(file_name);
        debug!(template = name, path = %path.display(), "Loading template override");
        tera.add_template_file(&path, Some(name))
            .map_err(|e| DocError::template(name, e))?;
    }
    Ok(())
}

/// Formats an array as double-quoted bash words: `["a", 1]` → `"a" "1"`.
fn bash_words(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let items = value
        .as_array()
        .ok_or_else(|| tera::Error::msg("bash_words filter expects an array"))?;
    let words: Vec<String> = items
        .iter()
        .map(|item| {
            let text = match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("\"{}\"", bash_escape(&text))
        })
        .collect();
    Ok(Value::String(words.join(" ")))
}

/// Escapes the characters bash still interprets inside double quotes.
fn bash_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_embedded_templates_are_loaded() {
        let renderer = TeraRenderer::new(&DocConfig::default()).unwrap();
        assert_eq!(
            renderer.template_names(),
            vec!["completion.sh", "index.html", "inputs.json", "task.wdl", "unit.html"]
        );
    }

    #[test]
    fn test_settings_dir_overrides_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("unit.html.tera"), "custom {{ name }}").unwrap();
        let config = DocConfig {
            settings_dir: Some(PathBuf::from(dir.path())),
            ..Default::default()
        };
        let renderer = TeraRenderer::new(&config).unwrap();
        let out = renderer.render("unit.html", &json!({ "name": "PrintReads" })).unwrap();
        assert_eq!(out, "custom PrintReads");
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let renderer = TeraRenderer::new(&DocConfig::default()).unwrap();
        let err = renderer.render("nope.txt", &json!({})).unwrap_err();
        assert!(matches!(err, DocError::Template { .. }));
    }

    #[test]
    fn test_bash_words_quotes_items() {
        let value = json!(["--input", "say \"hi\"", 3]);
        let out = bash_words(&value, &HashMap::new()).unwrap();
        assert_eq!(out, json!(r#""--input" "say \"hi\"" "3""#));
        assert!(bash_words(&json!("x"), &HashMap::new()).is_err());
    }

    #[test]
    fn test_bash_words_escapes_expansions() {
        let value = json!(["$HOME", "`id`", "a\\b"]);
        let out = bash_words(&value, &HashMap::new()).unwrap();
        assert_eq!(out, json!(r#""\$HOME" "\`id\`" "a\\b""#));
    }
}
