//! Bash tab-completion arrays.
//!
//! Each work unit contributes six parallel arrays, one entry per legal
//! argument. The completion script template turns them into `bash`
//! array literals for the caller script.

use argdoc_core::ArgumentCategory;
use serde::Serialize;

use crate::properties::{ALL_ARGUMENTS, NA, WorkUnitProperties};

/// Maximum occurrence used for unbounded collection arguments.
pub const UNBOUNDED_OCCURS: u32 = 2_147_483_647;

/// Completion data of one work unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionArrays {
    pub legal_args: Vec<String>,
    pub arg_val_types: Vec<String>,
    /// Space-separated mutually exclusive arguments, per argument.
    pub mutex_args: Vec<String>,
    /// Space-separated synonyms, per argument.
    pub alias_args: Vec<String>,
    pub min_occurs: Vec<u32>,
    pub max_occurs: Vec<u32>,
}

/// Builds the completion arrays from a unit's rendered named arguments.
///
/// The positional group has no flag to complete and is skipped.
pub fn completion_arrays(properties: &WorkUnitProperties) -> CompletionArrays {
    let mut arrays = CompletionArrays::default();
    let positional = ArgumentCategory::Positional.as_str();

    for record in properties.arguments(ALL_ARGUMENTS) {
        if record.kind == positional {
            continue;
        }
        arrays.legal_args.push(record.name.clone());
        arrays.arg_val_types.push(record.type_name.clone());
        arrays.mutex_args.push(space_joined(&record.exclusive_of));
        arrays.alias_args.push(space_joined(&record.synonyms));
        arrays
            .min_occurs
            .push(u32::from(record.required == "yes"));
        let max = if record.collection {
            record
                .max_elements
                .parse()
                .unwrap_or(UNBOUNDED_OCCURS)
        } else {
            1
        };
        arrays.max_occurs.push(max);
    }

    arrays
}

fn space_joined(list: &str) -> String {
    if list == NA {
        return String::new();
    }
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::DocConfig;
    use crate::properties::{ArgumentRecord, PropertyMapBuilder};
    use crate::work_unit::WorkUnitShell;

    fn record(name: &str, kind: ArgumentCategory) -> ArgumentRecord {
        ArgumentRecord {
            name: name.into(),
            synonyms: NA.into(),
            required: "no".into(),
            type_name: "int".into(),
            summary: String::new(),
            fulltext: String::new(),
            default_value: "null".into(),
            min_value: NA.into(),
            max_value: NA.into(),
            min_rec_value: NA.into(),
            max_rec_value: NA.into(),
            min_elements: NA.into(),
            max_elements: NA.into(),
            kind: kind.as_str().into(),
            options: vec![],
            attributes: NA.into(),
            other_argument_required: NA.into(),
            exclusive_of: NA.into(),
            collection: false,
            deprecated: false,
            deprecation_detail: None,
            extra: BTreeMap::new(),
        }
    }

    fn shell() -> WorkUnitShell {
        WorkUnitShell {
            class_name: "example.Tool".into(),
            name: "Tool".into(),
            filename: "Tool.html".into(),
            group_name: "Tools".into(),
            group_summary: String::new(),
            summary: String::new(),
            description: String::new(),
            beta: false,
            experimental: false,
            deprecation: None,
        }
    }

    #[test]
    fn test_arrays_follow_sorted_arguments() {
        let mut input = record("--input", ArgumentCategory::Required);
        input.required = "yes".into();
        input.synonyms = "-I".into();
        input.collection = true;
        let mut mode = record("--mode", ArgumentCategory::Optional);
        mode.exclusive_of = "--fast, --slow".into();
        mode.collection = true;
        mode.max_elements = "3".into();
        let positional = record("[NA - Positional]", ArgumentCategory::Positional);

        let groups = BTreeMap::from([
            (ArgumentCategory::Required, vec![input]),
            (ArgumentCategory::Optional, vec![mode]),
            (ArgumentCategory::Positional, vec![positional]),
        ]);
        let props = PropertyMapBuilder::new(&shell(), &DocConfig::default())
            .with_arguments(groups)
            .unwrap()
            .build();

        let arrays = completion_arrays(&props);
        assert_eq!(arrays.legal_args, vec!["--input", "--mode"]);
        assert_eq!(arrays.alias_args, vec!["-I", ""]);
        assert_eq!(arrays.mutex_args, vec!["", "--fast --slow"]);
        assert_eq!(arrays.min_occurs, vec![1, 0]);
        assert_eq!(arrays.max_occurs, vec![UNBOUNDED_OCCURS, 3]);
    }
}
