//! Argument categories, visibility and display-name ordering.
//!
//! Every named argument lands in exactly one [`ArgumentCategory`]. The
//! default [`classify`] applies a fixed precedence; renderers may substitute
//! their own classifier through [`classify_all`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SortError;
use crate::scan::ScanResult;
use crate::types::{ArgumentDefinition, POSITIONAL_ARGUMENT_NAME, PositionalArgumentDefinition};

/// Rendering bucket of an argument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentCategory {
    Required,
    Common,
    Advanced,
    Hidden,
    Deprecated,
    Dependent,
    Optional,
    Positional,
}

impl ArgumentCategory {
    pub const ALL: [ArgumentCategory; 8] = [
        Self::Required,
        Self::Common,
        Self::Advanced,
        Self::Hidden,
        Self::Deprecated,
        Self::Dependent,
        Self::Optional,
        Self::Positional,
    ];

    /// Key under which the category is rendered.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Common => "common",
            Self::Advanced => "advanced",
            Self::Hidden => "hidden",
            Self::Deprecated => "deprecated",
            Self::Dependent => "dependent",
            Self::Optional => "optional",
            Self::Positional => "positional",
        }
    }
}

impl fmt::Display for ArgumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default classification.
///
/// Precedence: plugin-controlled, required, common, advanced, hidden,
/// deprecated, optional. A required argument stays required even when it is
/// also deprecated.
///
/// # Examples
///
/// ```
/// use argdoc_core::{classify, ArgumentCategory, ArgumentDefinition, ScalarKind, TypeDescriptor};
///
/// let mut arg = ArgumentDefinition::new("Tool", "level", TypeDescriptor::Scalar(ScalarKind::Int));
/// arg.long_name = Some("level".into());
/// arg.is_advanced = true;
/// assert_eq!(classify(&arg), ArgumentCategory::Advanced);
///
/// arg.is_optional = false;
/// assert_eq!(classify(&arg), ArgumentCategory::Required);
/// ```
pub fn classify(def: &ArgumentDefinition) -> ArgumentCategory {
    if def.is_controlled_by_plugin() {
        ArgumentCategory::Dependent
    } else if !def.is_optional {
        ArgumentCategory::Required
    } else if def.is_common {
        ArgumentCategory::Common
    } else if def.is_advanced {
        ArgumentCategory::Advanced
    } else if def.is_hidden {
        ArgumentCategory::Hidden
    } else if def.is_deprecated() {
        ArgumentCategory::Deprecated
    } else {
        ArgumentCategory::Optional
    }
}

/// Which arguments reach the rendered output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityPolicy {
    pub include_hidden: bool,
    /// Render plugin-controlled arguments in their own bucket.
    pub show_dependent: bool,
}

impl VisibilityPolicy {
    pub fn is_visible(&self, def: &ArgumentDefinition) -> bool {
        if def.is_hidden && !self.include_hidden {
            return false;
        }
        !def.is_controlled_by_plugin() || self.show_dependent
    }
}

/// Visible arguments of one work unit, bucketed and sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedArguments {
    pub groups: BTreeMap<ArgumentCategory, Vec<ArgumentDefinition>>,
    pub positional: Option<PositionalArgumentDefinition>,
}

impl ClassifiedArguments {
    /// Arguments of `category`, empty when none were classified there.
    pub fn group(&self, category: ArgumentCategory) -> &[ArgumentDefinition] {
        self.groups.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every named argument, in category order.
    pub fn named(&self) -> impl Iterator<Item = (ArgumentCategory, &ArgumentDefinition)> {
        self.groups
            .iter()
            .flat_map(|(category, defs)| defs.iter().map(move |def| (*category, def)))
    }
}

/// Filters `scan` through `policy`, buckets it with `classifier`, and sorts
/// each bucket by display name.
///
/// Mutex targets are narrowed to the arguments that survive the filter, so a
/// rendered argument never names a partner that is not rendered.
pub fn classify_all(
    scan: ScanResult,
    policy: VisibilityPolicy,
    classifier: impl Fn(&ArgumentDefinition) -> ArgumentCategory,
) -> Result<ClassifiedArguments, SortError> {
    let visible: Vec<ArgumentDefinition> = scan
        .named
        .into_iter()
        .filter(|def| policy.is_visible(def))
        .collect();
    let rendered: BTreeSet<String> = visible.iter().map(|def| def.display_name()).collect();

    let mut groups: BTreeMap<ArgumentCategory, Vec<ArgumentDefinition>> = BTreeMap::new();
    for mut def in visible {
        def.mutex_targets.retain(|target| rendered.contains(target));
        groups.entry(classifier(&def)).or_default().push(def);
    }
    for defs in groups.values_mut() {
        sort_by_display_name(defs, |def| def.display_name())?;
    }
    Ok(ClassifiedArguments {
        groups,
        positional: scan.positional,
    })
}

/// Sort key of a rendered name: leading dashes stripped, lowercased.
///
/// # Errors
///
/// Returns [`SortError::UnprefixedName`] for a name with no leading dash,
/// unless it is the positional pseudo-name.
///
/// # Examples
///
/// ```
/// use argdoc_core::sort_key;
///
/// assert_eq!(sort_key("--Output").unwrap(), "output");
/// assert_eq!(sort_key("-O").unwrap(), "o");
/// assert!(sort_key("output").is_err());
/// ```
pub fn sort_key(name: &str) -> Result<String, SortError> {
    if name == POSITIONAL_ARGUMENT_NAME {
        return Ok(normalized(name));
    }
    if !name.starts_with('-') {
        return Err(SortError::UnprefixedName(name.to_string()));
    }
    Ok(normalized(name))
}

fn normalized(name: &str) -> String {
    if name == POSITIONAL_ARGUMENT_NAME {
        return "positional".to_string();
    }
    name.trim_start_matches('-').to_lowercase()
}

fn compare_names(a: &str, b: &str) -> Ordering {
    normalized(a).cmp(&normalized(b)).then_with(|| a.cmp(b))
}

/// Sorts `items` case-insensitively by the display name `name` extracts.
///
/// Every name is checked with [`sort_key`] before anything moves.
pub fn sort_by_display_name<T, N>(items: &mut [T], name: impl Fn(&T) -> N) -> Result<(), SortError>
where
    N: AsRef<str>,
{
    for item in items.iter() {
        sort_key(name(item).as_ref())?;
    }
    items.sort_by(|a, b| compare_names(name(a).as_ref(), name(b).as_ref()));
    Ok(())
}
