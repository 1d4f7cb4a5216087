//! Parsing of field type signatures such as `List<Mode>` or `File[]`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScanError;
use crate::model::simple_name;
use crate::types::{CollectionKind, ScalarKind};

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][\w.$]*)\s*(?:<(.*)>)?\s*((?:\[\]\s*)*)$")
        .expect("static regex must compile")
});

/// Parsed, not yet resolved, type signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSignature {
    pub name: String,
    pub params: Vec<TypeSignature>,
    /// Number of trailing `[]` pairs.
    pub array_depth: usize,
}

impl TypeSignature {
    /// Parses a signature.
    ///
    /// # Examples
    ///
    /// ```
    /// use argdoc_core::TypeSignature;
    ///
    /// let sig = TypeSignature::parse("java.util.Map<String, List<Integer>>").unwrap();
    /// assert_eq!(sig.name, "java.util.Map");
    /// assert_eq!(sig.params.len(), 2);
    /// assert_eq!(sig.params[1].params[0].name, "Integer");
    /// ```
    pub fn parse(signature: &str) -> Result<Self, ScanError> {
        let invalid = || ScanError::InvalidTypeSignature {
            signature: signature.to_string(),
        };
        let caps = SIGNATURE_RE.captures(signature).ok_or_else(invalid)?;
        let name = caps[1].to_string();
        let params = match caps.get(2) {
            Some(inner) => split_top_level(inner.as_str())
                .ok_or_else(invalid)?
                .into_iter()
                .map(TypeSignature::parse)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())?,
            None => Vec::new(),
        };
        let array_depth = caps
            .get(3)
            .map_or(0, |m| m.as_str().matches("[]").count());
        Ok(Self {
            name,
            params,
            array_depth,
        })
    }

    /// Scalar kind named by this signature, if any.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        if !self.params.is_empty() {
            return None;
        }
        let kind = match simple_name(&self.name) {
            "boolean" | "Boolean" => ScalarKind::Boolean,
            "byte" | "Byte" => ScalarKind::Byte,
            "short" | "Short" => ScalarKind::Short,
            "int" | "Integer" => ScalarKind::Int,
            "long" | "Long" => ScalarKind::Long,
            "float" | "Float" => ScalarKind::Float,
            "double" | "Double" => ScalarKind::Double,
            "char" | "Character" => ScalarKind::Char,
            "String" | "CharSequence" => ScalarKind::String,
            "File" | "Path" => ScalarKind::File,
            _ => return None,
        };
        Some(kind)
    }

    /// Collection kind named by this signature, if any.
    pub fn collection_kind(&self) -> Option<CollectionKind> {
        let kind = match simple_name(&self.name) {
            "List" | "ArrayList" | "LinkedList" | "Collection" | "Iterable" => {
                CollectionKind::List
            }
            "Set" | "HashSet" | "TreeSet" | "LinkedHashSet" | "SortedSet" | "EnumSet" => {
                CollectionKind::Set
            }
            "Map" | "HashMap" | "TreeMap" | "LinkedHashMap" | "SortedMap" => CollectionKind::Map,
            _ => return None,
        };
        Some(kind)
    }
}

/// Splits `a, B<c, d>, e` at depth-zero commas.
fn split_top_level(inner: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(inner[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(inner[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_array() {
        let sig = TypeSignature::parse("int").unwrap();
        assert_eq!(sig.scalar_kind(), Some(ScalarKind::Int));
        assert_eq!(sig.array_depth, 0);

        let arr = TypeSignature::parse("String[]").unwrap();
        assert_eq!(arr.name, "String");
        assert_eq!(arr.array_depth, 1);
    }

    #[test]
    fn test_parse_nested_generics() {
        let sig = TypeSignature::parse("List<Set<Mode>>").unwrap();
        assert_eq!(sig.collection_kind(), Some(CollectionKind::List));
        assert_eq!(sig.params[0].collection_kind(), Some(CollectionKind::Set));
        assert_eq!(sig.params[0].params[0].name, "Mode");
    }

    #[test]
    fn test_rejects_malformed_signatures() {
        assert!(TypeSignature::parse("List<").is_err());
        assert!(TypeSignature::parse("Map<String,>").is_err());
        assert!(TypeSignature::parse("").is_err());
        assert!(TypeSignature::parse("List<a>>").is_err());
    }
}
