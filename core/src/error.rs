//! Error types for model loading, scanning and sorting.

use thiserror::Error;

/// Errors raised while reading a source model from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Fatal errors raised while scanning an argument container.
///
/// Every variant names the declaration (`Class.field`) an author has to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// A referenced class is not described by the model.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// The container class cannot be instantiated from its initializers.
    #[error("class {0} has no no-argument constructor")]
    NoDefaultConstructor(String),

    /// An argument-collection field holds no object to recurse into.
    #[error("argument collection {location} is null")]
    NullCollection { location: String },

    /// An argument-collection field holds a non-object value.
    #[error("argument collection {location} does not hold an object")]
    InvalidCollection { location: String },

    /// Argument collections (or initializers) re-contain their own declaring type.
    #[error("argument collection cycle: {path}")]
    CollectionCycle { path: String },

    /// Two reachable declarations share an argument name.
    #[error("ambiguous argument name '{name}' declared in {first} and {second}")]
    DuplicateArgument {
        name: String,
        first: String,
        second: String,
    },

    /// More than one positional-arguments field is reachable.
    #[error("multiple positional argument fields: {first} and {second}")]
    DuplicatePositional { first: String, second: String },

    /// An argument name is empty or carries a leading dash.
    #[error("invalid argument name '{name}' on {location}")]
    InvalidArgumentName { name: String, location: String },

    /// Numeric bounds declared on a non-numeric argument.
    #[error("numeric bounds declared on non-numeric argument {location} of type {type_name}")]
    BoundsOnNonNumeric { location: String, type_name: String },

    /// Declared bounds are inconsistent (minimum above maximum).
    #[error("invalid bounds on {location}: {detail}")]
    InvalidBounds { location: String, detail: String },

    /// A field type signature could not be parsed.
    #[error("invalid type signature '{signature}'")]
    InvalidTypeSignature { signature: String },

    /// A field carries more than one argument marker.
    #[error("field {location} carries more than one argument marker")]
    ConflictingTags { location: String },

    /// A class references a plugin descriptor the model does not define.
    #[error("unknown plugin descriptor: {0}")]
    UnknownPluginDescriptor(String),
}

/// Errors raised while ordering rendered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// A display name has no leading dash and is not the positional pseudo-name.
    #[error("argument display name '{0}' has no leading dash")]
    UnprefixedName(String),
}
