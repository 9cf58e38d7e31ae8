//! Error types for typed-arrow-ext.

use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = ExtError> = std::result::Result<T, E>;

/// Coarse classification of an [`ExtError`].
///
/// `Type` covers structural contract violations, `Value` semantic violations on otherwise
/// well-typed input, and `Lookup` the absence of something that was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Structural contract violation.
    Type,
    /// Semantic violation on well-typed input.
    Value,
    /// Something requested does not exist.
    Lookup,
    /// Extension metadata could not be encoded or decoded.
    Metadata,
    /// Failure reported by the Arrow crates.
    Arrow,
}

/// Error raised by registry, extension type and array operations.
#[derive(Debug, Error)]
pub enum ExtError {
    /// The storage type is not acceptable for an extension type.
    #[error("invalid storage type for '{extension}': {message}")]
    InvalidStorage {
        /// Extension basename.
        extension: &'static str,
        /// Human readable reason.
        message: String,
    },
    /// Only root extension types (no bound item class) can be registered.
    #[error("extension type '{name}' is bound to item class '{item_class}' and is not a root")]
    NotRoot {
        /// Identity name of the rejected type.
        name: String,
        /// Name of the bound item class.
        item_class: String,
    },
    /// An item or item class does not fit where it was used.
    #[error("unsupported item class: expected {expected}, got {actual}")]
    UnsupportedItem {
        /// What was expected.
        expected: String,
        /// What was provided.
        actual: String,
    },
    /// No primitive Arrow type exists for an item class.
    #[error("item class '{item_class}' has no primitive Arrow type")]
    NoPrimitiveType {
        /// Name of the item class.
        item_class: String,
    },
    /// A record value was built with the wrong number of fields.
    #[error("record '{record}' expects {expected} fields, got {actual}")]
    Arity {
        /// Record class name.
        record: String,
        /// Declared field count.
        expected: usize,
        /// Provided field count.
        actual: usize,
    },
    /// A required value was null.
    #[error("unexpected null{}", context.as_ref().map(|c| format!(" for {c}")).unwrap_or_default())]
    UnexpectedNull {
        /// Optional field or type context.
        context: Option<String>,
    },
    /// An extension identity name was registered twice.
    #[error("extension type '{name}' is already registered")]
    DuplicateExtension {
        /// Identity name.
        name: String,
    },
    /// Enum members must have distinct names and values.
    #[error("enum '{class}' has duplicate {what} '{member}'")]
    DuplicateMember {
        /// Enum class name.
        class: String,
        /// Either `name` or `value`.
        what: &'static str,
        /// Offending member name or value.
        member: String,
    },
    /// No enum member carries the given value.
    #[error("enum '{class}' has no member with value {value}")]
    InvalidEnumValue {
        /// Enum class name.
        class: String,
        /// Requested value.
        value: i64,
    },
    /// A bulk tensor needs at least one item axis and one value axis.
    #[error("bulk tensor needs at least 2 dimensions, got shape {shape:?}")]
    InsufficientRank {
        /// Shape of the rejected tensor.
        shape: Vec<usize>,
    },
    /// Tensor values do not fill the requested shape.
    #[error("tensor shape {shape:?} needs {expected} values, got {actual}")]
    ShapeMismatch {
        /// Requested shape.
        shape: Vec<usize>,
        /// Product of the shape.
        expected: usize,
        /// Number of values provided.
        actual: usize,
    },
    /// Column lengths disagree.
    #[error("column '{column}' has length {actual}, expected {expected}")]
    LengthMismatch {
        /// Column name.
        column: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// The item class was never registered.
    #[error("item class '{item_class}' is not registered")]
    UnregisteredClass {
        /// Name of the item class.
        item_class: String,
    },
    /// No root extension type supports the item class.
    #[error("no root extension type supports item class '{item_class}'")]
    NoMatchingExtension {
        /// Name of the item class.
        item_class: String,
    },
    /// No extension type is known under this identity name.
    #[error("unknown extension type '{name}'")]
    UnknownExtension {
        /// Identity name.
        name: String,
    },
    /// A record field name is not declared.
    #[error("unknown field '{field}' in record '{record}'")]
    UnknownField {
        /// Record class name.
        record: String,
        /// Requested field name.
        field: String,
    },
    /// An enumeration has no member with this name.
    #[error("enum '{class}' has no member named '{member}'")]
    UnknownMember {
        /// Enum class name.
        class: String,
        /// Requested member name.
        member: String,
    },
    /// The Arrow type has no base item class.
    #[error("no base item class for Arrow type {0}")]
    UnmappedType(DataType),
    /// Index past the end of an array.
    #[error("index {index} out of bounds (len {len})")]
    OutOfBounds {
        /// Requested index.
        index: i64,
        /// Array length.
        len: usize,
    },
    /// Extension metadata is structurally invalid.
    #[error("invalid extension metadata: {message}")]
    InvalidMetadata {
        /// Human readable reason.
        message: String,
    },
    /// JSON encoding or decoding failed.
    #[error("extension metadata json: {0}")]
    Json(#[from] serde_json::Error),
    /// Error reported by the Arrow crates.
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

impl ExtError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStorage { .. }
            | Self::NotRoot { .. }
            | Self::UnsupportedItem { .. }
            | Self::NoPrimitiveType { .. }
            | Self::Arity { .. }
            | Self::UnexpectedNull { .. } => ErrorKind::Type,
            Self::DuplicateExtension { .. }
            | Self::DuplicateMember { .. }
            | Self::InvalidEnumValue { .. }
            | Self::InsufficientRank { .. }
            | Self::ShapeMismatch { .. }
            | Self::LengthMismatch { .. } => ErrorKind::Value,
            Self::UnregisteredClass { .. }
            | Self::NoMatchingExtension { .. }
            | Self::UnknownExtension { .. }
            | Self::UnknownField { .. }
            | Self::UnknownMember { .. }
            | Self::UnmappedType(_)
            | Self::OutOfBounds { .. } => ErrorKind::Lookup,
            Self::InvalidMetadata { .. } | Self::Json(_) => ErrorKind::Metadata,
            Self::Arrow(_) => ErrorKind::Arrow,
        }
    }

    /// Create an invalid storage error.
    pub fn invalid_storage(extension: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidStorage {
            extension,
            message: message.into(),
        }
    }

    /// Create an unsupported item error.
    pub fn unsupported(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::UnsupportedItem {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid metadata error.
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            message: message.into(),
        }
    }

    /// Create an unexpected null error carrying context.
    pub fn unexpected_null(context: impl Into<String>) -> Self {
        Self::UnexpectedNull {
            context: Some(context.into()),
        }
    }
}
