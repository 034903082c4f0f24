use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, LorebookError>;

/// High-level error type shared across Lorebook components.
///
/// Every variant is fatal for the run that produced it. Skipped documents are
/// not errors and never surface here.
#[derive(Debug, Error)]
pub enum LorebookError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("classification error in {}: {message}", .path.display())]
    Classification { path: PathBuf, message: String },
    #[error(
        "the file {} declares a type [{tag}] that is not handled; fix the type tag and re-run",
        .path.display()
    )]
    UnknownType { path: PathBuf, tag: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LorebookError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Wraps an I/O failure with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// File the error points at, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LorebookError::Classification { path, .. }
            | LorebookError::UnknownType { path, .. }
            | LorebookError::Io { path, .. } => Some(path),
            LorebookError::Decode(err) => Some(&err.path),
            LorebookError::Configuration(_) | LorebookError::Serialization(_) => None,
        }
    }

    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            LorebookError::Configuration(msg) => {
                LorebookError::Configuration(format!("{ctx}: {msg}"))
            }
            LorebookError::Serialization(msg) => {
                LorebookError::Serialization(format!("{ctx}: {msg}"))
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for LorebookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failure while fully decoding a metadata block into an article.
#[derive(Debug, Error)]
#[error("decode error in {}: {kind}", .path.display())]
pub struct DecodeError {
    pub path: PathBuf,
    pub kind: DecodeErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The block is not well-formed YAML or not a mapping.
    Structural { message: String },
    /// A required field is absent or empty.
    MissingField { field: String },
    /// A field holds a value outside its accepted domain.
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
    /// Another article in the same corpus already uses this id.
    DuplicateId { id: String, first: PathBuf },
}

impl DecodeErrorKind {
    /// Field the failure is attributed to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeErrorKind::MissingField { field } | DecodeErrorKind::InvalidValue { field, .. } => {
                Some(field)
            }
            DecodeErrorKind::DuplicateId { .. } => Some("id"),
            DecodeErrorKind::Structural { .. } => None,
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::Structural { message } => write!(f, "malformed metadata: {message}"),
            DecodeErrorKind::MissingField { field } => {
                write!(f, "the property '{field}' is required")
            }
            DecodeErrorKind::InvalidValue {
                field,
                value,
                expected,
            } => write!(
                f,
                "value '{value}' is not valid for '{field}' (expected {expected})"
            ),
            DecodeErrorKind::DuplicateId { id, first } => {
                write!(f, "id '{id}' is already used by {}", first.display())
            }
        }
    }
}

impl DecodeError {
    pub fn new(path: impl Into<PathBuf>, kind: DecodeErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn structural(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(
            path,
            DecodeErrorKind::Structural {
                message: message.into(),
            },
        )
    }

    pub fn missing(path: impl Into<PathBuf>, field: impl Into<String>) -> Self {
        Self::new(
            path,
            DecodeErrorKind::MissingField {
                field: field.into(),
            },
        )
    }

    pub fn invalid(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(
            path,
            DecodeErrorKind::InvalidValue {
                field: field.into(),
                value: value.into(),
                expected: expected.into(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_names_file_field_and_value() {
        let err = DecodeError::invalid("docs/a.md", "difficulty", "Wizard", "one of Beginner");
        let msg = err.to_string();
        assert!(msg.contains("docs/a.md"), "{msg}");
        assert!(msg.contains("difficulty"), "{msg}");
        assert!(msg.contains("Wizard"), "{msg}");
        assert_eq!(err.kind.field(), Some("difficulty"));
    }

    #[test]
    fn unknown_type_names_file_and_tag() {
        let err = LorebookError::UnknownType {
            path: PathBuf::from("docs/w.md"),
            tag: "widget".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("docs/w.md") && msg.contains("[widget]"), "{msg}");
        assert_eq!(err.path(), Some(Path::new("docs/w.md")));
    }
}
