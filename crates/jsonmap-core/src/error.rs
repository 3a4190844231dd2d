//! Error types for the jsonmap core library
//!
//! Every failure is reported to the immediate caller of an encode or decode
//! operation; there is no local recovery. Field-level variants carry the
//! qualified field name (`Record.wire_name`) so a failure deep inside a nested
//! record still points at the offending field.

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::FieldDescriptor;
use crate::strategy::StrategyKind;

/// Main error type for jsonmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed substitution spec
    #[error("Format error: field `{field}` has malformed substitution pair `{pair}`: {message}")]
    Format {
        field: String,
        pair: String,
        message: String,
    },

    /// Native value that cannot be written to the wire
    #[error("Encode error: field `{field}` value {value} {message}")]
    Encode {
        field: String,
        value: String,
        message: String,
    },

    /// Wire value that cannot be read into the field
    #[error("Decode error: field `{field}`: {message}")]
    Decode {
        field: String,
        label: Option<String>,
        message: String,
    },

    /// Root value or destination is not a record or a sequence of records
    #[error("Unsupported shape: {shape} ({message})")]
    UnsupportedShape {
        shape: String,
        message: String,
    },

    /// Wire number that does not fit the field's declared numeric type
    #[error("Coercion error: field `{field}` cannot represent {value} as {target}")]
    Coercion {
        field: String,
        value: String,
        target: String,
    },

    /// Failure of one element of a collection
    #[error("Element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Record accessor disagrees with the strategy resolved from its descriptor
    #[error("Strategy mismatch: field `{field}` resolved as {resolved}, accessed as {expected}")]
    StrategyMismatch {
        field: String,
        resolved: StrategyKind,
        expected: StrategyKind,
    },

    /// Malformed JSON input
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Format,
    Encode,
    Decode,
    UnsupportedShape,
    Coercion,
    Internal,
}

impl Error {
    /// Classify the error, looking through element wrappers
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Error::Format { .. } => ErrorKind::Format,
            Error::Encode { .. } => ErrorKind::Encode,
            Error::Decode { .. } | Error::Json { .. } => ErrorKind::Decode,
            Error::UnsupportedShape { .. } => ErrorKind::UnsupportedShape,
            Error::Coercion { .. } => ErrorKind::Coercion,
            Error::StrategyMismatch { .. } | Error::Internal { .. } | Error::Element { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Innermost error beneath any chain of element wrappers
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Element { source, .. } = current {
            current = source;
        }
        current
    }

    /// Index path of the failing element, outermost first
    pub fn element_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::Element { index, source } = current {
            path.push(*index);
            current = source;
        }
        path
    }

    /// Wrap an error with the index of the collection element that produced it
    pub fn element(index: usize, source: Error) -> Self {
        Error::Element {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn format(field: &str, pair: &str, message: impl Into<String>) -> Self {
        Error::Format {
            field: field.to_string(),
            pair: pair.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unmapped_code(field: &FieldDescriptor, value: impl fmt::Display) -> Self {
        Error::Encode {
            field: field.qualified_name(),
            value: value.to_string(),
            message: "has no permitted wire label".to_string(),
        }
    }

    pub(crate) fn unmapped_label(field: &FieldDescriptor, label: &str) -> Self {
        Error::Decode {
            field: field.qualified_name(),
            label: Some(label.to_string()),
            message: format!("label {:?} is not a permitted value", label),
        }
    }

    pub(crate) fn decode(field: &FieldDescriptor, message: impl Into<String>) -> Self {
        Error::Decode {
            field: field.qualified_name(),
            label: None,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported_shape(shape: &str, message: impl Into<String>) -> Self {
        Error::UnsupportedShape {
            shape: shape.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Error for a position a `Record` impl does not know about
    pub fn unknown_field(field: &FieldDescriptor) -> Self {
        Error::internal(format!(
            "record has no field at position {} (`{}`)",
            field.position(),
            field.qualified_name()
        ))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Format => write!(f, "format"),
            ErrorKind::Encode => write!(f, "encode"),
            ErrorKind::Decode => write!(f, "decode"),
            ErrorKind::UnsupportedShape => write!(f, "unsupported-shape"),
            ErrorKind::Coercion => write!(f, "coercion"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Format {
            field: "Animal.type".to_string(),
            pair: "0dog".to_string(),
            message: "missing `:` separator".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Format error: field `Animal.type` has malformed substitution pair `0dog`: missing `:` separator"
        );
    }

    #[test]
    fn test_kind_looks_through_elements() {
        let inner = Error::Coercion {
            field: "Reading.level".to_string(),
            value: "300".to_string(),
            target: "u8".to_string(),
        };
        let err = Error::element(2, Error::element(0, inner));

        assert_eq!(err.kind(), ErrorKind::Coercion);
        assert_eq!(err.element_path(), vec![2, 0]);
        assert!(matches!(err.root_cause(), Error::Coercion { .. }));
        assert!(err.to_string().starts_with("Element 2: Element 0: Coercion error"));
    }

    #[test]
    fn test_json_error_is_decode_kind() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(source);
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::UnsupportedShape.to_string(), "unsupported-shape");
        assert_eq!(ErrorKind::Format.to_string(), "format");
    }
}
