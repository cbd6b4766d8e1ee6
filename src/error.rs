use std::fmt::Display;

use serde::{de, ser};
use thiserror::Error;

use crate::path::Path;

/// Errors raised while encoding to or decoding from query items.
///
/// `ValueNotFound`, `TypeMismatch` and `StructuralMismatch` are ordinary
/// decoding failures caused by the input and always carry the path of the
/// offending node. `ContractViolation` signals a programming error in the
/// code driving the engine (writing a leaf twice, leaving a delegated
/// encoder unresolved, nesting deeper than the configured maximum) and is
/// not meant to be handled by normal control flow.
#[derive(Debug, Error)]
pub enum Error {
    #[error("value not found at `{path}`: expected {expected}, found nil")]
    ValueNotFound { path: Path, expected: &'static str },

    #[error("type mismatch at `{path}`: expected {expected}, found `{found}`")]
    TypeMismatch {
        path: Path,
        expected: &'static str,
        found: String,
    },

    #[error("structural mismatch at `{path}`: {message}")]
    StructuralMismatch { path: Path, message: String },

    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("invalid value at `{path}`: {message}")]
    InvalidValue { path: Path, message: String },

    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    #[error("{message}{}", at(.path))]
    Custom {
        path: Option<Path>,
        message: String,
    },
}

fn at(path: &Option<Path>) -> String {
    match path {
        Some(path) if !path.is_root() => format!(" at `{path}`"),
        _ => String::new(),
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn contract<T: Display>(msg: T) -> Self {
        Error::ContractViolation(msg.to_string())
    }

    pub(crate) fn structural<T: Display>(path: &Path, msg: T) -> Self {
        Error::StructuralMismatch {
            path: path.clone(),
            message: msg.to_string(),
        }
    }

    /// Returns true for programming errors rather than bad input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::ContractViolation(_))
    }

    /// The path of the node the error was raised at, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::ValueNotFound { path, .. }
            | Error::TypeMismatch { path, .. }
            | Error::StructuralMismatch { path, .. }
            | Error::InvalidValue { path, .. } => Some(path),
            Error::Custom { path, .. } => path.as_ref(),
            Error::ContractViolation(_) | Error::Unsupported(_) => None,
        }
    }

    /// Attaches `path` to a custom error raised by a serde visitor.
    ///
    /// Errors that already know their location are returned unchanged, so the
    /// innermost path wins as the error bubbles up.
    pub(crate) fn at(self, path: &Path) -> Self {
        match self {
            Error::Custom {
                path: None,
                message,
            } => Error::Custom {
                path: Some(path.clone()),
                message,
            },
            other => other,
        }
    }
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom {
            path: None,
            message: msg.to_string(),
        }
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom {
            path: None,
            message: msg.to_string(),
        }
    }
}
