use std::{fmt, io};

use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DocmarkError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("Processor error: {0}")]
    Processor(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("Resolver failure while resolving '{reference}' in scope '{scope}': {message}")]
    Resolver {
        scope: String,
        reference: String,
        message: String,
    },
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl DocmarkError {
    /// Construct the fatal resolver-malfunction variant. A resolver returning
    /// this aborts the whole processing run, unlike an ordinary `None` lookup
    /// miss which degrades to fallback rendering.
    pub fn resolver(
        scope: impl Into<String>,
        reference: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DocmarkError::Resolver {
            scope: scope.into(),
            reference: reference.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for DocmarkError {
    fn from(src: toml::de::Error) -> DocmarkError {
        DocmarkError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for DocmarkError {
    fn from(src: toml::ser::Error) -> DocmarkError {
        DocmarkError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for DocmarkError {
    fn from(src: JsonError) -> DocmarkError {
        DocmarkError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<RegexError> for DocmarkError {
    fn from(x: RegexError) -> Self {
        DocmarkError::Serialization(format!("Regex parse failed: {x}"))
    }
}

impl From<io::Error> for DocmarkError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => DocmarkError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => DocmarkError::PermissionDenied,
            _ => DocmarkError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for DocmarkError {
    fn from(x: fmt::Error) -> Self {
        DocmarkError::Processor(format!("{x}"))
    }
}
