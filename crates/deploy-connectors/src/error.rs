//! Error types for value conversion and registry setup.
//!
//! Reference resolution never surfaces here: an unresolvable reference is
//! dropped from the converted value instead. Only encoding violations,
//! unsupported multiplicity and configuration mistakes are errors.

use thiserror::Error;

use crate::model::EditorAlias;

/// Error codes grouping [`ConnectorError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// C001: Value shape the connector cannot encode
    UnsupportedValue,
    /// C002: Portable value is corrupt or uses an unknown encoding
    CorruptValue,
    /// C003: Target property or collaborator is missing
    MissingTarget,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "C001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedValue => "C001",
            ErrorCode::CorruptValue => "C002",
            ErrorCode::MissingTarget => "C003",
        }
    }
}

/// Terminal failure converting a single property.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectorError {
    // === C001: Unsupported value ===
    #[error("[C001] value of type {kind} is not supported")]
    UnsupportedValueType { kind: &'static str },

    #[error("[C001] property {alias:?} references more than one file: {value:?}")]
    MultipleFiles { alias: String, value: String },

    // === C002: Corrupt value ===
    #[error("[C002] invalid value prefix {prefix:?}")]
    InvalidPrefix { prefix: char },

    #[error("[C002] cannot parse {kind} from {value:?}: {reason}")]
    MalformedValue {
        kind: &'static str,
        value: String,
        reason: String,
    },

    // === C003: Missing target ===
    #[error("[C003] no property exists with alias {alias:?}")]
    PropertyNotFound { alias: String },

    #[error("[C003] connector registry is no longer available")]
    RegistryUnavailable,
}

impl ConnectorError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConnectorError::UnsupportedValueType { .. } | ConnectorError::MultipleFiles { .. } => {
                ErrorCode::UnsupportedValue
            }
            ConnectorError::InvalidPrefix { .. } | ConnectorError::MalformedValue { .. } => {
                ErrorCode::CorruptValue
            }
            ConnectorError::PropertyNotFound { .. } | ConnectorError::RegistryUnavailable => {
                ErrorCode::MissingTarget
            }
        }
    }
}

/// Misconfiguration detected while building a connector registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("editor alias {alias} is claimed by more than one connector")]
    DuplicateEditorAlias { alias: EditorAlias },
}

/// Failure reported by an external collaborator (entity service, media store).
///
/// Connectors treat this exactly like "not found".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{service} lookup failed: {message}")]
pub struct LookupError {
    pub service: &'static str,
    pub message: String,
}

impl LookupError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ConnectorError::InvalidPrefix { prefix: 'x' };
        assert_eq!(err.code().code(), "C002");
        assert_eq!(err.to_string(), "[C002] invalid value prefix 'x'");

        let err = ConnectorError::MultipleFiles {
            alias: "upload".to_string(),
            value: "a.jpg,b.jpg".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::UnsupportedValue);
    }

    #[test]
    fn test_registry_error_message() {
        let err = RegistryError::DuplicateEditorAlias {
            alias: EditorAlias::Grid,
        };
        assert_eq!(
            err.to_string(),
            "editor alias Umbraco.Grid is claimed by more than one connector"
        );
    }
}
