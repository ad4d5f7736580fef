//! Error types for the Lustre provisioner
//!
//! Provides structured error types for request validation, normalization,
//! catalog projection and the collaborators the service talks to.

use thiserror::Error;

/// Unified error type for the provisioner
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid value for --{field}: expected {expected}")]
    InvalidField { field: String, expected: String },

    #[error("Missing required {group} options: {}", .missing.join(", "))]
    MissingRequiredGroup { group: String, missing: Vec<String> },

    /// Mutually exclusive options were both supplied. Part of the caller-facing
    /// taxonomy; no current rule raises it.
    #[error("Conflicting configuration: {0}")]
    ConflictingConfiguration(String),

    #[error(
        "Provide at least one update parameter: maintenance-day/time or root squash fields \
         (root-squash-mode, no-squash-nid-list, squash-uid, squash-gid)"
    )]
    EmptyUpdatePatch,

    #[error("Zone '{zone}' is not supported in location '{location}': {reason}")]
    ZoneUnsupported {
        location: String,
        zone: String,
        reason: String,
    },

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("SKU catalog fetch failed: {0}")]
    CatalogFetchFailed(#[source] Box<Error>),

    #[error("Resource not found: {kind}/{name}")]
    ResourceNotFound { kind: String, name: String },

    #[error("Backend operation failed: {backend} - {operation}: {reason}")]
    BackendOperationFailed {
        backend: String,
        operation: String,
        reason: String,
    },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`], used by callers to map failures
/// onto their own status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidField,
    MissingRequiredGroup,
    ConflictingConfiguration,
    EmptyUpdatePatch,
    ZoneUnsupported,
    CatalogFetchFailed,
    NotFound,
    Backend,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::InvalidField => "invalid_field",
            ErrorKind::MissingRequiredGroup => "missing_required_group",
            ErrorKind::ConflictingConfiguration => "conflicting_configuration",
            ErrorKind::EmptyUpdatePatch => "empty_update_patch",
            ErrorKind::ZoneUnsupported => "zone_unsupported",
            ErrorKind::CatalogFetchFailed => "catalog_fetch_failed",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Backend => "backend_error",
            ErrorKind::Internal => "internal_error",
        };
        f.write_str(s)
    }
}

impl Error {
    /// Shorthand for an [`Error::InvalidField`]
    pub fn invalid_field(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Error::InvalidField {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Shorthand for an [`Error::MissingRequiredGroup`]
    pub fn missing_group<I, S>(group: impl Into<String>, missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Error::MissingRequiredGroup {
            group: group.into(),
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidField { .. } => ErrorKind::InvalidField,
            Error::MissingRequiredGroup { .. } => ErrorKind::MissingRequiredGroup,
            Error::ConflictingConfiguration(_) => ErrorKind::ConflictingConfiguration,
            Error::EmptyUpdatePatch => ErrorKind::EmptyUpdatePatch,
            Error::ZoneUnsupported { .. } => ErrorKind::ZoneUnsupported,
            Error::CatalogFetchFailed(_) => ErrorKind::CatalogFetchFailed,
            Error::ResourceNotFound { .. } => ErrorKind::NotFound,
            Error::BackendOperationFailed { .. } => ErrorKind::Backend,
            Error::Internal(_) | Error::JsonParse(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error was caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidField
                | ErrorKind::MissingRequiredGroup
                | ErrorKind::ConflictingConfiguration
                | ErrorKind::EmptyUpdatePatch
                | ErrorKind::ZoneUnsupported
        )
    }

    /// Check if the calling layer may retry this error.
    ///
    /// The core never retries; this only advises the transport layer.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::BackendOperationFailed { .. } => true,
            Error::CatalogFetchFailed(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}

/// Result type alias for the provisioner
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::invalid_field("sku", "one of AMLFS-Durable-Premium-40");
        assert_eq!(err.kind(), ErrorKind::InvalidField);
        assert!(err.is_validation());

        let err = Error::missing_group("maintenance window", ["maintenance-time"]);
        assert_eq!(err.kind(), ErrorKind::MissingRequiredGroup);
        assert_eq!(
            err.to_string(),
            "Missing required maintenance window options: maintenance-time"
        );

        assert_eq!(Error::EmptyUpdatePatch.kind(), ErrorKind::EmptyUpdatePatch);
    }

    #[test]
    fn test_conflicting_configuration_is_a_validation_error() {
        let err = Error::ConflictingConfiguration("zone with a zone-redundant SKU".into());
        assert_eq!(err.kind(), ErrorKind::ConflictingConfiguration);
        assert_eq!(err.kind().to_string(), "conflicting_configuration");
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_catalog_fetch_wraps_source_verbatim() {
        let inner = Error::BackendOperationFailed {
            backend: "arm".into(),
            operation: "list_skus".into(),
            reason: "throttled".into(),
        };
        let inner_msg = inner.to_string();
        let err = Error::CatalogFetchFailed(Box::new(inner));

        assert_eq!(err.kind(), ErrorKind::CatalogFetchFailed);
        assert!(!err.is_validation());
        assert!(err.is_retryable());
        assert!(err.to_string().ends_with(&inner_msg));
        assert_eq!(
            std::error::Error::source(&err).map(|s| s.to_string()),
            Some(inner_msg)
        );
    }

    #[test]
    fn test_error_retryable() {
        let not_found = Error::ResourceNotFound {
            kind: "AmlFilesystem".into(),
            name: "fs1".into(),
        };
        assert!(!not_found.is_retryable());
        assert!(!not_found.is_validation());

        assert!(!Error::EmptyUpdatePatch.is_retryable());
    }
}
