//! Authorization error types.
//!
//! Configuration errors are fatal and surface at schema-build time. Request-time
//! dispatch only fails when an ACL factory fails or when the access-control
//! policy is configured to deny operations without a factory.

use crate::operations::OperationKind;

/// Errors that can occur while augmenting a schema or authorizing a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The augmentation configuration is invalid or inconsistent with the schema.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// The schema document could not be parsed.
    #[error("Schema parse error: {message}")]
    SchemaParse {
        /// Parser diagnostics.
        message: String,
    },

    /// No ACL factory covers the operation and the policy is fail-closed.
    #[error("Access denied: no access control configured for {kind}")]
    AccessDenied {
        /// The operation kind that had no factory.
        kind: OperationKind,
    },

    /// An ACL factory failed while building constraints.
    #[error("ACL factory for {kind} failed: {message}")]
    AclFactory {
        /// The operation kind whose factory failed.
        kind: OperationKind,
        /// The factory's error message.
        message: String,
    },

    /// The request lacks an authenticated principal.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The principal lacks the required role or scope.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `SchemaParse` error.
    #[must_use]
    pub fn schema_parse(message: impl Into<String>) -> Self {
        Self::SchemaParse {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Returns `true` for errors that must halt schema construction.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::SchemaParse { .. })
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::SchemaParse { .. } => "SCHEMA_PARSE_ERROR",
            Self::AccessDenied { .. } => "ACCESS_DENIED",
            Self::AclFactory { .. } => "ACL_FACTORY_ERROR",
            Self::Unauthorized { .. } => "UNAUTHENTICATED",
            Self::Forbidden { .. } => "FORBIDDEN",
        }
    }

    /// Returns the HTTP status code a serving layer should respond with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration { .. } | Self::SchemaParse { .. } | Self::AclFactory { .. } => 500,
            Self::Unauthorized { .. } => 401,
            Self::AccessDenied { .. } | Self::Forbidden { .. } => 403,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::configuration("x").status_code(), 500);
        assert_eq!(AuthError::unauthorized("x").status_code(), 401);
        assert_eq!(AuthError::forbidden("x").status_code(), 403);
        assert_eq!(
            AuthError::AccessDenied {
                kind: OperationKind::NodeDelete
            }
            .status_code(),
            403
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AuthError::schema_parse("bad").error_code(),
            "SCHEMA_PARSE_ERROR"
        );
        assert_eq!(
            AuthError::AclFactory {
                kind: OperationKind::NodeRead,
                message: "boom".into()
            }
            .error_code(),
            "ACL_FACTORY_ERROR"
        );
    }

    #[test]
    fn test_fatal_errors() {
        assert!(AuthError::configuration("missing Role").is_fatal());
        assert!(!AuthError::forbidden("no role").is_fatal());
    }

    #[test]
    fn test_display_names_provider_key() {
        let err = AuthError::AccessDenied {
            kind: OperationKind::RelationAdd,
        };
        assert_eq!(
            err.to_string(),
            "Access denied: no access control configured for addRelationship"
        );
    }
}
