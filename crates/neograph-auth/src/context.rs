//! Per-request authorization context.
//!
//! The context is constructed by the serving layer for every request. It carries
//! errors recorded upstream (for example by JWT middleware), the access-control
//! provider shared across requests, and the decoded principal.
//!
//! # Example
//!
//! ```ignore
//! use neograph_auth::RequestContextBuilder;
//!
//! let context = RequestContextBuilder::new()
//!     .with_access_control(provider.clone())
//!     .with_principal(Some(principal))
//!     .with_request_id("req-123")
//!     .build();
//!
//! if let Some(err) = neograph_auth::check_error(&context) {
//!     return Err(err.clone().into());
//! }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::access::AccessControlProvider;

/// An error recorded on the request before authorization runs.
///
/// This crate never creates one on its own; it only relays what the serving
/// layer stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    /// Human-readable message.
    pub message: String,

    /// Optional machine-readable code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl RequestError {
    /// Creates a new request error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Transport-level request data.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    /// Error recorded while handling the raw request.
    pub error: Option<RequestError>,
}

/// Already-decoded identity of the caller.
///
/// Token verification happens upstream; this is only the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject identifier.
    pub subject: String,

    /// Granted roles.
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Granted scopes, e.g. `"Movie: Read"`.
    #[serde(default)]
    pub scopes: BTreeSet<String>,
}

impl Principal {
    /// Creates a principal without roles or scopes.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Adds a scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.insert(scope.into());
        self
    }
}

/// Per-request context consumed by the error checker, the dispatcher and the
/// runtime directive implementations.
#[derive(Clone, Default)]
pub struct RequestContext {
    /// Transport-level request data.
    pub req: Option<RequestInfo>,

    /// Error recorded on the context itself.
    pub error: Option<RequestError>,

    /// Access-control provider (None when authorization is not wired).
    pub access_control: Option<Arc<AccessControlProvider>>,

    /// Decoded caller identity (None for unauthenticated requests).
    pub principal: Option<Principal>,

    /// Request ID for tracing and correlation.
    pub request_id: String,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("req", &self.req)
            .field("error", &self.error)
            .field(
                "access_control",
                &self.access_control.as_ref().map(|p| p.kinds()),
            )
            .field("principal", &self.principal)
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl RequestContext {
    /// Returns whether the request carries a principal.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }
}

/// Builder for [`RequestContext`].
#[derive(Default)]
pub struct RequestContextBuilder {
    request_error: Option<RequestError>,
    has_request: bool,
    context_error: Option<RequestError>,
    access_control: Option<Arc<AccessControlProvider>>,
    principal: Option<Principal>,
    request_id: Option<String>,
}

impl RequestContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches transport-level request data without an error.
    #[must_use]
    pub fn with_request(mut self) -> Self {
        self.has_request = true;
        self
    }

    /// Records an error on the transport-level request.
    #[must_use]
    pub fn with_request_error(mut self, error: RequestError) -> Self {
        self.has_request = true;
        self.request_error = Some(error);
        self
    }

    /// Records an error on the context.
    #[must_use]
    pub fn with_context_error(mut self, error: RequestError) -> Self {
        self.context_error = Some(error);
        self
    }

    /// Sets the access-control provider.
    #[must_use]
    pub fn with_access_control(mut self, provider: Arc<AccessControlProvider>) -> Self {
        self.access_control = Some(provider);
        self
    }

    /// Sets the decoded principal.
    #[must_use]
    pub fn with_principal(mut self, principal: Option<Principal>) -> Self {
        self.principal = principal;
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> RequestContext {
        let req = self.has_request.then(|| RequestInfo {
            error: self.request_error,
        });
        RequestContext {
            req,
            error: self.context_error,
            access_control: self.access_control,
            principal: self.principal,
            request_id: self.request_id.unwrap_or_default(),
        }
    }
}

/// Returns the first error recorded on the request, if any.
///
/// The request-scoped error takes priority over the context-scoped one.
/// `None` is the "no error" sentinel.
#[must_use]
pub fn check_error(context: &RequestContext) -> Option<&RequestError> {
    context
        .req
        .as_ref()
        .and_then(|req| req.error.as_ref())
        .or(context.error.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_takes_priority() {
        let ctx = RequestContextBuilder::new()
            .with_request_error(RequestError::new("E1"))
            .with_context_error(RequestError::new("E2"))
            .build();

        assert_eq!(check_error(&ctx).map(|e| e.message.as_str()), Some("E1"));
    }

    #[test]
    fn test_context_error_when_request_clean() {
        let ctx = RequestContextBuilder::new()
            .with_request()
            .with_context_error(RequestError::new("E2"))
            .build();

        assert_eq!(check_error(&ctx).map(|e| e.message.as_str()), Some("E2"));
    }

    #[test]
    fn test_context_error_without_request() {
        let ctx = RequestContextBuilder::new()
            .with_context_error(RequestError::new("E2").with_code("TOKEN_EXPIRED"))
            .build();

        let err = check_error(&ctx).unwrap();
        assert_eq!(err.message, "E2");
        assert_eq!(err.code.as_deref(), Some("TOKEN_EXPIRED"));
    }

    #[test]
    fn test_no_error() {
        let ctx = RequestContext::default();
        assert!(check_error(&ctx).is_none());
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_builder_sets_principal() {
        let ctx = RequestContext::builder()
            .with_principal(Some(Principal::new("user-1").with_role("admin")))
            .with_request_id("req-1")
            .build();

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.request_id, "req-1");
        assert!(ctx.req.is_none());
    }
}
