//! Access-control dispatch.
//!
//! Custom statements and unclassified operations never receive injected
//! constraints. A missing provider or factory resolves according to the
//! configured [`DefaultDecision`]; with the default `Allow` the operation runs
//! unconstrained, so a partially configured provider grants full access for
//! every kind it does not cover.

use tracing::{debug, trace, warn};

use crate::AuthResult;
use crate::access::provider::AclResult;
use crate::config::{AccessControlConfig, DefaultDecision};
use crate::context::RequestContext;
use crate::error::AuthError;
use crate::operations::{OperationDescriptor, OperationKind};

/// Result of access-control dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclOutcome {
    /// A factory produced fragments for this operation.
    Applied(AclResult),
    /// No provider or factory covers the operation; nothing to add.
    NotApplicable,
    /// ACL is switched off for this operation (custom statement or
    /// unclassified mutation).
    Disabled,
}

impl AclOutcome {
    /// Returns the fragments to splice, or `None` when ACL is disabled.
    ///
    /// `NotApplicable` yields the neutral result.
    #[must_use]
    pub fn fragments(&self) -> Option<AclResult> {
        match self {
            Self::Applied(result) => Some(result.clone()),
            Self::NotApplicable => Some(AclResult::default()),
            Self::Disabled => None,
        }
    }

    /// Returns `true` if a factory was invoked.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Returns `true` if ACL is disabled for the operation.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

/// Dispatches operations to the ACL factories found on the request context.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessControlDispatcher {
    default_decision: DefaultDecision,
}

impl AccessControlDispatcher {
    /// Creates a dispatcher with the given default decision.
    #[must_use]
    pub fn new(default_decision: DefaultDecision) -> Self {
        Self { default_decision }
    }

    /// Creates a dispatcher from configuration.
    #[must_use]
    pub fn from_config(config: &AccessControlConfig) -> Self {
        Self::new(config.default_decision)
    }

    /// Returns the configured default decision.
    #[must_use]
    pub fn default_decision(&self) -> DefaultDecision {
        self.default_decision
    }

    /// Resolves the ACL fragments for an operation.
    ///
    /// # Errors
    ///
    /// - `AuthError::AclFactory` if the factory fails; the failure is passed
    ///   through unchanged.
    /// - `AuthError::AccessDenied` if nothing covers the operation and the
    ///   default decision is `Deny`.
    pub fn dispatch(
        &self,
        context: &RequestContext,
        operation: &OperationDescriptor,
    ) -> AuthResult<AclOutcome> {
        let kind = operation.kind;

        if operation.has_custom_statement_directive || kind == OperationKind::CustomStatement {
            trace!(field = %operation.field_name, "Custom statement owns its ACL");
            return Ok(AclOutcome::Disabled);
        }

        if !kind.accepts_acl() {
            debug!(field = %operation.field_name, kind = %kind, "Operation not classified, ACL disabled");
            return Ok(AclOutcome::Disabled);
        }

        let Some(provider) = context.access_control.as_ref() else {
            trace!(kind = %kind, request_id = %context.request_id, "No access control provider");
            return self.uncovered(kind);
        };

        let Some(factory) = provider.factory(kind) else {
            warn!(
                kind = %kind,
                request_id = %context.request_id,
                decision = ?self.default_decision,
                "Access control provider has no factory for operation kind"
            );
            return self.uncovered(kind);
        };

        let result = factory
            .build(context, operation)
            .map_err(|e| AuthError::AclFactory {
                kind,
                message: e.message,
            })?;

        debug!(
            kind = %kind,
            field = %operation.field_name,
            request_id = %context.request_id,
            match_statements = result.match_statements.len(),
            where_statements = result.where_statements.len(),
            "Applied ACL fragments"
        );

        Ok(AclOutcome::Applied(result))
    }

    fn uncovered(&self, kind: OperationKind) -> AuthResult<AclOutcome> {
        match self.default_decision {
            DefaultDecision::Allow => Ok(AclOutcome::NotApplicable),
            DefaultDecision::Deny => Err(AuthError::AccessDenied { kind }),
        }
    }
}

/// Dispatches with the fail-open default.
///
/// # Errors
///
/// Returns `AuthError::AclFactory` if the factory fails.
pub fn dispatch(
    context: &RequestContext,
    operation: &OperationDescriptor,
) -> AuthResult<AclOutcome> {
    AccessControlDispatcher::default().dispatch(context, operation)
}
