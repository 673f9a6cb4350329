//! Runtime behavior of the authorization directives.
//!
//! Each implementation checks the request's already-decoded [`Principal`]
//! against the values given to the directive at its application site
//! (`@hasRole(roles: [admin])`, `@hasScope(scopes: ["Movie: Read"])`).
//! Token decoding happens upstream.
//!
//! [`Principal`]: crate::context::Principal

use tracing::{trace, warn};

use crate::AuthResult;
use crate::config::AuthDirective;
use crate::context::{Principal, RequestContext};
use crate::error::AuthError;

/// Runtime behavior attached to a declared directive.
pub trait DirectiveImplementation: Send + Sync {
    /// Directive name without `@`.
    fn name(&self) -> &'static str;

    /// Checks the request against the directive's arguments.
    ///
    /// `values` is the list argument of the directive (roles or scopes); it is
    /// empty for directives without arguments.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` when no principal is present and
    /// `AuthError::Forbidden` when the principal lacks what is required.
    fn authorize(&self, context: &RequestContext, values: &[String]) -> AuthResult<()>;
}

fn principal(context: &RequestContext) -> AuthResult<&Principal> {
    context
        .principal
        .as_ref()
        .ok_or_else(|| AuthError::unauthorized("You are not authenticated"))
}

/// `@isAuthenticated`: any principal passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthenticatedDirective;

impl DirectiveImplementation for IsAuthenticatedDirective {
    fn name(&self) -> &'static str {
        AuthDirective::IsAuthenticated.name()
    }

    fn authorize(&self, context: &RequestContext, _values: &[String]) -> AuthResult<()> {
        principal(context).map(|_| ())
    }
}

/// `@hasRole(roles: [Role])`: the principal needs at least one listed role.
#[derive(Debug, Clone, Default)]
pub struct HasRoleDirective {
    known_roles: Vec<String>,
}

impl HasRoleDirective {
    /// Creates the directive with the values of the schema's `Role` enum.
    ///
    /// Schema augmentation rejects `@hasRole` uses naming other roles, so at
    /// request time such a role can only come from a hand-built schema and is
    /// never satisfied.
    #[must_use]
    pub fn new(known_roles: Vec<String>) -> Self {
        Self { known_roles }
    }

    /// Values of the `Role` enum the directive was built with.
    #[must_use]
    pub fn known_roles(&self) -> &[String] {
        &self.known_roles
    }
}

impl DirectiveImplementation for HasRoleDirective {
    fn name(&self) -> &'static str {
        AuthDirective::HasRole.name()
    }

    fn authorize(&self, context: &RequestContext, values: &[String]) -> AuthResult<()> {
        let principal = principal(context)?;
        let known = |role: &&String| self.known_roles.contains(*role);
        if let Some(unknown) = values.iter().find(|r| !known(r)) {
            warn!(role = %unknown, "@hasRole argument is not a Role value");
        }

        if values.iter().filter(known).any(|role| principal.roles.contains(role)) {
            Ok(())
        } else {
            trace!(subject = %principal.subject, required = ?values, "Role check failed");
            Err(AuthError::forbidden("You are not authorized for this resource"))
        }
    }
}

/// `@hasScope(scopes: [String])`: the principal needs at least one listed scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasScopeDirective;

impl DirectiveImplementation for HasScopeDirective {
    fn name(&self) -> &'static str {
        AuthDirective::HasScope.name()
    }

    fn authorize(&self, context: &RequestContext, values: &[String]) -> AuthResult<()> {
        let principal = principal(context)?;
        if values.iter().any(|scope| principal.scopes.contains(scope)) {
            Ok(())
        } else {
            trace!(subject = %principal.subject, required = ?values, "Scope check failed");
            Err(AuthError::forbidden("You are not authorized for this resource"))
        }
    }
}
