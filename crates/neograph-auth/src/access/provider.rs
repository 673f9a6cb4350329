//! ACL factories and the provider mapping operation kinds to them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::operations::{OperationDescriptor, OperationKind};

// =============================================================================
// ACL Result
// =============================================================================

/// Cypher fragments an ACL factory contributes to the generated statement.
///
/// The default value carries no fragments and means "no additional
/// constraint". Fragments are trusted and spliced verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AclResult {
    /// Extra `MATCH` patterns, in order.
    pub match_statements: Vec<String>,

    /// Header placed before the generated `MERGE`/`CREATE` clause.
    pub merge_header: String,

    /// Extra `WHERE` predicates, in order.
    pub where_statements: Vec<String>,
}

impl AclResult {
    /// Creates the neutral result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a match pattern.
    #[must_use]
    pub fn with_match(mut self, statement: impl Into<String>) -> Self {
        self.match_statements.push(statement.into());
        self
    }

    /// Sets the merge header.
    #[must_use]
    pub fn with_merge_header(mut self, header: impl Into<String>) -> Self {
        self.merge_header = header.into();
        self
    }

    /// Appends a where predicate.
    #[must_use]
    pub fn with_where(mut self, statement: impl Into<String>) -> Self {
        self.where_statements.push(statement.into());
        self
    }

    /// Returns `true` if no fragments are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.match_statements.is_empty()
            && self.merge_header.is_empty()
            && self.where_statements.is_empty()
    }
}

// =============================================================================
// ACL Factory
// =============================================================================

/// Failure reported by an ACL factory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AclError {
    /// Description of the failure.
    pub message: String,
}

impl AclError {
    /// Creates a new factory error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces additional query constraints for one operation kind.
///
/// Implementations are shared across concurrent requests and may do their own
/// I/O; the dispatcher imposes no ordering or timeout.
pub trait AclFactory: Send + Sync {
    /// Builds the fragments for this request.
    fn build(
        &self,
        context: &RequestContext,
        operation: &OperationDescriptor,
    ) -> Result<AclResult, AclError>;
}

impl<F> AclFactory for F
where
    F: Fn(&RequestContext, &OperationDescriptor) -> Result<AclResult, AclError> + Send + Sync,
{
    fn build(
        &self,
        context: &RequestContext,
        operation: &OperationDescriptor,
    ) -> Result<AclResult, AclError> {
        self(context, operation)
    }
}

/// A fixed result acts as a factory returning a copy of itself.
impl AclFactory for AclResult {
    fn build(
        &self,
        _context: &RequestContext,
        _operation: &OperationDescriptor,
    ) -> Result<AclResult, AclError> {
        Ok(self.clone())
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Mapping from operation kind to the ACL factory covering it.
///
/// Built once per configuration and shared read-only via `Arc`. A kind with no
/// factory is a first-class state, not an error.
#[derive(Clone, Default)]
pub struct AccessControlProvider {
    factories: BTreeMap<OperationKind, Arc<dyn AclFactory>>,
}

impl AccessControlProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for a kind, replacing any previous one.
    ///
    /// Custom statements and unclassified operations never reach a factory,
    /// so registering one for them has no effect on dispatch.
    pub fn register(&mut self, kind: OperationKind, factory: Arc<dyn AclFactory>) {
        self.factories.insert(kind, factory);
    }

    /// Builder-style registration of a closure factory.
    #[must_use]
    pub fn with_factory<F>(mut self, kind: OperationKind, factory: F) -> Self
    where
        F: Fn(&RequestContext, &OperationDescriptor) -> Result<AclResult, AclError>
            + Send
            + Sync
            + 'static,
    {
        self.register(kind, Arc::new(factory));
        self
    }

    /// Builder-style registration of fixed fragments.
    #[must_use]
    pub fn with_static(mut self, kind: OperationKind, result: AclResult) -> Self {
        self.register(kind, Arc::new(result));
        self
    }

    /// Returns the factory registered for a kind.
    #[must_use]
    pub fn factory(&self, kind: OperationKind) -> Option<&Arc<dyn AclFactory>> {
        self.factories.get(&kind)
    }

    /// Returns the kinds that have a factory.
    #[must_use]
    pub fn kinds(&self) -> Vec<OperationKind> {
        self.factories.keys().copied().collect()
    }

    /// Returns the ACL kinds left uncovered by this provider.
    #[must_use]
    pub fn uncovered_kinds(&self) -> Vec<OperationKind> {
        OperationKind::ACL_KINDS
            .into_iter()
            .filter(|kind| !self.factories.contains_key(kind))
            .collect()
    }
}

impl fmt::Debug for AccessControlProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControlProvider")
            .field("kinds", &self.kinds())
            .finish()
    }
}
