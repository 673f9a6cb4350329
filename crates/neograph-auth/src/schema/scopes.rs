//! `@hasScope` annotations for generated fields.
//!
//! Scopes are `"<Type>: <Operation>"` tokens. Node operations get one scope;
//! relationship mutations are scoped as create/delete on both endpoint types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{AuthConfig, AuthDirective};

/// Operation a generated field performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeOperation {
    /// Node creation.
    Create,
    /// Node read.
    Read,
    /// Node update.
    Update,
    /// Node deletion.
    Delete,
    /// Relationship creation; scoped as `Create` on both endpoints.
    Add,
    /// Relationship removal; scoped as `Delete` on both endpoints.
    Remove,
}

impl ScopeOperation {
    /// Name used in scope tokens.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Add => "Add",
            Self::Remove => "Remove",
        }
    }

    /// Relationship mutations map onto node create/delete.
    #[must_use]
    pub fn for_relation(self) -> Self {
        match self {
            Self::Add => Self::Create,
            Self::Remove => Self::Delete,
            other => other,
        }
    }

    fn is_node_operation(self) -> bool {
        matches!(self, Self::Create | Self::Read | Self::Update | Self::Delete)
    }
}

impl fmt::Display for ScopeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity a field operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// A single node type.
    Node,
    /// A relationship between two node types.
    Relation,
}

/// Input for [`generate_scope`], built per annotated field.
#[derive(Debug, Clone)]
pub struct ScopeDirectiveRequest<'a> {
    /// Type the field operates on.
    pub type_name: &'a str,
    /// Other endpoint type, for relationships.
    pub related_type_name: Option<&'a str>,
    /// Operation the field performs.
    pub operation: ScopeOperation,
    /// Entity kind.
    pub entity: EntityType,
    /// Augmentation configuration.
    pub config: &'a AuthConfig,
}

impl<'a> ScopeDirectiveRequest<'a> {
    /// Request for a node field.
    #[must_use]
    pub fn node(type_name: &'a str, operation: ScopeOperation, config: &'a AuthConfig) -> Self {
        Self {
            type_name,
            related_type_name: None,
            operation,
            entity: EntityType::Node,
            config,
        }
    }

    /// Request for a relationship field between two types.
    #[must_use]
    pub fn relation(
        type_name: &'a str,
        related_type_name: &'a str,
        operation: ScopeOperation,
        config: &'a AuthConfig,
    ) -> Self {
        Self {
            type_name,
            related_type_name: Some(related_type_name),
            operation,
            entity: EntityType::Relation,
            config,
        }
    }
}

/// Formats a single scope token.
#[must_use]
pub fn scope_name(type_name: &str, operation: ScopeOperation) -> String {
    format!("{type_name}: {operation}")
}

fn render(scopes: &[String]) -> String {
    let quoted: Vec<String> = scopes.iter().map(|s| format!("\"{s}\"")).collect();
    format!("hasScope(scopes: [{}])", quoted.join(", "))
}

/// Returns the scopes a request would be annotated with.
#[must_use]
pub fn scopes_for(request: &ScopeDirectiveRequest<'_>) -> Option<Vec<String>> {
    if !request.config.should_enable(AuthDirective::HasScope) {
        return None;
    }

    match request.entity {
        EntityType::Node if request.operation.is_node_operation() => {
            Some(vec![scope_name(request.type_name, request.operation)])
        }
        EntityType::Node => None,
        EntityType::Relation => {
            let related = request.related_type_name?;
            let operation = request.operation.for_relation();
            Some(vec![
                scope_name(request.type_name, operation),
                scope_name(related, operation),
            ])
        }
    }
}

/// Produces the `hasScope` annotation for a field, or `None` when no scope
/// applies.
///
/// ```
/// use neograph_auth::{AuthConfig, AuthDirective, ScopeDirectiveRequest, ScopeOperation, generate_scope};
///
/// let config = AuthConfig::with_directives(&[AuthDirective::HasScope]);
/// let request = ScopeDirectiveRequest::node("Movie", ScopeOperation::Read, &config);
/// assert_eq!(
///     generate_scope(&request).as_deref(),
///     Some(r#"hasScope(scopes: ["Movie: Read"])"#)
/// );
/// ```
#[must_use]
pub fn generate_scope(request: &ScopeDirectiveRequest<'_>) -> Option<String> {
    scopes_for(request).map(|scopes| render(&scopes))
}
