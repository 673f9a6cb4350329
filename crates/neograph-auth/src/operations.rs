//! Operation classification.
//!
//! Maps a resolved root field to the kind of operation it performs. The
//! generated mutation API names its fields with a verb prefix
//! (`CreateMovie`, `UpdateMovie`, `DeleteMovie`, `AddMovieGenres`,
//! `RemoveMovieGenres`); every query field reads nodes.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Root operation type of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// A read.
    Query,
    /// A write.
    Mutation,
}

/// Structured description of the field being resolved, as produced by the
/// schema-generation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveInfo {
    /// Root operation type.
    pub operation: OperationType,

    /// Root field name, e.g. `CreateMovie` or `Movie`.
    pub field_name: String,

    /// Whether the field carries a `@cypher` statement directive.
    #[serde(default)]
    pub has_cypher_directive: bool,
}

impl ResolveInfo {
    /// Describes a query field.
    #[must_use]
    pub fn query(field_name: impl Into<String>) -> Self {
        Self {
            operation: OperationType::Query,
            field_name: field_name.into(),
            has_cypher_directive: false,
        }
    }

    /// Describes a mutation field.
    #[must_use]
    pub fn mutation(field_name: impl Into<String>) -> Self {
        Self {
            operation: OperationType::Mutation,
            field_name: field_name.into(),
            has_cypher_directive: false,
        }
    }

    /// Marks the field as backed by a custom `@cypher` statement.
    #[must_use]
    pub fn with_cypher_directive(mut self) -> Self {
        self.has_cypher_directive = true;
        self
    }
}

/// Classified kind of an inbound operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    /// Query reading nodes.
    NodeRead,
    /// Mutation creating a node.
    NodeCreate,
    /// Mutation updating a node.
    NodeUpdate,
    /// Mutation deleting a node.
    NodeDelete,
    /// Mutation adding a relationship.
    RelationAdd,
    /// Mutation removing a relationship.
    RelationRemove,
    /// Field backed by a custom Cypher statement; owns its authorization.
    CustomStatement,
    /// Mutation whose shape matches none of the generated kinds.
    Unclassified,
}

impl OperationKind {
    /// Kinds that can have an ACL factory.
    pub const ACL_KINDS: [OperationKind; 6] = [
        Self::NodeRead,
        Self::NodeCreate,
        Self::NodeUpdate,
        Self::NodeDelete,
        Self::RelationAdd,
        Self::RelationRemove,
    ];

    /// Name of the access-control entry for this kind, as used in logs and
    /// provider configuration.
    #[must_use]
    pub fn provider_key(self) -> &'static str {
        match self {
            Self::NodeRead => "nodeQuery",
            Self::NodeCreate => "createMutation",
            Self::NodeUpdate => "updateMutation",
            Self::NodeDelete => "deleteMutation",
            Self::RelationAdd => "addRelationship",
            Self::RelationRemove => "removeRelationship",
            Self::CustomStatement => "customStatement",
            Self::Unclassified => "unclassified",
        }
    }

    /// Returns `true` for kinds that mutate data.
    #[must_use]
    pub fn is_mutation(self) -> bool {
        !matches!(self, Self::NodeRead | Self::CustomStatement)
    }

    /// Returns `true` if ACL factories may apply to this kind.
    #[must_use]
    pub fn accepts_acl(self) -> bool {
        Self::ACL_KINDS.contains(&self)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_key())
    }
}

/// Classified operation, created once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    /// Classified kind.
    pub kind: OperationKind,

    /// Root field name the classification was derived from.
    pub field_name: String,

    /// Whether the operation is backed by a caller-supplied statement.
    pub has_custom_statement_directive: bool,
}

impl OperationDescriptor {
    /// Creates a descriptor for an already-known kind.
    #[must_use]
    pub fn new(kind: OperationKind, field_name: impl Into<String>) -> Self {
        Self {
            kind,
            field_name: field_name.into(),
            has_custom_statement_directive: kind == OperationKind::CustomStatement,
        }
    }
}

const MUTATION_PREFIXES: [(&str, OperationKind); 5] = [
    ("Create", OperationKind::NodeCreate),
    ("Update", OperationKind::NodeUpdate),
    ("Delete", OperationKind::NodeDelete),
    ("Add", OperationKind::RelationAdd),
    ("Remove", OperationKind::RelationRemove),
];

/// Classifies the field being resolved.
///
/// A custom statement directive wins over everything else, whatever the root
/// operation type.
#[must_use]
pub fn classify(info: &ResolveInfo) -> OperationDescriptor {
    let kind = if info.has_cypher_directive {
        OperationKind::CustomStatement
    } else {
        match info.operation {
            OperationType::Query => OperationKind::NodeRead,
            OperationType::Mutation => classify_mutation(&info.field_name),
        }
    };

    trace!(field = %info.field_name, kind = %kind, "Classified operation");

    OperationDescriptor {
        kind,
        field_name: info.field_name.clone(),
        has_custom_statement_directive: info.has_cypher_directive,
    }
}

fn classify_mutation(field_name: &str) -> OperationKind {
    MUTATION_PREFIXES
        .iter()
        .find(|(prefix, _)| {
            field_name
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        })
        .map_or(OperationKind::Unclassified, |(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_read_nodes() {
        let op = classify(&ResolveInfo::query("Movie"));
        assert_eq!(op.kind, OperationKind::NodeRead);
        assert!(!op.has_custom_statement_directive);
    }

    #[test]
    fn test_mutation_prefixes() {
        let cases = [
            ("CreateMovie", OperationKind::NodeCreate),
            ("UpdateMovie", OperationKind::NodeUpdate),
            ("DeleteMovie", OperationKind::NodeDelete),
            ("AddMovieGenres", OperationKind::RelationAdd),
            ("RemoveMovieGenres", OperationKind::RelationRemove),
        ];
        for (field, expected) in cases {
            assert_eq!(classify(&ResolveInfo::mutation(field)).kind, expected, "{field}");
        }
    }

    #[test]
    fn test_unknown_mutation_is_unclassified() {
        assert_eq!(
            classify(&ResolveInfo::mutation("MergeMovie")).kind,
            OperationKind::Unclassified
        );
        // Prefix must be followed by a type name.
        assert_eq!(
            classify(&ResolveInfo::mutation("Addendum")).kind,
            OperationKind::Unclassified
        );
        assert_eq!(
            classify(&ResolveInfo::mutation("Create")).kind,
            OperationKind::Unclassified
        );
    }

    #[test]
    fn test_cypher_directive_short_circuits() {
        let query = classify(&ResolveInfo::query("MoviesByYear").with_cypher_directive());
        assert_eq!(query.kind, OperationKind::CustomStatement);
        assert!(query.has_custom_statement_directive);

        let mutation = classify(&ResolveInfo::mutation("CreateMovie").with_cypher_directive());
        assert_eq!(mutation.kind, OperationKind::CustomStatement);
    }

    #[test]
    fn test_kind_properties() {
        assert!(OperationKind::RelationRemove.is_mutation());
        assert!(!OperationKind::NodeRead.is_mutation());
        assert!(!OperationKind::CustomStatement.accepts_acl());
        assert!(!OperationKind::Unclassified.accepts_acl());
        assert_eq!(OperationKind::NodeRead.to_string(), "nodeQuery");
    }
}
