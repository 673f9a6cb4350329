//! # neograph-auth
//!
//! Authorization augmentation for GraphQL schemas backed by generated Cypher.
//!
//! This crate provides:
//! - Classification of inbound operations (node read/create/update/delete,
//!   relationship add/remove, custom Cypher statements)
//! - Dispatch to caller-supplied access-control factories that contribute
//!   extra Cypher fragments to the generated statement
//! - Schema augmentation with the `@isAuthenticated`, `@hasRole` and
//!   `@hasScope` directives, both declarations and runtime implementations
//! - Generation of `@hasScope` annotations for node and relationship fields
//!
//! ## Overview
//!
//! Two phases use this crate. At schema-build time the driver calls
//! [`schema::augment_schema`] (or [`schema::add_declarations`] and
//! [`schema::add_implementations`] separately) and [`schema::generate_scope`]
//! while it assembles the type registry. At request time the serving layer
//! calls [`check_error`], [`classify`] and
//! [`AccessControlDispatcher::dispatch`] while it builds the outgoing
//! statement.
//!
//! ## Configuration
//!
//! ```toml
//! auth = true
//!
//! # or, per directive:
//! # [auth]
//! # isAuthenticated = true
//! # hasScope = true
//!
//! [access_control]
//! default_decision = "allow"
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Directive toggles and access-control policy
//! - [`context`] - Per-request context and the request error checker
//! - [`operations`] - Operation classification
//! - [`access`] - ACL factories, providers and the dispatcher
//! - [`schema`] - Type registry, directive augmentation and scope generation
//! - [`error`] - Error types

pub mod access;
pub mod config;
pub mod context;
pub mod error;
pub mod operations;
pub mod schema;

pub use access::{
    AccessControlDispatcher, AccessControlProvider, AclError, AclFactory, AclOutcome, AclResult,
    dispatch,
};
pub use config::{
    AccessControlConfig, AuthConfig, AuthDirective, AuthSetting, DefaultDecision,
    DirectiveToggles,
};
pub use context::{
    Principal, RequestContext, RequestContextBuilder, RequestError, RequestInfo, check_error,
};
pub use error::AuthError;
pub use operations::{OperationDescriptor, OperationKind, OperationType, ResolveInfo, classify};
pub use schema::{
    DirectiveDeclaration, DirectiveImplementation, DirectiveImplementationRegistry,
    EntityType, ScopeDirectiveRequest, ScopeOperation, TypeRegistry, add_declarations,
    add_implementations, augment_schema, generate_scope,
};

/// Type alias for authorization results.
pub type AuthResult<T> = Result<T, AuthError>;
