//! Schema augmentation with authorization directives.
//!
//! - [`registry`]: type and directive implementation registries
//! - [`directives`]: `@isAuthenticated`, `@hasRole`, `@hasScope` declarations
//!   and the build-time augmentation functions
//! - [`runtime`]: runtime behavior of the three directives
//! - [`scopes`]: `@hasScope` annotations for generated fields

pub mod directives;
pub mod registry;
pub mod runtime;
pub mod scopes;

pub use directives::{
    DirectiveArgument, DirectiveDeclaration, DirectiveLocation, add_declarations,
    add_implementations, augment_schema, declaration_for,
};
pub use registry::{
    DirectiveImplementationRegistry, DirectiveUse, ROLE_ENUM, RegistryEntry, TypeCategory, TypeEntry,
    TypeRegistry, strip_directive_declarations,
};
pub use runtime::{
    DirectiveImplementation, HasRoleDirective, HasScopeDirective, IsAuthenticatedDirective,
};
pub use scopes::{
    EntityType, ScopeDirectiveRequest, ScopeOperation, generate_scope, scope_name, scopes_for,
};
