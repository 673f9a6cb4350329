//! Authorization directive augmentation.
//!
//! Adds declarations for `@isAuthenticated`, `@hasRole` and `@hasScope` to the
//! type registry and registers their runtime implementations:
//!
//! ```graphql
//! directive @isAuthenticated on OBJECT | FIELD_DEFINITION
//! directive @hasRole(roles: [Role]) on OBJECT | FIELD_DEFINITION
//! directive @hasScope(scopes: [String]) on OBJECT | FIELD_DEFINITION
//! ```
//!
//! Declarations and implementations are driven by the same enable decision, so
//! the two registries stay in sync as long as both functions receive the same
//! configuration. [`augment_schema`] does exactly that.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::AuthResult;
use crate::config::{AuthConfig, AuthDirective};
use crate::error::AuthError;
use crate::schema::registry::{DirectiveImplementationRegistry, ROLE_ENUM, TypeRegistry};
use crate::schema::runtime::{HasRoleDirective, HasScopeDirective, IsAuthenticatedDirective};

// =============================================================================
// Declarations
// =============================================================================

/// Where a directive may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    /// `QUERY`
    Query,
    /// `MUTATION`
    Mutation,
    /// `SUBSCRIPTION`
    Subscription,
    /// `FIELD`
    Field,
    /// `FRAGMENT_DEFINITION`
    FragmentDefinition,
    /// `FRAGMENT_SPREAD`
    FragmentSpread,
    /// `INLINE_FRAGMENT`
    InlineFragment,
    /// `VARIABLE_DEFINITION`
    VariableDefinition,
    /// `SCHEMA`
    Schema,
    /// `SCALAR`
    Scalar,
    /// `OBJECT`
    Object,
    /// `FIELD_DEFINITION`
    FieldDefinition,
    /// `ARGUMENT_DEFINITION`
    ArgumentDefinition,
    /// `INTERFACE`
    Interface,
    /// `UNION`
    Union,
    /// `ENUM`
    Enum,
    /// `ENUM_VALUE`
    EnumValue,
    /// `INPUT_OBJECT`
    InputObject,
    /// `INPUT_FIELD_DEFINITION`
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// The SDL spelling of the location.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::VariableDefinition => "VARIABLE_DEFINITION",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directive argument: name and SDL type reference (e.g. `[Role]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveArgument {
    /// Argument name.
    pub name: String,
    /// SDL type reference.
    pub type_ref: String,
}

impl DirectiveArgument {
    /// Creates a new argument.
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
        }
    }
}

/// A directive declaration as it appears in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveDeclaration {
    /// Directive name without `@`.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Arguments, in order.
    pub arguments: Vec<DirectiveArgument>,
    /// Allowed locations.
    pub locations: Vec<DirectiveLocation>,
}

impl DirectiveDeclaration {
    /// Creates a declaration without arguments or locations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        self.arguments.push(DirectiveArgument::new(name, type_ref));
        self
    }

    /// Sets the allowed locations.
    #[must_use]
    pub fn on(mut self, locations: &[DirectiveLocation]) -> Self {
        self.locations = locations.to_vec();
        self
    }

    /// Renders the declaration as SDL.
    #[must_use]
    pub fn to_sdl(&self) -> String {
        let mut sdl = String::new();
        if let Some(description) = &self.description {
            sdl.push_str(&format!("\"\"\"{description}\"\"\"\n"));
        }
        sdl.push_str("directive @");
        sdl.push_str(&self.name);
        if !self.arguments.is_empty() {
            let args: Vec<String> = self
                .arguments
                .iter()
                .map(|a| format!("{}: {}", a.name, a.type_ref))
                .collect();
            sdl.push_str(&format!("({})", args.join(", ")));
        }
        let locations: Vec<&str> = self.locations.iter().map(|l| l.as_str()).collect();
        sdl.push_str(" on ");
        sdl.push_str(&locations.join(" | "));
        sdl
    }
}

const AUTH_LOCATIONS: [DirectiveLocation; 2] =
    [DirectiveLocation::Object, DirectiveLocation::FieldDefinition];

/// The declaration added for an authorization directive.
#[must_use]
pub fn declaration_for(directive: AuthDirective) -> DirectiveDeclaration {
    let declaration = DirectiveDeclaration::new(directive.name()).on(&AUTH_LOCATIONS);
    match directive {
        AuthDirective::IsAuthenticated => declaration,
        AuthDirective::HasRole => declaration.with_argument("roles", format!("[{ROLE_ENUM}]")),
        AuthDirective::HasScope => declaration.with_argument("scopes", "[String]"),
    }
}

fn require_role_enum(registry: &TypeRegistry) -> AuthResult<()> {
    let Some(roles) = registry.enum_values(ROLE_ENUM) else {
        return Err(AuthError::configuration(format!(
            "@hasRole is enabled but the schema has no `{ROLE_ENUM}` enum"
        )));
    };

    for directive_use in registry.directive_uses() {
        if directive_use.directive != AuthDirective::HasRole {
            continue;
        }
        if let Some(unknown) = directive_use.values.iter().find(|r| !roles.contains(*r)) {
            return Err(AuthError::configuration(format!(
                "@hasRole on {} references `{unknown}`, which is not a {ROLE_ENUM} value",
                directive_use.site
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Augmentation
// =============================================================================

/// Adds declarations for every enabled authorization directive.
///
/// Idempotent. The `Role` precondition is checked before anything is inserted,
/// so a failed call leaves the registry untouched.
///
/// # Errors
///
/// Returns `AuthError::Configuration` if `@hasRole` is enabled and the
/// registry has no `Role` enum, or a `@hasRole` use names a role outside it.
pub fn add_declarations(registry: &mut TypeRegistry, config: &AuthConfig) -> AuthResult<()> {
    let enabled = config.enabled_directives();
    if enabled.contains(&AuthDirective::HasRole) {
        require_role_enum(registry)?;
    }

    for directive in enabled {
        debug!(directive = %directive, "Adding directive declaration");
        registry.insert_directive(declaration_for(directive));
    }
    Ok(())
}

/// Registers runtime implementations for every enabled authorization directive.
///
/// # Errors
///
/// Returns `AuthError::Configuration` if `@hasRole` is enabled and the type
/// registry has no `Role` enum, or a `@hasRole` use names a role outside it.
pub fn add_implementations(
    implementations: &mut DirectiveImplementationRegistry,
    types: &TypeRegistry,
    config: &AuthConfig,
) -> AuthResult<()> {
    let enabled = config.enabled_directives();
    if enabled.contains(&AuthDirective::HasRole) {
        require_role_enum(types)?;
    }

    for directive in enabled {
        debug!(directive = %directive, "Registering directive implementation");
        match directive {
            AuthDirective::IsAuthenticated => {
                implementations.register(Arc::new(IsAuthenticatedDirective));
            }
            AuthDirective::HasRole => {
                let roles = types.enum_values(ROLE_ENUM).unwrap_or_default().to_vec();
                implementations.register(Arc::new(HasRoleDirective::new(roles)));
            }
            AuthDirective::HasScope => {
                implementations.register(Arc::new(HasScopeDirective));
            }
        }
    }
    Ok(())
}

/// Adds declarations and implementations with one configuration.
///
/// # Errors
///
/// Returns `AuthError::Configuration` if `@hasRole` is enabled without a
/// `Role` enum; neither registry is modified in that case.
pub fn augment_schema(
    types: &mut TypeRegistry,
    implementations: &mut DirectiveImplementationRegistry,
    config: &AuthConfig,
) -> AuthResult<()> {
    add_declarations(types, config)?;
    add_implementations(implementations, types, config)?;

    info!(
        directives = ?config.enabled_directives(),
        "Schema augmented with authorization directives"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::registry::{DirectiveUse, TypeEntry};

    fn registry_with_role() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.insert_type(TypeEntry::enumeration(ROLE_ENUM, ["reader", "admin"]));
        registry
    }

    #[test]
    fn test_declaration_sdl() {
        assert_eq!(
            declaration_for(AuthDirective::IsAuthenticated).to_sdl(),
            "directive @isAuthenticated on OBJECT | FIELD_DEFINITION"
        );
        assert_eq!(
            declaration_for(AuthDirective::HasRole).to_sdl(),
            "directive @hasRole(roles: [Role]) on OBJECT | FIELD_DEFINITION"
        );
        assert_eq!(
            declaration_for(AuthDirective::HasScope).to_sdl(),
            "directive @hasScope(scopes: [String]) on OBJECT | FIELD_DEFINITION"
        );
    }

    #[test]
    fn test_disabled_config_adds_nothing() {
        let mut registry = TypeRegistry::new();
        add_declarations(&mut registry, &AuthConfig::default()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_all_directives() {
        let mut registry = registry_with_role();
        add_declarations(&mut registry, &AuthConfig::all()).unwrap();
        assert_eq!(
            registry.directive_names(),
            vec!["isAuthenticated", "hasRole", "hasScope"]
        );
    }

    #[test]
    fn test_has_role_requires_role_enum() {
        let mut registry = TypeRegistry::new();
        registry.insert_type(TypeEntry::object("Movie"));
        let before = registry.clone();

        let err = add_declarations(&mut registry, &AuthConfig::all()).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
        assert_eq!(registry, before);
    }

    #[test]
    fn test_unknown_role_use_fails_at_build_time() {
        let mut types = registry_with_role();
        types.record_use(DirectiveUse {
            directive: AuthDirective::HasRole,
            site: "Movie.rating".to_string(),
            values: vec!["admin".to_string(), "superuser".to_string()],
        });
        let before = types.clone();
        let mut implementations = DirectiveImplementationRegistry::new();

        let err = augment_schema(&mut types, &mut implementations, &AuthConfig::all()).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("superuser"));
        assert_eq!(types, before);
        assert!(implementations.is_empty());

        // Without hasRole the use is not checked.
        let config = AuthConfig::with_directives(&[AuthDirective::IsAuthenticated]);
        assert!(augment_schema(&mut types, &mut implementations, &config).is_ok());
    }

    #[test]
    fn test_scope_only_does_not_need_role() {
        let mut registry = TypeRegistry::new();
        let config = AuthConfig::with_directives(&[AuthDirective::HasScope]);
        add_declarations(&mut registry, &config).unwrap();
        assert_eq!(registry.directive_names(), vec!["hasScope"]);
    }

    #[test]
    fn test_idempotent() {
        let config = AuthConfig::all();
        let mut once = registry_with_role();
        add_declarations(&mut once, &config).unwrap();

        let mut twice = registry_with_role();
        add_declarations(&mut twice, &config).unwrap();
        add_declarations(&mut twice, &config).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_implementations_mirror_declarations() {
        let config = AuthConfig::with_directives(&[
            AuthDirective::IsAuthenticated,
            AuthDirective::HasRole,
        ]);
        let mut types = registry_with_role();
        let mut implementations = DirectiveImplementationRegistry::new();
        augment_schema(&mut types, &mut implementations, &config).unwrap();

        assert_eq!(types.directive_names(), implementations.names());
    }

    #[test]
    fn test_implementations_require_role_enum() {
        let mut implementations = DirectiveImplementationRegistry::new();
        let err = add_implementations(
            &mut implementations,
            &TypeRegistry::new(),
            &AuthConfig::with_directives(&[AuthDirective::HasRole]),
        )
        .unwrap_err();
        assert!(err.is_fatal());
        assert!(implementations.is_empty());
    }
}
