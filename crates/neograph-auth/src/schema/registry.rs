//! Type and directive registries.
//!
//! [`TypeRegistry`] holds the schema's named definitions in declaration order;
//! directive declarations live in the same namespace under their directive
//! name. [`DirectiveImplementationRegistry`] holds the runtime behavior for
//! each declared directive.

use std::fmt;
use std::sync::Arc;

use async_graphql_parser::Pos;
use async_graphql_parser::types::{
    ConstDirective, DirectiveDefinition, DirectiveLocation as ParsedLocation, TypeDefinition, TypeKind,
    TypeSystemDefinition,
};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::AuthResult;
use crate::config::AuthDirective;
use crate::error::AuthError;
use crate::schema::directives::{DirectiveArgument, DirectiveDeclaration, DirectiveLocation};
use crate::schema::runtime::DirectiveImplementation;

/// Name of the enum listing the roles accepted by `@hasRole`.
pub const ROLE_ENUM: &str = "Role";

// =============================================================================
// Type Registry
// =============================================================================

/// Category of a named type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// `scalar`
    Scalar,
    /// `type`
    Object,
    /// `interface`
    Interface,
    /// `union`
    Union,
    /// `enum`
    Enum,
    /// `input`
    InputObject,
}

/// A named type known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Type name.
    pub name: String,
    /// Type category.
    pub category: TypeCategory,
    /// Enum values; empty for non-enum types.
    pub enum_values: Vec<String>,
}

impl TypeEntry {
    /// Creates an enum entry.
    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            category: TypeCategory::Enum,
            enum_values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an object type entry.
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: TypeCategory::Object,
            enum_values: Vec::new(),
        }
    }
}

/// A registry entry: a type or a directive declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEntry {
    /// Named type.
    Type(TypeEntry),
    /// Directive declaration.
    Directive(DirectiveDeclaration),
}

/// An authorization directive applied to a type or field in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveUse {
    /// The applied directive.
    pub directive: AuthDirective,
    /// `Type` or `Type.field`.
    pub site: String,
    /// String and enum argument values, lists flattened.
    pub values: Vec<String>,
}

impl DirectiveUse {
    fn from_parsed(site: String, directive: &ConstDirective) -> Option<Self> {
        let applied = directive.name.node.as_str().parse::<AuthDirective>().ok()?;
        let mut values = Vec::new();
        for (_, value) in &directive.arguments {
            match value.node.clone().into_json() {
                Ok(serde_json::Value::Array(items)) => values.extend(
                    items
                        .into_iter()
                        .filter_map(|item| item.as_str().map(str::to_string)),
                ),
                Ok(serde_json::Value::String(single)) => values.push(single),
                _ => {}
            }
        }
        Some(Self {
            directive: applied,
            site,
            values,
        })
    }
}

/// Named schema definitions, keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    entries: IndexMap<String, RegistryEntry>,
    uses: Vec<DirectiveUse>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from an SDL document.
    ///
    /// Type extensions are folded into the base definition: enum values are
    /// appended, everything else keeps the first definition.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SchemaParse` if the document is not valid SDL.
    pub fn from_sdl(sdl: &str) -> AuthResult<Self> {
        let document = async_graphql_parser::parse_schema(sdl)
            .map_err(|e| AuthError::schema_parse(e.to_string()))?;

        let mut registry = Self::new();
        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Type(ty) => {
                    registry.record_parsed_uses(&ty.node);
                    registry.insert_parsed_type(ty.node);
                }
                TypeSystemDefinition::Directive(directive) => {
                    let declaration = declaration_from_parsed(directive.node);
                    registry.insert_directive(declaration);
                }
                TypeSystemDefinition::Schema(_) => {}
            }
        }

        debug!(entries = registry.len(), "Built type registry from SDL");
        Ok(registry)
    }

    fn record_parsed_uses(&mut self, ty: &TypeDefinition) {
        let type_name = ty.name.node.as_str();
        for directive in &ty.directives {
            self.uses
                .extend(DirectiveUse::from_parsed(type_name.to_string(), &directive.node));
        }

        let fields = match &ty.kind {
            TypeKind::Object(object) => object.fields.as_slice(),
            TypeKind::Interface(interface) => interface.fields.as_slice(),
            _ => &[][..],
        };
        for field in fields {
            let site = format!("{type_name}.{}", field.node.name.node);
            for directive in &field.node.directives {
                self.uses
                    .extend(DirectiveUse::from_parsed(site.clone(), &directive.node));
            }
        }
    }

    fn insert_parsed_type(&mut self, ty: TypeDefinition) {
        let name = ty.name.node.to_string();
        let (category, enum_values) = match ty.kind {
            TypeKind::Scalar => (TypeCategory::Scalar, Vec::new()),
            TypeKind::Object(_) => (TypeCategory::Object, Vec::new()),
            TypeKind::Interface(_) => (TypeCategory::Interface, Vec::new()),
            TypeKind::Union(_) => (TypeCategory::Union, Vec::new()),
            TypeKind::InputObject(_) => (TypeCategory::InputObject, Vec::new()),
            TypeKind::Enum(e) => (
                TypeCategory::Enum,
                e.values
                    .into_iter()
                    .map(|v| v.node.value.node.to_string())
                    .collect(),
            ),
        };

        match self.entries.get_mut(&name) {
            Some(RegistryEntry::Type(existing)) if ty.extend => {
                existing.enum_values.extend(enum_values);
            }
            Some(_) => {
                trace!(name = %name, "Duplicate definition ignored");
            }
            None => {
                self.entries.insert(
                    name.clone(),
                    RegistryEntry::Type(TypeEntry {
                        name,
                        category,
                        enum_values,
                    }),
                );
            }
        }
    }

    /// Inserts a type, replacing any entry with the same name.
    pub fn insert_type(&mut self, entry: TypeEntry) {
        self.entries
            .insert(entry.name.clone(), RegistryEntry::Type(entry));
    }

    /// Inserts a directive declaration under its name.
    ///
    /// Replacing an existing entry keeps its position, so repeated inserts
    /// leave the registry unchanged.
    pub fn insert_directive(&mut self, declaration: DirectiveDeclaration) {
        self.entries.insert(
            declaration.name.clone(),
            RegistryEntry::Directive(declaration),
        );
    }

    /// Returns the entry registered under a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Returns `true` if an entry with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the type registered under a name.
    #[must_use]
    pub fn type_entry(&self, name: &str) -> Option<&TypeEntry> {
        match self.entries.get(name) {
            Some(RegistryEntry::Type(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Returns the values of an enum type.
    #[must_use]
    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.type_entry(name)
            .filter(|entry| entry.category == TypeCategory::Enum)
            .map(|entry| entry.enum_values.as_slice())
    }

    /// Returns `true` if an enum with the given name exists.
    #[must_use]
    pub fn has_enum(&self, name: &str) -> bool {
        self.enum_values(name).is_some()
    }

    /// Returns the directive declaration registered under a name.
    #[must_use]
    pub fn directive(&self, name: &str) -> Option<&DirectiveDeclaration> {
        match self.entries.get(name) {
            Some(RegistryEntry::Directive(declaration)) => Some(declaration),
            _ => None,
        }
    }

    /// Names of all directive declarations, in registry order.
    #[must_use]
    pub fn directive_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry, RegistryEntry::Directive(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records an applied authorization directive.
    pub fn record_use(&mut self, directive_use: DirectiveUse) {
        self.uses.push(directive_use);
    }

    /// Authorization directives applied in the schema, in source order.
    #[must_use]
    pub fn directive_uses(&self) -> &[DirectiveUse] {
        &self.uses
    }

    /// Directive declarations that are new or differ from `before`, in
    /// registry order.
    #[must_use]
    pub fn changed_directives<'a>(
        &'a self,
        before: &TypeRegistry,
    ) -> Vec<&'a DirectiveDeclaration> {
        self.entries
            .values()
            .filter_map(|entry| match entry {
                RegistryEntry::Directive(declaration) => Some(declaration),
                RegistryEntry::Type(_) => None,
            })
            .filter(|declaration| before.directive(&declaration.name) != Some(*declaration))
            .collect()
    }

    /// Renders every directive declaration as SDL, in registry order.
    #[must_use]
    pub fn directives_sdl(&self) -> String {
        self.entries
            .values()
            .filter_map(|entry| match entry {
                RegistryEntry::Directive(declaration) => Some(declaration.to_sdl()),
                RegistryEntry::Type(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Removes the named directive declarations from SDL text.
///
/// Every other definition is kept verbatim. A removed declaration takes its
/// description and the trailing text up to the next definition with it.
///
/// # Errors
///
/// Returns `AuthError::SchemaParse` if the SDL cannot be parsed.
pub fn strip_directive_declarations(sdl: &str, names: &[&str]) -> AuthResult<String> {
    let document =
        async_graphql_parser::parse_schema(sdl).map_err(|e| AuthError::schema_parse(e.to_string()))?;

    let mut starts = Vec::with_capacity(document.definitions.len());
    let mut removed = Vec::new();
    for definition in &document.definitions {
        let pos = match definition {
            TypeSystemDefinition::Schema(schema) => schema.pos,
            TypeSystemDefinition::Type(ty) => ty.pos,
            TypeSystemDefinition::Directive(directive) => {
                if names.contains(&directive.node.name.node.as_str()) {
                    removed.push(starts.len());
                }
                directive.pos
            }
        };
        starts.push(byte_offset(sdl, pos));
    }

    let mut output = String::with_capacity(sdl.len());
    let mut cursor = 0;
    for index in removed {
        let start = starts[index];
        let end = starts.get(index + 1).copied().unwrap_or(sdl.len());
        output.push_str(&sdl[cursor..start]);
        cursor = end;
        trace!(offset = start, "Stripped directive declaration");
    }
    output.push_str(&sdl[cursor..]);
    Ok(output)
}

/// Converts a one-based line/column (columns count chars) into a byte offset.
fn byte_offset(sdl: &str, pos: Pos) -> usize {
    let mut offset = 0;
    for (index, line) in sdl.split_inclusive('\n').enumerate() {
        if index + 1 == pos.line {
            return offset
                + line
                    .char_indices()
                    .nth(pos.column.saturating_sub(1))
                    .map_or(line.len(), |(i, _)| i);
        }
        offset += line.len();
    }
    sdl.len()
}

fn declaration_from_parsed(directive: DirectiveDefinition) -> DirectiveDeclaration {
    DirectiveDeclaration {
        name: directive.name.node.to_string(),
        description: directive.description.map(|d| d.node),
        arguments: directive
            .arguments
            .into_iter()
            .map(|arg| DirectiveArgument::new(arg.node.name.node.to_string(), arg.node.ty.node.to_string()))
            .collect(),
        locations: directive
            .locations
            .into_iter()
            .map(|loc| location_from_parsed(loc.node))
            .collect(),
    }
}

fn location_from_parsed(location: ParsedLocation) -> DirectiveLocation {
    match location {
        ParsedLocation::Query => DirectiveLocation::Query,
        ParsedLocation::Mutation => DirectiveLocation::Mutation,
        ParsedLocation::Subscription => DirectiveLocation::Subscription,
        ParsedLocation::Field => DirectiveLocation::Field,
        ParsedLocation::FragmentDefinition => DirectiveLocation::FragmentDefinition,
        ParsedLocation::FragmentSpread => DirectiveLocation::FragmentSpread,
        ParsedLocation::InlineFragment => DirectiveLocation::InlineFragment,
        ParsedLocation::VariableDefinition => DirectiveLocation::VariableDefinition,
        ParsedLocation::Schema => DirectiveLocation::Schema,
        ParsedLocation::Scalar => DirectiveLocation::Scalar,
        ParsedLocation::Object => DirectiveLocation::Object,
        ParsedLocation::FieldDefinition => DirectiveLocation::FieldDefinition,
        ParsedLocation::ArgumentDefinition => DirectiveLocation::ArgumentDefinition,
        ParsedLocation::Interface => DirectiveLocation::Interface,
        ParsedLocation::Union => DirectiveLocation::Union,
        ParsedLocation::Enum => DirectiveLocation::Enum,
        ParsedLocation::EnumValue => DirectiveLocation::EnumValue,
        ParsedLocation::InputObject => DirectiveLocation::InputObject,
        ParsedLocation::InputFieldDefinition => DirectiveLocation::InputFieldDefinition,
    }
}

// =============================================================================
// Directive Implementation Registry
// =============================================================================

/// Runtime directive implementations, keyed by directive name.
#[derive(Clone, Default)]
pub struct DirectiveImplementationRegistry {
    implementations: IndexMap<String, Arc<dyn DirectiveImplementation>>,
}

impl DirectiveImplementationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an implementation under its directive name.
    pub fn register(&mut self, implementation: Arc<dyn DirectiveImplementation>) {
        self.implementations
            .insert(implementation.name().to_string(), implementation);
    }

    /// Returns the implementation registered under a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DirectiveImplementation>> {
        self.implementations.get(name)
    }

    /// Returns `true` if an implementation with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.implementations.contains_key(name)
    }

    /// Registered names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.implementations.keys().map(String::as_str).collect()
    }

    /// Number of implementations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    /// Returns `true` if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }
}

impl fmt::Debug for DirectiveImplementationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveImplementationRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDL: &str = r#"
        type Movie {
            title: String
        }

        enum Role {
            reader
            admin
        }

        extend enum Role {
            editor
        }

        scalar DateTime

        directive @cypher(statement: String!) on FIELD_DEFINITION
    "#;

    #[test]
    fn test_from_sdl_records_types_and_directives() {
        let registry = TypeRegistry::from_sdl(SDL).unwrap();

        assert_eq!(registry.type_entry("Movie").unwrap().category, TypeCategory::Object);
        assert_eq!(
            registry.type_entry("DateTime").unwrap().category,
            TypeCategory::Scalar
        );
        assert_eq!(
            registry.enum_values(ROLE_ENUM).unwrap(),
            ["reader", "admin", "editor"]
        );
        assert_eq!(registry.directive_names(), vec!["cypher"]);

        let cypher = registry.directive("cypher").unwrap();
        assert_eq!(cypher.arguments[0].type_ref, "String!");
        assert_eq!(cypher.locations, vec![DirectiveLocation::FieldDefinition]);
    }

    #[test]
    fn test_invalid_sdl() {
        let err = TypeRegistry::from_sdl("type {").unwrap_err();
        assert!(matches!(err, AuthError::SchemaParse { .. }));
    }

    #[test]
    fn test_has_enum_ignores_non_enum() {
        let mut registry = TypeRegistry::new();
        registry.insert_type(TypeEntry::object(ROLE_ENUM));
        assert!(!registry.has_enum(ROLE_ENUM));

        registry.insert_type(TypeEntry::enumeration(ROLE_ENUM, ["admin"]));
        assert!(registry.has_enum(ROLE_ENUM));
    }

    #[test]
    fn test_reinsert_directive_keeps_position() {
        let mut registry = TypeRegistry::new();
        registry.insert_directive(DirectiveDeclaration::new("a"));
        registry.insert_type(TypeEntry::object("Movie"));
        registry.insert_directive(DirectiveDeclaration::new("a"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.directive_names(), vec!["a"]);
    }

    #[test]
    fn test_changed_directives() {
        let before = TypeRegistry::from_sdl(SDL).unwrap();
        let mut after = before.clone();
        assert!(after.changed_directives(&before).is_empty());

        after.insert_directive(
            DirectiveDeclaration::new("cypher").on(&[DirectiveLocation::FieldDefinition]),
        );
        after.insert_directive(DirectiveDeclaration::new("isAuthenticated"));

        let changed: Vec<&str> = after
            .changed_directives(&before)
            .into_iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(changed, vec!["cypher", "isAuthenticated"]);
    }

    #[test]
    fn test_strip_directive_declarations() {
        let sdl = "type Movie {\n  title: String\n}\n\n\"Scope check\"\ndirective @hasScope(scopes: [String!])\n  on FIELD_DEFINITION\n\nscalar DateTime\n";
        let stripped = strip_directive_declarations(sdl, &["hasScope"]).unwrap();
        assert_eq!(stripped, "type Movie {\n  title: String\n}\n\nscalar DateTime\n");

        let untouched = strip_directive_declarations(sdl, &["hasRole"]).unwrap();
        assert_eq!(untouched, sdl);
    }

    #[test]
    fn test_strip_trailing_declaration() {
        let sdl = "scalar DateTime\ndirective @isAuthenticated on OBJECT\n";
        assert_eq!(
            strip_directive_declarations(sdl, &["isAuthenticated"]).unwrap(),
            "scalar DateTime\n"
        );
    }

    #[test]
    fn test_from_sdl_records_directive_uses() {
        let sdl = r#"
            type Movie @hasRole(roles: [admin]) {
                title: String @isAuthenticated
                rating: Int @hasScope(scopes: "Movie: Read")
                genres: [String] @relation(name: "IN_GENRE")
            }
        "#;
        let registry = TypeRegistry::from_sdl(sdl).unwrap();

        let uses = registry.directive_uses();
        assert_eq!(uses.len(), 3);
        assert_eq!(uses[0].directive, AuthDirective::HasRole);
        assert_eq!(uses[0].site, "Movie");
        assert_eq!(uses[0].values, vec!["admin"]);
        assert_eq!(uses[1].site, "Movie.title");
        assert!(uses[1].values.is_empty());
        assert_eq!(uses[2].values, vec!["Movie: Read"]);
    }
}
