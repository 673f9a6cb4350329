//! Authorization augmentation configuration.
//!
//! Controls which authorization directives are added to the schema and how the
//! access-control dispatcher behaves when no ACL factory covers an operation.
//!
//! # Example Configuration
//!
//! ```toml
//! # Enable every directive
//! auth = true
//!
//! [access_control]
//! default_decision = "allow"
//! ```
//!
//! ```toml
//! # Enable directives individually
//! [auth]
//! isAuthenticated = true
//! hasRole = false
//! hasScope = true
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

// =============================================================================
// Directives
// =============================================================================

/// The authorization directives this crate can add to a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuthDirective {
    /// `@isAuthenticated`
    IsAuthenticated,
    /// `@hasRole(roles: [Role])`
    HasRole,
    /// `@hasScope(scopes: [String])`
    HasScope,
}

impl AuthDirective {
    /// All directives, in declaration order.
    pub const ALL: [AuthDirective; 3] = [Self::IsAuthenticated, Self::HasRole, Self::HasScope];

    /// The directive name as it appears in SDL (without the `@`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::IsAuthenticated => "isAuthenticated",
            Self::HasRole => "hasRole",
            Self::HasScope => "hasScope",
        }
    }
}

impl fmt::Display for AuthDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AuthDirective {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('@') {
            "isAuthenticated" => Ok(Self::IsAuthenticated),
            "hasRole" => Ok(Self::HasRole),
            "hasScope" => Ok(Self::HasScope),
            other => Err(AuthError::configuration(format!(
                "Unknown auth directive: '{other}'. Must be isAuthenticated, hasRole, or hasScope"
            ))),
        }
    }
}

// =============================================================================
// Auth Setting
// =============================================================================

/// Value of the `auth` configuration key.
///
/// Deserialization never fails: values that are neither a boolean nor a table
/// land in [`AuthSetting::Unrecognized`] and disable every directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthSetting {
    /// `auth = true` enables all directives, `auth = false` none.
    All(bool),
    /// `[auth]` table with per-directive flags.
    PerDirective(DirectiveToggles),
    /// Anything else.
    Unrecognized(serde_json::Value),
}

/// Per-directive flags of an `[auth]` table.
///
/// Only a literal `true` enables a directive; any other value counts as off.
/// Deserializes from a table only, so arrays fall through to
/// [`AuthSetting::Unrecognized`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveToggles {
    /// Enable `@isAuthenticated`.
    pub is_authenticated: bool,

    /// Enable `@hasRole`.
    pub has_role: bool,

    /// Enable `@hasScope`.
    pub has_scope: bool,
}

impl<'de> Deserialize<'de> for DirectiveToggles {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let table = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let flag = |directive: AuthDirective| {
            matches!(table.get(directive.name()), Some(serde_json::Value::Bool(true)))
        };
        Ok(Self {
            is_authenticated: flag(AuthDirective::IsAuthenticated),
            has_role: flag(AuthDirective::HasRole),
            has_scope: flag(AuthDirective::HasScope),
        })
    }
}

impl DirectiveToggles {
    /// Returns whether the given directive is switched on.
    #[must_use]
    pub fn is_enabled(&self, directive: AuthDirective) -> bool {
        match directive {
            AuthDirective::IsAuthenticated => self.is_authenticated,
            AuthDirective::HasRole => self.has_role,
            AuthDirective::HasScope => self.has_scope,
        }
    }

    /// Switches the given directive on.
    #[must_use]
    pub fn with(mut self, directive: AuthDirective) -> Self {
        match directive {
            AuthDirective::IsAuthenticated => self.is_authenticated = true,
            AuthDirective::HasRole => self.has_role = true,
            AuthDirective::HasScope => self.has_scope = true,
        }
        self
    }
}

// =============================================================================
// Access Control
// =============================================================================

/// Decision taken when no ACL factory covers an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultDecision {
    /// Fail-open: proceed without additional constraints.
    #[default]
    Allow,
    /// Fail-closed: reject the operation.
    Deny,
}

/// Access-control dispatch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlConfig {
    /// Decision when the context has no provider, or the provider has no
    /// factory for the operation kind.
    /// Default: allow
    pub default_decision: DefaultDecision,
}

// =============================================================================
// Root Config
// =============================================================================

/// Root authorization augmentation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Directive toggles. Absent means no directives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSetting>,

    /// Access-control dispatch policy.
    pub access_control: AccessControlConfig,
}

impl AuthConfig {
    /// Config with every directive enabled (`auth = true`).
    #[must_use]
    pub fn all() -> Self {
        Self {
            auth: Some(AuthSetting::All(true)),
            ..Self::default()
        }
    }

    /// Config enabling exactly the given directives.
    #[must_use]
    pub fn with_directives(directives: &[AuthDirective]) -> Self {
        let toggles = directives
            .iter()
            .fold(DirectiveToggles::default(), |toggles, d| toggles.with(*d));
        Self {
            auth: Some(AuthSetting::PerDirective(toggles)),
            ..Self::default()
        }
    }

    /// Sets the access-control default decision.
    #[must_use]
    pub fn with_default_decision(mut self, decision: DefaultDecision) -> Self {
        self.access_control.default_decision = decision;
        self
    }

    /// Returns whether the given directive should be added to the schema.
    #[must_use]
    pub fn should_enable(&self, directive: AuthDirective) -> bool {
        match &self.auth {
            Some(AuthSetting::All(enabled)) => *enabled,
            Some(AuthSetting::PerDirective(toggles)) => toggles.is_enabled(directive),
            Some(AuthSetting::Unrecognized(_)) | None => false,
        }
    }

    /// Returns the enabled directives in declaration order.
    #[must_use]
    pub fn enabled_directives(&self) -> Vec<AuthDirective> {
        AuthDirective::ALL
            .into_iter()
            .filter(|d| self.should_enable(*d))
            .collect()
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the TOML is malformed.
    pub fn from_toml_str(input: &str) -> AuthResult<Self> {
        toml::from_str(input)
            .map_err(|e| AuthError::configuration(format!("TOML parse error: {e}")))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuthError::configuration(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Strict validation.
    ///
    /// [`AuthConfig::should_enable`] treats an unrecognized `auth` value as
    /// "all directives off"; this check lets a driver reject it instead.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if `auth` is neither a boolean nor a
    /// table.
    pub fn validate(&self) -> AuthResult<()> {
        if let Some(AuthSetting::Unrecognized(value)) = &self.auth {
            return Err(AuthError::configuration(format!(
                "auth must be a boolean or a table of directive flags, got {value}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert!(config.auth.is_none());
        assert_eq!(config.access_control.default_decision, DefaultDecision::Allow);
        assert!(config.enabled_directives().is_empty());
    }

    #[test]
    fn test_auth_true_enables_all() {
        let config = AuthConfig::from_toml_str("auth = true").unwrap();
        for directive in AuthDirective::ALL {
            assert!(config.should_enable(directive), "{directive} should be enabled");
        }
    }

    #[test]
    fn test_auth_false_disables_all() {
        let config = AuthConfig::from_toml_str("auth = false").unwrap();
        assert!(config.enabled_directives().is_empty());
    }

    #[test]
    fn test_per_directive_enables_exactly_flagged() {
        let toml = r#"
            [auth]
            isAuthenticated = true
            hasScope = true
        "#;
        let config = AuthConfig::from_toml_str(toml).unwrap();
        assert_eq!(
            config.enabled_directives(),
            vec![AuthDirective::IsAuthenticated, AuthDirective::HasScope]
        );
    }

    #[test]
    fn test_non_boolean_flag_is_off() {
        let toml = r#"
            [auth]
            hasRole = "yes"
            hasScope = true
        "#;
        let config = AuthConfig::from_toml_str(toml).unwrap();
        assert!(!config.should_enable(AuthDirective::HasRole));
        assert!(config.should_enable(AuthDirective::HasScope));
    }

    #[test]
    fn test_unrecognized_auth_disables_all() {
        let config = AuthConfig::from_toml_str(r#"auth = "everything""#).unwrap();
        assert!(matches!(config.auth, Some(AuthSetting::Unrecognized(_))));
        assert!(config.enabled_directives().is_empty());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_array_auth_disables_all() {
        for toml in ["auth = [true, true, true]", "auth = []"] {
            let config = AuthConfig::from_toml_str(toml).unwrap();
            assert!(
                matches!(config.auth, Some(AuthSetting::Unrecognized(_))),
                "{toml}"
            );
            assert!(config.enabled_directives().is_empty(), "{toml}");
            assert!(config.validate().is_err(), "{toml}");
        }
    }

    #[test]
    fn test_empty_table_is_per_directive() {
        let config = AuthConfig::from_toml_str("[auth]").unwrap();
        assert_eq!(
            config.auth,
            Some(AuthSetting::PerDirective(DirectiveToggles::default()))
        );
        assert!(config.enabled_directives().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_directives() {
        let config = AuthConfig::with_directives(&[AuthDirective::HasRole]);
        assert_eq!(config.enabled_directives(), vec![AuthDirective::HasRole]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_default_decision() {
        let toml = r#"
            auth = true

            [access_control]
            default_decision = "deny"
        "#;
        let config = AuthConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.access_control.default_decision, DefaultDecision::Deny);
    }

    #[test]
    fn test_malformed_toml() {
        let err = AuthConfig::from_toml_str("auth = [").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neograph.toml");
        std::fs::write(&path, "[auth]\nhasScope = true\n").unwrap();

        let config = AuthConfig::load(&path).unwrap();
        assert_eq!(config.enabled_directives(), vec![AuthDirective::HasScope]);
    }

    #[test]
    fn test_directive_from_str() {
        assert_eq!(
            "@hasScope".parse::<AuthDirective>().unwrap(),
            AuthDirective::HasScope
        );
        assert!("hasPermission".parse::<AuthDirective>().is_err());
    }
}
