// Role definitions
// Roles are looked up by name; scheme-managed roles are reserved for scheme slots

use serde::{Deserialize, Serialize};

/// A named set of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub permissions: Vec<String>,
    /// Only scheme machinery may assign this role
    pub scheme_managed: bool,
}

impl Role {
    /// Creates a custom (non scheme-managed) role
    pub fn custom(name: impl Into<String>, permissions: Vec<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            permissions,
            scheme_managed: false,
        }
    }

    /// Creates a scheme-managed role
    pub fn scheme_managed(name: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            scheme_managed: true,
            ..Self::custom(name, permissions)
        }
    }
}

/// Splits a free-form role string into role names
///
/// Roles may be separated by any whitespace; empty entries are dropped and
/// duplicates are removed while keeping the first occurrence.
pub fn parse_role_names(roles: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in roles.split_whitespace() {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_role_is_not_scheme_managed() {
        let role = Role::custom("reviewer", vec!["read".to_string()]);
        assert!(!role.scheme_managed);
        assert_eq!(role.display_name, "reviewer");
    }

    #[test]
    fn scheme_managed_role() {
        let role = Role::scheme_managed("team_admin", vec![]);
        assert!(role.scheme_managed);
        assert_eq!(role.name, "team_admin");
    }

    #[test]
    fn parse_role_names_splits_and_dedupes() {
        assert_eq!(
            parse_role_names("  reviewer  auditor\treviewer "),
            vec!["reviewer".to_string(), "auditor".to_string()]
        );
        assert!(parse_role_names("   ").is_empty());
    }
}
