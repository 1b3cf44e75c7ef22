// Permission schemes
// A scheme maps the guest/user/admin membership slots to concrete role names

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role used for team guests when a team has no scheme
pub const TEAM_GUEST_ROLE: &str = "team_guest";
/// Role used for ordinary team members when a team has no scheme
pub const TEAM_USER_ROLE: &str = "team_user";
/// Role used for team admins when a team has no scheme
pub const TEAM_ADMIN_ROLE: &str = "team_admin";

/// A named mapping from membership slots to role names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: Uuid,
    pub name: String,
    pub default_team_guest_role: String,
    pub default_team_user_role: String,
    pub default_team_admin_role: String,
}

impl Scheme {
    /// Creates a scheme whose slot roles are derived from its name,
    /// e.g. `sales_team_user`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            default_team_guest_role: format!("{}_{}", name, TEAM_GUEST_ROLE),
            default_team_user_role: format!("{}_{}", name, TEAM_USER_ROLE),
            default_team_admin_role: format!("{}_{}", name, TEAM_ADMIN_ROLE),
            name,
        }
    }

    /// Slot role names of this scheme
    pub fn role_names(&self) -> SchemeRoleNames {
        SchemeRoleNames {
            guest: self.default_team_guest_role.clone(),
            user: self.default_team_user_role.clone(),
            admin: self.default_team_admin_role.clone(),
        }
    }
}

/// Concrete role names for the three membership slots of one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeRoleNames {
    pub guest: String,
    pub user: String,
    pub admin: String,
}

impl SchemeRoleNames {
    /// Returns true if `role` is one of the slot roles
    pub fn contains(&self, role: &str) -> bool {
        role == self.guest || role == self.user || role == self.admin
    }
}

impl Default for SchemeRoleNames {
    /// System-wide roles used by teams without a scheme
    fn default() -> Self {
        Self {
            guest: TEAM_GUEST_ROLE.to_string(),
            user: TEAM_USER_ROLE.to_string(),
            admin: TEAM_ADMIN_ROLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_are_system_roles() {
        let names = SchemeRoleNames::default();
        assert_eq!(names.guest, "team_guest");
        assert_eq!(names.user, "team_user");
        assert_eq!(names.admin, "team_admin");
    }

    #[test]
    fn scheme_roles_are_prefixed_with_name() {
        let scheme = Scheme::new("sales");
        let names = scheme.role_names();

        assert_eq!(names.user, "sales_team_user");
        assert!(names.contains("sales_team_admin"));
        assert!(!names.contains("team_admin"));
    }
}
