use serde::{Deserialize, Serialize};

use crate::error::{TeamError, TeamResult};

/// Requested scheme slots for a membership
///
/// A member holds exactly one of: guest, user, or user + admin. The fourth
/// flag mirrors the four-slot call signature of the scheme-role update and
/// has no assigned meaning yet, so it must be `false`.
///
/// # Example
/// ```
/// use team_membership_api::domain::member::SchemeRoleFlags;
///
/// assert!(SchemeRoleFlags::new(false, true, true, false).validate().is_ok());
/// assert!(SchemeRoleFlags::new(true, true, false, false).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemeRoleFlags {
    pub guest: bool,
    pub user: bool,
    pub admin: bool,
    #[serde(default)]
    pub reserved: bool,
}

impl SchemeRoleFlags {
    /// Builds the flags in call-site order: guest, user, admin, reserved
    pub fn new(guest: bool, user: bool, admin: bool, reserved: bool) -> Self {
        Self {
            guest,
            user,
            admin,
            reserved,
        }
    }

    /// Flags of an ordinary member
    pub fn member() -> Self {
        Self::new(false, true, false, false)
    }

    /// Flags of a guest member
    pub fn guest() -> Self {
        Self::new(true, false, false, false)
    }

    /// Checks that the combination names exactly one valid slot set
    ///
    /// # Validation Rules
    /// - Guest excludes user and admin
    /// - Admin requires user
    /// - At least one slot must be requested
    /// - The reserved flag must not be set
    pub fn validate(&self) -> TeamResult<()> {
        if self.reserved {
            return Err(TeamError::validation(
                "The reserved scheme role flag is not supported",
            ));
        }

        if self.guest && (self.user || self.admin) {
            return Err(TeamError::validation(
                "A team member cannot be both a guest and a user or admin",
            ));
        }

        if self.admin && !self.user {
            return Err(TeamError::validation(
                "A team admin must also hold the team user role",
            ));
        }

        if !self.guest && !self.user {
            return Err(TeamError::validation(
                "A team member must hold the guest or the user role",
            ));
        }

        Ok(())
    }
}
