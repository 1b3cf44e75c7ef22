use super::value_objects::SchemeRoleFlags;
use crate::domain::role::parse_role_names;
use crate::domain::scheme::SchemeRoleNames;
use crate::domain::team::TeamEvent;
use crate::error::{TeamError, TeamResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership of one user in one team
///
/// At most one record exists per `(team_id, user_id)` pair. Leaving a team
/// sets `delete_at`; joining again reactivates the same record.
///
/// # State Transitions
/// ```text
/// absent -> active(guest | user | user+admin) -> deleted -> active
/// ```
///
/// `roles` only holds explicit, non scheme-managed role names. The roles
/// granted by the scheme slots are composed on read with
/// [`TeamMember::effective_roles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    team_id: Uuid,
    user_id: Uuid,
    roles: String,
    scheme_guest: bool,
    scheme_user: bool,
    scheme_admin: bool,
    created_at: DateTime<Utc>,
    delete_at: Option<DateTime<Utc>>,
}

impl TeamMember {
    /// Creates the default active membership for a user
    ///
    /// Guests join in the guest slot, everyone else as an ordinary member.
    pub fn new(team_id: Uuid, user_id: Uuid, is_guest: bool) -> Self {
        let flags = default_flags(is_guest);
        Self {
            team_id,
            user_id,
            roles: String::new(),
            scheme_guest: flags.guest,
            scheme_user: flags.user,
            scheme_admin: flags.admin,
            created_at: Utc::now(),
            delete_at: None,
        }
    }

    /// Soft-deletes the membership as of `at`
    ///
    /// # Returns
    /// * `Ok(TeamEvent::MemberRemoved)` - The membership is now deleted
    /// * `Err(TeamError::NotFound)` - It was already deleted
    pub fn deactivate(&mut self, at: DateTime<Utc>) -> TeamResult<TeamEvent> {
        if !self.is_active() {
            return Err(self.not_found());
        }

        self.delete_at = Some(at);

        Ok(TeamEvent::MemberRemoved {
            team_id: self.team_id,
            user_id: self.user_id,
        })
    }

    /// Brings a deleted membership back with default roles
    ///
    /// The record keeps its identity and creation time.
    pub fn reactivate(&mut self, is_guest: bool) -> TeamResult<TeamEvent> {
        if self.is_active() {
            return Err(TeamError::validation(format!(
                "User {} is already an active member of team {}",
                self.user_id, self.team_id
            )));
        }

        let flags = default_flags(is_guest);
        self.roles.clear();
        self.scheme_guest = flags.guest;
        self.scheme_user = flags.user;
        self.scheme_admin = flags.admin;
        self.delete_at = None;

        Ok(TeamEvent::MemberJoined {
            team_id: self.team_id,
            user_id: self.user_id,
            rejoined: true,
        })
    }

    /// Replaces the explicit role names
    ///
    /// Callers are responsible for checking that every name is an existing,
    /// non scheme-managed role.
    pub fn set_explicit_roles(&mut self, roles: &str) -> TeamResult<TeamEvent> {
        self.ensure_active()?;
        self.roles = parse_role_names(roles).join(" ");

        Ok(TeamEvent::MemberRolesUpdated {
            team_id: self.team_id,
            user_id: self.user_id,
            roles: self.roles.clone(),
        })
    }

    /// Moves the membership to the requested scheme slots
    pub fn set_scheme_roles(&mut self, flags: SchemeRoleFlags) -> TeamResult<TeamEvent> {
        self.ensure_active()?;
        flags.validate()?;

        self.scheme_guest = flags.guest;
        self.scheme_user = flags.user;
        self.scheme_admin = flags.admin;

        Ok(TeamEvent::MemberSchemeRolesUpdated {
            team_id: self.team_id,
            user_id: self.user_id,
            guest: flags.guest,
            user: flags.user,
            admin: flags.admin,
        })
    }

    /// Materializes the full role string for this member
    ///
    /// Slot roles come first (guest, user, admin), followed by the explicit
    /// roles.
    pub fn effective_roles(&self, names: &SchemeRoleNames) -> String {
        let mut roles: Vec<&str> = Vec::new();
        if self.scheme_guest {
            roles.push(&names.guest);
        }
        if self.scheme_user {
            roles.push(&names.user);
        }
        if self.scheme_admin {
            roles.push(&names.admin);
        }
        roles.extend(self.roles.split_whitespace());
        roles.join(" ")
    }

    fn ensure_active(&self) -> TeamResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(self.not_found())
        }
    }

    fn not_found(&self) -> TeamError {
        TeamError::not_found(
            "TeamMember",
            format!("team={} user={}", self.team_id, self.user_id),
        )
    }

    // ===== Getters =====

    pub fn team_id(&self) -> Uuid {
        self.team_id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Explicit (non-scheme) role names, space separated
    pub fn roles(&self) -> &str {
        &self.roles
    }

    pub fn scheme_flags(&self) -> SchemeRoleFlags {
        SchemeRoleFlags::new(self.scheme_guest, self.scheme_user, self.scheme_admin, false)
    }

    pub fn is_admin(&self) -> bool {
        self.scheme_admin
    }

    pub fn is_guest(&self) -> bool {
        self.scheme_guest
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn delete_at(&self) -> Option<DateTime<Utc>> {
        self.delete_at
    }

    /// Active memberships have no delete marker
    pub fn is_active(&self) -> bool {
        self.delete_at.is_none()
    }

    /// Reconstructs a TeamMember from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        team_id: Uuid,
        user_id: Uuid,
        roles: String,
        scheme_guest: bool,
        scheme_user: bool,
        scheme_admin: bool,
        created_at: DateTime<Utc>,
        delete_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            team_id,
            user_id,
            roles,
            scheme_guest,
            scheme_user,
            scheme_admin,
            created_at,
            delete_at,
        }
    }
}

fn default_flags(is_guest: bool) -> SchemeRoleFlags {
    if is_guest {
        SchemeRoleFlags::guest()
    } else {
        SchemeRoleFlags::member()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> TeamMember {
        TeamMember::new(Uuid::new_v4(), Uuid::new_v4(), false)
    }

    #[test]
    fn new_member_is_active_user() {
        let member = member();

        assert!(member.is_active());
        assert_eq!(member.scheme_flags(), SchemeRoleFlags::member());
        assert!(!member.is_admin());
        assert!(!member.is_guest());
        assert_eq!(member.roles(), "");
    }

    #[test]
    fn new_guest_member_holds_guest_slot() {
        let member = TeamMember::new(Uuid::new_v4(), Uuid::new_v4(), true);
        assert!(member.is_guest());
        assert_eq!(member.scheme_flags(), SchemeRoleFlags::guest());
    }

    #[test]
    fn deactivate_twice_fails() {
        let mut member = member();

        let event = member.deactivate(Utc::now()).unwrap();
        assert_eq!(event.user_id(), Some(member.user_id()));
        assert!(!member.is_active());
        assert!(matches!(
            member.deactivate(Utc::now()),
            Err(TeamError::NotFound { .. })
        ));
    }

    #[test]
    fn reactivate_resets_roles_and_keeps_identity() {
        let mut member = member();
        let created_at = member.created_at();
        member.set_explicit_roles("reviewer").unwrap();
        member
            .set_scheme_roles(SchemeRoleFlags::new(false, true, true, false))
            .unwrap();
        member.deactivate(Utc::now()).unwrap();

        let event = member.reactivate(false).unwrap();

        assert!(matches!(event, TeamEvent::MemberJoined { rejoined: true, .. }));
        assert!(member.is_active());
        assert_eq!(member.roles(), "");
        assert!(!member.is_admin());
        assert_eq!(member.created_at(), created_at);
    }

    #[test]
    fn reactivate_active_member_fails() {
        let mut member = member();
        assert!(member.reactivate(false).is_err());
    }

    #[test]
    fn explicit_roles_are_normalized() {
        let mut member = member();
        member.set_explicit_roles("  reviewer   auditor ").unwrap();
        assert_eq!(member.roles(), "reviewer auditor");
    }

    #[test]
    fn updates_on_deleted_member_fail() {
        let mut member = member();
        member.deactivate(Utc::now()).unwrap();

        assert!(member.set_explicit_roles("reviewer").is_err());
        assert!(member.set_scheme_roles(SchemeRoleFlags::guest()).is_err());
    }

    #[test]
    fn invalid_scheme_roles_leave_member_unchanged() {
        let mut member = member();
        let before = member.clone();

        let result = member.set_scheme_roles(SchemeRoleFlags::new(true, true, false, false));

        assert!(matches!(result, Err(TeamError::Validation(_))));
        assert_eq!(member, before);
    }

    #[test]
    fn effective_roles_compose_slots_and_explicit_roles() {
        let mut member = member();
        member
            .set_scheme_roles(SchemeRoleFlags::new(false, true, true, false))
            .unwrap();
        member.set_explicit_roles("reviewer").unwrap();

        let roles = member.effective_roles(&SchemeRoleNames::default());
        assert_eq!(roles, "team_user team_admin reviewer");
    }

    #[test]
    fn effective_roles_for_guest() {
        let mut member = member();
        member.set_scheme_roles(SchemeRoleFlags::guest()).unwrap();

        assert_eq!(
            member.effective_roles(&SchemeRoleNames::default()),
            "team_guest"
        );
    }
}
