//! Team membership service
//!
//! Owns every lifecycle transition of teams and memberships: creation,
//! join/leave, and the two role-update paths. Persistence, configuration and
//! event delivery are injected.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::events::TeamEventSink;
use super::scheme_resolver::SchemeResolver;
use crate::config::ConfigSource;
use crate::domain::member::{SchemeRoleFlags, TeamMember};
use crate::domain::repositories::{
    MemberRepository, RoleRepository, SeatReservation, TeamRepository, User, UserRepository,
};
use crate::domain::role::parse_role_names;
use crate::domain::team::{Team, TeamEvent};
use crate::error::{TeamError, TeamResult};
use crate::infrastructure::repositories::{
    InMemoryDatabase, PostgresMemberRepository, PostgresRoleRepository, PostgresSchemeRepository,
    PostgresTeamRepository, PostgresUserRepository,
};

/// The persistence ports the service depends on
#[derive(Clone)]
pub struct TeamStores {
    pub teams: Arc<dyn TeamRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub schemes: SchemeResolver,
}

impl TeamStores {
    /// Backs every port with the same in-memory database
    pub fn in_memory(db: Arc<InMemoryDatabase>) -> Self {
        Self {
            teams: db.clone(),
            members: db.clone(),
            users: db.clone(),
            roles: db.clone(),
            schemes: SchemeResolver::new(db),
        }
    }

    /// Backs every port with PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            teams: Arc::new(PostgresTeamRepository::new(pool.clone())),
            members: Arc::new(PostgresMemberRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            roles: Arc::new(PostgresRoleRepository::new(pool.clone())),
            schemes: SchemeResolver::new(Arc::new(PostgresSchemeRepository::new(pool))),
        }
    }
}

/// Options for [`TeamService::update_team`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Replace the stored team wholesale (bulk import); otherwise only the
    /// user-editable fields are copied
    pub imported: bool,
}

/// Result of a join request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamJoin {
    pub member: TeamMember,
    /// True when the user already was an active member
    pub already_added: bool,
}

/// Team membership service
///
/// Holds no lock across operations; the capacity invariant is enforced by
/// [`MemberRepository::reserve_seat`].
#[derive(Clone)]
pub struct TeamService {
    stores: TeamStores,
    config: Arc<dyn ConfigSource>,
    events: Arc<dyn TeamEventSink>,
}

impl TeamService {
    pub fn new(
        stores: TeamStores,
        config: Arc<dyn ConfigSource>,
        events: Arc<dyn TeamEventSink>,
    ) -> Self {
        Self {
            stores,
            config,
            events,
        }
    }

    // ===== Teams =====

    /// Create a new team
    ///
    /// Fails with `Conflict` when the name or email is taken. No membership
    /// is created; the creator joins separately.
    pub async fn create_team(&self, team: Team) -> TeamResult<Team> {
        info!(team_id = %team.id(), name = %team.name(), "Creating team");

        team.validate()?;

        if self.stores.teams.find_by_name(team.name()).await?.is_some() {
            return Err(TeamError::conflict("Team", "name", team.name()));
        }

        let created = self.stores.teams.create(&team).await?;

        self.events
            .publish(TeamEvent::Created {
                team_id: created.id(),
                name: created.name().to_string(),
            })
            .await;

        Ok(created)
    }

    /// Get a team by ID
    pub async fn get_team(&self, team_id: Uuid) -> TeamResult<Team> {
        self.stores
            .teams
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| TeamError::not_found("Team", team_id))
    }

    /// Get a team by its unique name
    pub async fn get_team_by_name(&self, name: &str) -> TeamResult<Team> {
        self.stores
            .teams
            .find_by_name(name)
            .await?
            .ok_or_else(|| TeamError::not_found("Team", name))
    }

    /// Update a team
    ///
    /// Imported updates overwrite every field, including the scheme. Regular
    /// updates only touch display name, description, type and the open
    /// invite flag.
    pub async fn update_team(&self, team: &Team, options: UpdateOptions) -> TeamResult<Team> {
        info!(team_id = %team.id(), imported = options.imported, "Updating team");

        let mut stored = self.get_team(team.id()).await?;

        let updated = if options.imported {
            team.validate()?;
            let mut replacement = team.clone();
            replacement.touch();
            replacement
        } else {
            stored.apply_patch(team)?;
            stored
        };

        let saved = self.stores.teams.update(&updated).await?;
        self.events
            .publish(TeamEvent::Updated { team_id: saved.id() })
            .await;

        Ok(saved)
    }

    /// Soft-delete a team
    ///
    /// Memberships are left in place; new joins are refused.
    pub async fn soft_delete_team(&self, team_id: Uuid) -> TeamResult<Team> {
        info!(%team_id, "Soft-deleting team");

        let mut team = self.get_team(team_id).await?;
        let event = team.soft_delete()?;
        let saved = self.stores.teams.update(&team).await?;
        self.events.publish(event).await;

        Ok(saved)
    }

    /// Purge a team
    ///
    /// Every active membership is deactivated first, then the team record
    /// is removed.
    pub async fn permanent_delete_team(&self, team_id: Uuid) -> TeamResult<()> {
        info!(%team_id, "Permanently deleting team");

        self.get_team(team_id).await?;
        let members_removed = self
            .stores
            .members
            .deactivate_all(team_id, Utc::now())
            .await?;
        self.stores.teams.delete(team_id).await?;

        self.events
            .publish(TeamEvent::Purged {
                team_id,
                members_removed,
            })
            .await;

        Ok(())
    }

    // ===== Membership =====

    /// Add a user to a team
    ///
    /// Joining twice is not an error: the second call returns the existing
    /// membership with `already_added` set. A user who left before gets the
    /// same membership back, reset to the default roles. Both new joins and
    /// re-joins are subject to the seat limit.
    pub async fn join_user_to_team(&self, team: &Team, user: &User) -> TeamResult<TeamJoin> {
        let team = self.get_team(team.id()).await?;
        if team.is_deleted() {
            return Err(TeamError::not_found("Team", team.id()));
        }

        let user = self.get_user(user.id).await?;

        let existing = self
            .stores
            .members
            .find(team.id(), user.id, true)
            .await?;

        let (candidate, rejoined) = match existing {
            Some(member) if member.is_active() => {
                debug!(team_id = %team.id(), user_id = %user.id, "User already a team member");
                return Ok(TeamJoin {
                    member,
                    already_added: true,
                });
            }
            Some(mut member) => {
                member.reactivate(user.is_guest)?;
                (member, true)
            }
            None => (TeamMember::new(team.id(), user.id, user.is_guest), false),
        };

        let limit = self.config.team_settings().seat_limit();

        let reservation = match self.stores.members.reserve_seat(&candidate, limit).await {
            Ok(reservation) => reservation,
            Err(err @ TeamError::CapacityExceeded { .. }) => {
                warn!(team_id = %team.id(), user_id = %user.id, ?limit, "Team is full");
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        match reservation {
            SeatReservation::Reserved(member) => {
                info!(team_id = %team.id(), user_id = %user.id, rejoined, "User joined team");
                self.events
                    .publish(TeamEvent::MemberJoined {
                        team_id: team.id(),
                        user_id: user.id,
                        rejoined,
                    })
                    .await;

                Ok(TeamJoin {
                    member,
                    already_added: false,
                })
            }
            SeatReservation::AlreadyActive(member) => Ok(TeamJoin {
                member,
                already_added: true,
            }),
        }
    }

    /// Remove a user from a team
    ///
    /// The membership is soft-deleted so a later join can reactivate it.
    /// Removing a membership that is already gone fails with `NotFound`.
    pub async fn remove_team_member(&self, member: &TeamMember) -> TeamResult<()> {
        info!(team_id = %member.team_id(), user_id = %member.user_id(), "Removing team member");

        let removed = self
            .stores
            .members
            .deactivate(member.team_id(), member.user_id(), Utc::now())
            .await?;

        self.events
            .publish(TeamEvent::MemberRemoved {
                team_id: removed.team_id(),
                user_id: removed.user_id(),
            })
            .await;

        Ok(())
    }

    /// Replace a member's explicit roles
    ///
    /// `roles` is a whitespace-separated list of role names. Every role must
    /// exist and must not be scheme-managed; guest, user and admin status
    /// can only change through [`Self::update_team_member_scheme_roles`].
    pub async fn update_team_member_roles(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        roles: &str,
    ) -> TeamResult<TeamMember> {
        info!(%team_id, %user_id, roles, "Updating team member roles");

        let mut member = self.active_member(team_id, user_id).await?;
        let team = self.get_team(team_id).await?;
        let scheme_roles = self.stores.schemes.resolve_for_team(&team).await?;

        for name in parse_role_names(roles) {
            let role = self
                .stores
                .roles
                .find_by_name(&name)
                .await?
                .ok_or_else(|| TeamError::not_found("Role", &name))?;

            if role.scheme_managed || scheme_roles.contains(&name) {
                return Err(TeamError::validation(format!(
                    "Role {} is managed by the team scheme and cannot be assigned directly",
                    name
                )));
            }
        }

        let event = member.set_explicit_roles(roles)?;
        let saved = self.stores.members.save(&member).await?;
        self.events.publish(event).await;

        Ok(saved)
    }

    /// Move a member between the guest, user and admin slots
    ///
    /// Repeating the current assignment is accepted and changes nothing.
    pub async fn update_team_member_scheme_roles(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        flags: SchemeRoleFlags,
    ) -> TeamResult<TeamMember> {
        info!(%team_id, %user_id, ?flags, "Updating team member scheme roles");

        let mut member = self.active_member(team_id, user_id).await?;
        flags.validate()?;

        let team = self.get_team(team_id).await?;
        let names = self.stores.schemes.resolve_for_team(&team).await?;

        if member.scheme_flags() == flags {
            debug!(%team_id, %user_id, "Scheme roles unchanged");
            return Ok(member);
        }

        let event = member.set_scheme_roles(flags)?;
        let saved = self.stores.members.save(&member).await?;
        info!(
            %team_id,
            %user_id,
            roles = %saved.effective_roles(&names),
            "Team member scheme roles updated"
        );
        self.events.publish(event).await;

        Ok(saved)
    }

    /// Get an active membership
    pub async fn get_team_member(&self, team_id: Uuid, user_id: Uuid) -> TeamResult<TeamMember> {
        self.active_member(team_id, user_id).await
    }

    /// All active members of a team
    pub async fn get_team_members(&self, team_id: Uuid) -> TeamResult<Vec<TeamMember>> {
        self.get_team(team_id).await?;
        self.stores.members.find_by_team(team_id).await
    }

    /// Get an active user by ID
    pub async fn get_user(&self, user_id: Uuid) -> TeamResult<User> {
        self.stores
            .users
            .find_by_id(user_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| TeamError::not_found("User", user_id))
    }

    /// Number of active members of a team
    pub async fn active_member_count(&self, team_id: Uuid) -> TeamResult<u64> {
        self.stores.members.active_count(team_id).await
    }

    /// Full role string of a member, scheme slot roles included
    pub async fn effective_roles(&self, member: &TeamMember) -> TeamResult<String> {
        let team = self.get_team(member.team_id()).await?;
        let names = self.stores.schemes.resolve_for_team(&team).await?;
        Ok(member.effective_roles(&names))
    }

    async fn active_member(&self, team_id: Uuid, user_id: Uuid) -> TeamResult<TeamMember> {
        self.stores
            .members
            .find(team_id, user_id, false)
            .await?
            .ok_or_else(|| {
                TeamError::not_found("TeamMember", format!("team={} user={}", team_id, user_id))
            })
    }
}
