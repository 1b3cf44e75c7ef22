use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::member::TeamMember;
use crate::domain::repositories::{
    MemberRepository, RoleRepository, SchemeRepository, SeatReservation, TeamRepository, User,
    UserRepository,
};
use crate::domain::role::Role;
use crate::domain::scheme::{Scheme, SchemeRoleNames};
use crate::domain::team::Team;
use crate::domain::user::value_objects::Email;
use crate::error::{TeamError, TeamResult};

#[derive(Debug, Default)]
struct Tables {
    teams: HashMap<Uuid, Team>,
    members: HashMap<(Uuid, Uuid), TeamMember>,
    users: HashMap<Uuid, User>,
    roles: HashMap<String, Role>,
    schemes: HashMap<Uuid, Scheme>,
}

/// In-memory implementation of every repository port
///
/// All tables sit behind one lock, which gives the same single-writer
/// visibility as a database: a committed write is seen by the next read, and
/// a seat reservation counts and writes under one write guard.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    /// Creates an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database holding the scheme-managed system team roles
    pub fn with_system_roles() -> Self {
        let db = Self::new();
        {
            let mut tables = db
                .tables
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let names = SchemeRoleNames::default();
            for name in [names.guest, names.user, names.admin] {
                tables
                    .roles
                    .insert(name.clone(), Role::scheme_managed(name, Vec::new()));
            }
        }
        db
    }

    /// Number of stored membership rows for a team, deleted ones included
    pub fn stored_member_rows(&self, team_id: Uuid) -> TeamResult<usize> {
        let tables = self.read()?;
        Ok(tables
            .members
            .keys()
            .filter(|(team, _)| *team == team_id)
            .count())
    }

    fn read(&self) -> TeamResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| TeamError::Persistence(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> TeamResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| TeamError::Persistence(format!("Failed to acquire write lock: {}", e)))
    }
}

fn ensure_unique_team(tables: &Tables, team: &Team) -> TeamResult<()> {
    for other in tables.teams.values().filter(|t| t.id() != team.id()) {
        if other.name() == team.name() {
            return Err(TeamError::conflict("Team", "name", team.name()));
        }
        if other.email() == team.email() {
            return Err(TeamError::conflict("Team", "email", team.email().as_str()));
        }
    }
    Ok(())
}

fn count_active(tables: &Tables, team_id: Uuid) -> usize {
    tables
        .members
        .values()
        .filter(|m| m.team_id() == team_id && m.is_active())
        .count()
}

#[async_trait]
impl TeamRepository for InMemoryDatabase {
    async fn create(&self, team: &Team) -> TeamResult<Team> {
        let mut tables = self.write()?;

        if tables.teams.contains_key(&team.id()) {
            return Err(TeamError::conflict("Team", "id", team.id().to_string()));
        }
        ensure_unique_team(&tables, team)?;

        tables.teams.insert(team.id(), team.clone());
        Ok(team.clone())
    }

    async fn update(&self, team: &Team) -> TeamResult<Team> {
        let mut tables = self.write()?;

        if !tables.teams.contains_key(&team.id()) {
            return Err(TeamError::not_found("Team", team.id()));
        }
        ensure_unique_team(&tables, team)?;

        tables.teams.insert(team.id(), team.clone());
        Ok(team.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<Team>> {
        Ok(self.read()?.teams.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> TeamResult<Option<Team>> {
        Ok(self
            .read()?
            .teams
            .values()
            .find(|t| t.name() == name)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> TeamResult<()> {
        match self.write()?.teams.remove(&id) {
            Some(_) => Ok(()),
            None => Err(TeamError::not_found("Team", id)),
        }
    }
}

#[async_trait]
impl MemberRepository for InMemoryDatabase {
    async fn find(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        include_deleted: bool,
    ) -> TeamResult<Option<TeamMember>> {
        Ok(self
            .read()?
            .members
            .get(&(team_id, user_id))
            .filter(|m| include_deleted || m.is_active())
            .cloned())
    }

    async fn find_by_team(&self, team_id: Uuid) -> TeamResult<Vec<TeamMember>> {
        let tables = self.read()?;
        let mut members: Vec<TeamMember> = tables
            .members
            .values()
            .filter(|m| m.team_id() == team_id && m.is_active())
            .cloned()
            .collect();
        members.sort_by_key(|m| m.created_at());
        Ok(members)
    }

    async fn save(&self, member: &TeamMember) -> TeamResult<TeamMember> {
        let mut tables = self.write()?;
        let key = (member.team_id(), member.user_id());

        let stored = match tables.members.get_mut(&key) {
            Some(stored) if stored.is_active() => stored,
            _ => {
                return Err(TeamError::not_found(
                    "TeamMember",
                    format!("team={} user={}", member.team_id(), member.user_id()),
                ))
            }
        };

        let flags = member.scheme_flags();
        *stored = TeamMember::from_persistence(
            stored.team_id(),
            stored.user_id(),
            member.roles().to_string(),
            flags.guest,
            flags.user,
            flags.admin,
            stored.created_at(),
            None,
        );
        Ok(stored.clone())
    }

    async fn deactivate(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> TeamResult<TeamMember> {
        let mut tables = self.write()?;

        match tables.members.get_mut(&(team_id, user_id)) {
            Some(stored) => {
                stored.deactivate(at)?;
                Ok(stored.clone())
            }
            None => Err(TeamError::not_found(
                "TeamMember",
                format!("team={} user={}", team_id, user_id),
            )),
        }
    }

    async fn active_count(&self, team_id: Uuid) -> TeamResult<u64> {
        Ok(count_active(&*self.read()?, team_id) as u64)
    }

    async fn reserve_seat(
        &self,
        member: &TeamMember,
        limit: Option<u32>,
    ) -> TeamResult<SeatReservation> {
        let mut tables = self.write()?;
        let key = (member.team_id(), member.user_id());

        if !tables.teams.contains_key(&member.team_id()) {
            return Err(TeamError::not_found("Team", member.team_id()));
        }

        let existing = tables.members.get(&key).cloned();
        if let Some(existing) = existing.as_ref().filter(|m| m.is_active()) {
            return Ok(SeatReservation::AlreadyActive(existing.clone()));
        }

        if let Some(limit) = limit {
            if count_active(&tables, member.team_id()) >= limit as usize {
                return Err(TeamError::CapacityExceeded {
                    team_id: member.team_id(),
                    limit,
                });
            }
        }

        // A reactivated row keeps its original creation time.
        let created_at = existing.map_or(member.created_at(), |m| m.created_at());
        let flags = member.scheme_flags();
        let stored = TeamMember::from_persistence(
            member.team_id(),
            member.user_id(),
            member.roles().to_string(),
            flags.guest,
            flags.user,
            flags.admin,
            created_at,
            None,
        );

        tables.members.insert(key, stored.clone());
        Ok(SeatReservation::Reserved(stored))
    }

    async fn deactivate_all(&self, team_id: Uuid, at: DateTime<Utc>) -> TeamResult<u64> {
        let mut tables = self.write()?;
        let mut deactivated = 0;

        for member in tables
            .members
            .values_mut()
            .filter(|m| m.team_id() == team_id && m.is_active())
        {
            member.deactivate(at)?;
            deactivated += 1;
        }

        Ok(deactivated)
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn create(&self, user: User) -> TeamResult<User> {
        let mut tables = self.write()?;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(TeamError::conflict("User", "email", user.email.as_str()));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(TeamError::conflict("User", "username", user.username));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> TeamResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

#[async_trait]
impl RoleRepository for InMemoryDatabase {
    async fn find_by_name(&self, name: &str) -> TeamResult<Option<Role>> {
        Ok(self.read()?.roles.get(name).cloned())
    }

    async fn save(&self, role: &Role) -> TeamResult<Role> {
        self.write()?.roles.insert(role.name.clone(), role.clone());
        Ok(role.clone())
    }
}

#[async_trait]
impl SchemeRepository for InMemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<Scheme>> {
        Ok(self.read()?.schemes.get(&id).cloned())
    }

    async fn save(&self, scheme: &Scheme) -> TeamResult<Scheme> {
        self.write()?.schemes.insert(scheme.id, scheme.clone());
        Ok(scheme.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::team::TeamType;

    fn team(name: &str) -> Team {
        Team::new(
            format!("dn_{}", name),
            name.to_string(),
            Email::new(format!("{}@example.com", name)).unwrap(),
            TeamType::Open,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn create_team_rejects_duplicate_name() {
        let db = InMemoryDatabase::new();
        TeamRepository::create(&db, &team("alpha")).await.unwrap();

        let mut duplicate = team("alpha");
        duplicate.set_display_name("Another");
        let result = TeamRepository::create(&db, &duplicate).await;

        assert!(matches!(
            result,
            Err(TeamError::Conflict { field: "name", .. })
        ));
    }

    #[tokio::test]
    async fn update_missing_team_is_not_found() {
        let db = InMemoryDatabase::new();
        let result = TeamRepository::update(&db, &team("ghost")).await;
        assert!(matches!(result, Err(TeamError::NotFound { .. })));
    }

    #[tokio::test]
    async fn reserve_seat_respects_limit() {
        let db = InMemoryDatabase::new();
        let team = TeamRepository::create(&db, &team("seats")).await.unwrap();

        let first = TeamMember::new(team.id(), Uuid::new_v4(), false);
        let second = TeamMember::new(team.id(), Uuid::new_v4(), false);

        let reserved = db.reserve_seat(&first, Some(1)).await.unwrap();
        assert!(matches!(reserved, SeatReservation::Reserved(_)));

        let result = db.reserve_seat(&second, Some(1)).await;
        assert!(matches!(
            result,
            Err(TeamError::CapacityExceeded { limit: 1, .. })
        ));
        assert_eq!(db.active_count(team.id()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn reserve_seat_for_active_member_reports_it() {
        let db = InMemoryDatabase::new();
        let team = TeamRepository::create(&db, &team("again")).await.unwrap();
        let member = TeamMember::new(team.id(), Uuid::new_v4(), false);

        db.reserve_seat(&member, Some(1)).await.unwrap();
        let second = db.reserve_seat(&member, Some(1)).await.unwrap();

        assert!(matches!(second, SeatReservation::AlreadyActive(_)));
    }

    #[tokio::test]
    async fn reserve_seat_for_unknown_team_fails() {
        let db = InMemoryDatabase::new();
        let member = TeamMember::new(Uuid::new_v4(), Uuid::new_v4(), false);

        let result = db.reserve_seat(&member, None).await;
        assert!(matches!(result, Err(TeamError::NotFound { .. })));
    }

    #[tokio::test]
    async fn find_hides_deleted_unless_requested() {
        let db = InMemoryDatabase::new();
        let team = TeamRepository::create(&db, &team("hidden")).await.unwrap();
        let member = TeamMember::new(team.id(), Uuid::new_v4(), false);
        db.reserve_seat(&member, None).await.unwrap();

        db.deactivate(team.id(), member.user_id(), Utc::now())
            .await
            .unwrap();

        let active = db.find(team.id(), member.user_id(), false).await.unwrap();
        let any = db.find(team.id(), member.user_id(), true).await.unwrap();
        assert!(active.is_none());
        assert!(any.is_some_and(|m| !m.is_active()));
    }

    #[tokio::test]
    async fn save_does_not_revive_deleted_membership() {
        let db = InMemoryDatabase::new();
        let team = TeamRepository::create(&db, &team("stale")).await.unwrap();
        let mut snapshot = TeamMember::new(team.id(), Uuid::new_v4(), false);
        db.reserve_seat(&snapshot, Some(1)).await.unwrap();
        db.deactivate(team.id(), snapshot.user_id(), Utc::now())
            .await
            .unwrap();
        let other = TeamMember::new(team.id(), Uuid::new_v4(), false);
        db.reserve_seat(&other, Some(1)).await.unwrap();

        snapshot.set_explicit_roles("").unwrap();
        let result = MemberRepository::save(&db, &snapshot).await;

        assert!(matches!(result, Err(TeamError::NotFound { .. })));
        assert_eq!(db.active_count(team.id()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn save_keeps_stored_identity_fields() {
        let db = InMemoryDatabase::new();
        let team = TeamRepository::create(&db, &team("keep")).await.unwrap();
        let member = TeamMember::new(team.id(), Uuid::new_v4(), false);
        let stored = match db.reserve_seat(&member, None).await.unwrap() {
            SeatReservation::Reserved(stored) => stored,
            other => panic!("Expected reservation, got {:?}", other),
        };

        let mut update = stored.clone();
        update
            .set_scheme_roles(crate::domain::member::SchemeRoleFlags::guest())
            .unwrap();
        let saved = MemberRepository::save(&db, &update).await.unwrap();

        assert!(saved.is_guest());
        assert!(saved.is_active());
        assert_eq!(saved.created_at(), stored.created_at());
    }

    #[tokio::test]
    async fn deactivate_twice_is_not_found() {
        let db = InMemoryDatabase::new();
        let team = TeamRepository::create(&db, &team("twice")).await.unwrap();
        let member = TeamMember::new(team.id(), Uuid::new_v4(), false);
        db.reserve_seat(&member, None).await.unwrap();

        let removed = db
            .deactivate(team.id(), member.user_id(), Utc::now())
            .await
            .unwrap();
        let again = db.deactivate(team.id(), member.user_id(), Utc::now()).await;

        assert!(!removed.is_active());
        assert!(matches!(again, Err(TeamError::NotFound { .. })));
    }

    #[tokio::test]
    async fn deactivate_all_counts_only_active_rows() {
        let db = InMemoryDatabase::new();
        let team = TeamRepository::create(&db, &team("purge")).await.unwrap();
        for _ in 0..3 {
            let member = TeamMember::new(team.id(), Uuid::new_v4(), false);
            db.reserve_seat(&member, None).await.unwrap();
        }

        let removed = db.deactivate_all(team.id(), Utc::now()).await.unwrap();

        assert_eq!(removed, 3);
        assert_eq!(db.active_count(team.id()).await.unwrap(), 0);
        assert_eq!(db.stored_member_rows(team.id()).unwrap(), 3);
    }

    #[tokio::test]
    async fn system_roles_are_scheme_managed() {
        let db = InMemoryDatabase::with_system_roles();
        let role = RoleRepository::find_by_name(&db, "team_admin")
            .await
            .unwrap()
            .unwrap();
        assert!(role.scheme_managed);
    }
}
