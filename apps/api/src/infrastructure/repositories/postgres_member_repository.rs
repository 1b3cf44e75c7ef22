use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::member::TeamMember;
use crate::domain::repositories::{MemberRepository, SeatReservation};
use crate::error::{TeamError, TeamResult};

const MEMBER_COLUMNS: &str = r#"
    team_id, user_id, roles, scheme_guest, scheme_user, scheme_admin, created_at, delete_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    team_id: Uuid,
    user_id: Uuid,
    roles: String,
    scheme_guest: bool,
    scheme_user: bool,
    scheme_admin: bool,
    created_at: DateTime<Utc>,
    delete_at: Option<DateTime<Utc>>,
}

impl From<MemberRow> for TeamMember {
    fn from(r: MemberRow) -> Self {
        TeamMember::from_persistence(
            r.team_id,
            r.user_id,
            r.roles,
            r.scheme_guest,
            r.scheme_user,
            r.scheme_admin,
            r.created_at,
            r.delete_at,
        )
    }
}

/// PostgreSQL implementation of MemberRepository
///
/// Seat reservations lock the team row for the duration of the transaction,
/// which serializes concurrent joins on the same team while leaving other
/// teams unaffected.
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn find(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        include_deleted: bool,
    ) -> TeamResult<Option<TeamMember>> {
        let query = format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM team_members
            WHERE team_id = $1 AND user_id = $2 AND ($3 OR delete_at IS NULL)
            "#
        );

        let row = sqlx::query_as::<_, MemberRow>(&query)
            .bind(team_id)
            .bind(user_id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TeamMember::from))
    }

    async fn find_by_team(&self, team_id: Uuid) -> TeamResult<Vec<TeamMember>> {
        let query = format!(
            r#"
            SELECT {MEMBER_COLUMNS}
            FROM team_members
            WHERE team_id = $1 AND delete_at IS NULL
            ORDER BY created_at
            "#
        );

        let rows = sqlx::query_as::<_, MemberRow>(&query)
            .bind(team_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(TeamMember::from).collect())
    }

    async fn save(&self, member: &TeamMember) -> TeamResult<TeamMember> {
        let query = format!(
            r#"
            UPDATE team_members SET
                roles = $3,
                scheme_guest = $4,
                scheme_user = $5,
                scheme_admin = $6
            WHERE team_id = $1 AND user_id = $2 AND delete_at IS NULL
            RETURNING {MEMBER_COLUMNS}
            "#
        );

        let flags = member.scheme_flags();
        let row = sqlx::query_as::<_, MemberRow>(&query)
            .bind(member.team_id())
            .bind(member.user_id())
            .bind(member.roles())
            .bind(flags.guest)
            .bind(flags.user)
            .bind(flags.admin)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                TeamError::not_found(
                    "TeamMember",
                    format!("team={} user={}", member.team_id(), member.user_id()),
                )
            })?;

        Ok(row.into())
    }

    async fn deactivate(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> TeamResult<TeamMember> {
        let query = format!(
            r#"
            UPDATE team_members SET delete_at = $3
            WHERE team_id = $1 AND user_id = $2 AND delete_at IS NULL
            RETURNING {MEMBER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, MemberRow>(&query)
            .bind(team_id)
            .bind(user_id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                TeamError::not_found("TeamMember", format!("team={} user={}", team_id, user_id))
            })?;

        Ok(row.into())
    }

    async fn active_count(&self, team_id: Uuid) -> TeamResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_members WHERE team_id = $1 AND delete_at IS NULL",
        )
        .bind(team_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn reserve_seat(
        &self,
        member: &TeamMember,
        limit: Option<u32>,
    ) -> TeamResult<SeatReservation> {
        let mut tx = self.pool.begin().await?;

        // Per-team serialization point for concurrent reservations.
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM teams WHERE id = $1 FOR UPDATE")
            .bind(member.team_id())
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(TeamError::not_found("Team", member.team_id()));
        }

        let select = format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members WHERE team_id = $1 AND user_id = $2"
        );
        let existing = sqlx::query_as::<_, MemberRow>(&select)
            .bind(member.team_id())
            .bind(member.user_id())
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(row) = existing.filter(|r| r.delete_at.is_none()) {
            tx.commit().await?;
            return Ok(SeatReservation::AlreadyActive(row.into()));
        }

        if let Some(limit) = limit {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM team_members WHERE team_id = $1 AND delete_at IS NULL",
            )
            .bind(member.team_id())
            .fetch_one(&mut *tx)
            .await?;

            if count >= i64::from(limit) {
                return Err(TeamError::CapacityExceeded {
                    team_id: member.team_id(),
                    limit,
                });
            }
        }

        let upsert = format!(
            r#"
            INSERT INTO team_members ({MEMBER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, NULL)
            ON CONFLICT (team_id, user_id) DO UPDATE SET
                roles = EXCLUDED.roles,
                scheme_guest = EXCLUDED.scheme_guest,
                scheme_user = EXCLUDED.scheme_user,
                scheme_admin = EXCLUDED.scheme_admin,
                delete_at = NULL
            RETURNING {MEMBER_COLUMNS}
            "#
        );

        let flags = member.scheme_flags();
        let row = sqlx::query_as::<_, MemberRow>(&upsert)
            .bind(member.team_id())
            .bind(member.user_id())
            .bind(member.roles())
            .bind(flags.guest)
            .bind(flags.user)
            .bind(flags.admin)
            .bind(member.created_at())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(SeatReservation::Reserved(row.into()))
    }

    async fn deactivate_all(&self, team_id: Uuid, at: DateTime<Utc>) -> TeamResult<u64> {
        let result = sqlx::query(
            "UPDATE team_members SET delete_at = $2 WHERE team_id = $1 AND delete_at IS NULL",
        )
        .bind(team_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
