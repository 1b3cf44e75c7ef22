use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_unique_violation;
use crate::domain::repositories::TeamRepository;
use crate::domain::team::{Team, TeamType};
use crate::domain::user::value_objects::Email;
use crate::error::{TeamError, TeamResult};

const TEAM_COLUMNS: &str = r#"
    id, display_name, name, email, team_type, description,
    allow_open_invite, scheme_id, created_at, updated_at, delete_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    display_name: String,
    name: String,
    email: String,
    team_type: TeamType,
    description: String,
    allow_open_invite: bool,
    scheme_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    delete_at: Option<DateTime<Utc>>,
}

impl TryFrom<TeamRow> for Team {
    type Error = TeamError;

    fn try_from(r: TeamRow) -> Result<Self, Self::Error> {
        let email = Email::new(&r.email)
            .map_err(|e| TeamError::Persistence(format!("Invalid email from database: {}", e)))?;

        Ok(Team::from_persistence(
            r.id,
            r.display_name,
            r.name,
            email,
            r.team_type,
            r.description,
            r.allow_open_invite,
            r.scheme_id,
            r.created_at,
            r.updated_at,
            r.delete_at,
        ))
    }
}

/// PostgreSQL implementation of TeamRepository
///
/// Name and email uniqueness is enforced by unique constraints; violations
/// surface as `TeamError::Conflict`.
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn team_conflict(team: &Team) -> impl Fn(&str) -> TeamError + '_ {
    move |constraint| {
        if constraint.contains("email") {
            TeamError::conflict("Team", "email", team.email().as_str())
        } else {
            TeamError::conflict("Team", "name", team.name())
        }
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn create(&self, team: &Team) -> TeamResult<Team> {
        let query = format!(
            r#"
            INSERT INTO teams ({TEAM_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {TEAM_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, TeamRow>(&query)
            .bind(team.id())
            .bind(team.display_name())
            .bind(team.name())
            .bind(team.email().as_str())
            .bind(team.team_type())
            .bind(team.description())
            .bind(team.allow_open_invite())
            .bind(team.scheme_id())
            .bind(team.created_at())
            .bind(team.updated_at())
            .bind(team.delete_at())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, team_conflict(team)))?;

        row.try_into()
    }

    async fn update(&self, team: &Team) -> TeamResult<Team> {
        let query = format!(
            r#"
            UPDATE teams SET
                display_name = $2,
                name = $3,
                email = $4,
                team_type = $5,
                description = $6,
                allow_open_invite = $7,
                scheme_id = $8,
                updated_at = $9,
                delete_at = $10
            WHERE id = $1
            RETURNING {TEAM_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, TeamRow>(&query)
            .bind(team.id())
            .bind(team.display_name())
            .bind(team.name())
            .bind(team.email().as_str())
            .bind(team.team_type())
            .bind(team.description())
            .bind(team.allow_open_invite())
            .bind(team.scheme_id())
            .bind(team.updated_at())
            .bind(team.delete_at())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, team_conflict(team)))?
            .ok_or_else(|| TeamError::not_found("Team", team.id()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<Team>> {
        let query = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1");

        sqlx::query_as::<_, TeamRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Team::try_from)
            .transpose()
    }

    async fn find_by_name(&self, name: &str) -> TeamResult<Option<Team>> {
        let query = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE name = $1");

        sqlx::query_as::<_, TeamRow>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(Team::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> TeamResult<()> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TeamError::not_found("Team", id));
        }

        Ok(())
    }
}
