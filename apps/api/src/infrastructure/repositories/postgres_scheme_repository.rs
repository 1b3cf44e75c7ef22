use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::repositories::{RoleRepository, SchemeRepository};
use crate::domain::role::Role;
use crate::domain::scheme::Scheme;
use crate::error::TeamResult;

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    name: String,
    display_name: String,
    description: String,
    permissions: Vec<String>,
    scheme_managed: bool,
}

impl From<RoleRow> for Role {
    fn from(r: RoleRow) -> Self {
        Role {
            name: r.name,
            display_name: r.display_name,
            description: r.description,
            permissions: r.permissions,
            scheme_managed: r.scheme_managed,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SchemeRow {
    id: Uuid,
    name: String,
    default_team_guest_role: String,
    default_team_user_role: String,
    default_team_admin_role: String,
}

impl From<SchemeRow> for Scheme {
    fn from(r: SchemeRow) -> Self {
        Scheme {
            id: r.id,
            name: r.name,
            default_team_guest_role: r.default_team_guest_role,
            default_team_user_role: r.default_team_user_role,
            default_team_admin_role: r.default_team_admin_role,
        }
    }
}

/// PostgreSQL implementation of RoleRepository
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_name(&self, name: &str) -> TeamResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, display_name, description, permissions, scheme_managed
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Role::from))
    }

    async fn save(&self, role: &Role) -> TeamResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, display_name, description, permissions, scheme_managed)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                description = EXCLUDED.description,
                permissions = EXCLUDED.permissions,
                scheme_managed = EXCLUDED.scheme_managed
            RETURNING name, display_name, description, permissions, scheme_managed
            "#,
        )
        .bind(&role.name)
        .bind(&role.display_name)
        .bind(&role.description)
        .bind(&role.permissions)
        .bind(role.scheme_managed)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}

/// PostgreSQL implementation of SchemeRepository
pub struct PostgresSchemeRepository {
    pool: PgPool,
}

impl PostgresSchemeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemeRepository for PostgresSchemeRepository {
    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<Scheme>> {
        let row = sqlx::query_as::<_, SchemeRow>(
            r#"
            SELECT id, name, default_team_guest_role, default_team_user_role, default_team_admin_role
            FROM schemes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Scheme::from))
    }

    async fn save(&self, scheme: &Scheme) -> TeamResult<Scheme> {
        let row = sqlx::query_as::<_, SchemeRow>(
            r#"
            INSERT INTO schemes (
                id, name, default_team_guest_role, default_team_user_role, default_team_admin_role
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                default_team_guest_role = EXCLUDED.default_team_guest_role,
                default_team_user_role = EXCLUDED.default_team_user_role,
                default_team_admin_role = EXCLUDED.default_team_admin_role
            RETURNING id, name, default_team_guest_role, default_team_user_role, default_team_admin_role
            "#,
        )
        .bind(scheme.id)
        .bind(&scheme.name)
        .bind(&scheme.default_team_guest_role)
        .bind(&scheme.default_team_user_role)
        .bind(&scheme.default_team_admin_role)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
