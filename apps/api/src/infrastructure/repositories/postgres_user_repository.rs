use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_unique_violation;
use crate::domain::repositories::user_repository::{User, UserRepository};
use crate::domain::user::value_objects::Email;
use crate::error::{TeamError, TeamResult};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    is_guest: bool,
    delete_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = TeamError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(&r.email)
            .map_err(|e| TeamError::Persistence(format!("Invalid email from database: {}", e)))?;

        Ok(User {
            id: r.id,
            username: r.username,
            email,
            is_guest: r.is_guest,
            delete_at: r.delete_at,
        })
    }
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> TeamResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, is_guest, delete_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(user.is_guest)
        .bind(user.delete_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, |constraint| {
                if constraint.contains("email") {
                    TeamError::conflict("User", "email", user.email.as_str())
                } else {
                    TeamError::conflict("User", "username", user.username.clone())
                }
            })
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, is_guest, delete_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> TeamResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, is_guest, delete_at FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }
}
