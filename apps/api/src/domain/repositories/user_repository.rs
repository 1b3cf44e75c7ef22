use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::user::value_objects::Email;
use crate::error::TeamResult;

/// User data as seen by the membership core
///
/// Users are owned by another subsystem; only the fields needed to admit
/// someone to a team are modelled here.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Email,
    /// Guests may only ever hold the guest slot of a team
    pub is_guest: bool,
    pub delete_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates an active, non-guest user
    pub fn new(username: impl Into<String>, email: Email) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email,
            is_guest: false,
            delete_at: None,
        }
    }

    /// Returns true for users that have not been deactivated
    pub fn is_active(&self) -> bool {
        self.delete_at.is_none()
    }
}

/// Repository trait for users
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> TeamResult<User>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<User>>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &Email) -> TeamResult<Option<User>>;
}
