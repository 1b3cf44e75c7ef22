// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_member_repository;
pub mod postgres_scheme_repository;
pub mod postgres_team_repository;
pub mod postgres_user_repository;

pub use in_memory::InMemoryDatabase;
pub use postgres_member_repository::PostgresMemberRepository;
pub use postgres_scheme_repository::{PostgresRoleRepository, PostgresSchemeRepository};
pub use postgres_team_repository::PostgresTeamRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::error::TeamError;

/// Turns a unique-constraint violation into a conflict error
///
/// `conflict` receives the violated constraint name so callers can tell
/// which field collided.
pub(crate) fn map_unique_violation<F>(err: sqlx::Error, conflict: F) -> TeamError
where
    F: Fn(&str) -> TeamError,
{
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return conflict(db_err.constraint().unwrap_or_default());
        }
    }
    TeamError::from(err)
}
