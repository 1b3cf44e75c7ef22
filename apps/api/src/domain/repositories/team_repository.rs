use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::team::Team;
use crate::error::TeamResult;

/// Repository trait for Team aggregate
///
/// Defines the contract for persisting and retrieving teams.
/// Implementations must reject duplicate names and emails with
/// `TeamError::Conflict`.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Insert a new team
    async fn create(&self, team: &Team) -> TeamResult<Team>;

    /// Overwrite an existing team; `NotFound` if it does not exist
    async fn update(&self, team: &Team) -> TeamResult<Team>;

    /// Find a team by its ID, including soft-deleted teams
    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<Team>>;

    /// Find a team by its unique name
    async fn find_by_name(&self, name: &str) -> TeamResult<Option<Team>>;

    /// Physically remove a team record; `NotFound` if it does not exist
    async fn delete(&self, id: Uuid) -> TeamResult<()>;
}
