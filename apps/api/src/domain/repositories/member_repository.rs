use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::member::TeamMember;
use crate::error::TeamResult;

/// Outcome of an atomic seat reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatReservation {
    /// A new membership was inserted, or a deleted one reactivated
    Reserved(TeamMember),
    /// The pair already had an active membership when the write committed
    AlreadyActive(TeamMember),
}

/// Repository trait for team memberships
///
/// Memberships are never physically deleted through this trait; removal is a
/// soft delete so that a later join can reactivate the same record.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find the membership of a user in a team
    ///
    /// Soft-deleted memberships are only returned when `include_deleted` is set.
    async fn find(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        include_deleted: bool,
    ) -> TeamResult<Option<TeamMember>>;

    /// All active memberships of a team
    async fn find_by_team(&self, team_id: Uuid) -> TeamResult<Vec<TeamMember>>;

    /// Persist the explicit roles and scheme slots of an active membership
    ///
    /// Only an active stored row is written, and `delete_at` is never taken
    /// from `member`: a copy read before a concurrent removal fails with
    /// `NotFound` instead of bringing the membership back.
    async fn save(&self, member: &TeamMember) -> TeamResult<TeamMember>;

    /// Soft-delete one active membership as of `at`
    ///
    /// Fails with `NotFound` when the membership is absent or already
    /// deleted, so of two concurrent removals only one succeeds.
    async fn deactivate(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> TeamResult<TeamMember>;

    /// Number of active memberships of a team
    async fn active_count(&self, team_id: Uuid) -> TeamResult<u64>;

    /// Atomically insert or reactivate `member` subject to a capacity check
    ///
    /// The active count is re-read inside the same critical section as the
    /// write, so concurrent reservations on one team can never exceed
    /// `limit`. Fails with `CapacityExceeded` when the team is full and with
    /// `NotFound` when the team does not exist.
    async fn reserve_seat(
        &self,
        member: &TeamMember,
        limit: Option<u32>,
    ) -> TeamResult<SeatReservation>;

    /// Soft-delete every active membership of a team, returning how many
    /// were deactivated
    async fn deactivate_all(&self, team_id: Uuid, at: DateTime<Utc>) -> TeamResult<u64>;
}
