use serde::Serialize;
use uuid::Uuid;

/// Domain events raised by team and membership transitions
///
/// The core does not deliver notifications itself; events are handed to a
/// [`TeamEventSink`](crate::services::TeamEventSink) and downstream systems
/// (channel cleanup, websocket broadcast, audit) subscribe there.
///
/// # Example
/// ```
/// use team_membership_api::domain::team::events::TeamEvent;
/// use uuid::Uuid;
///
/// let event = TeamEvent::MemberJoined {
///     team_id: Uuid::new_v4(),
///     user_id: Uuid::new_v4(),
///     rejoined: false,
/// };
/// assert_eq!(event.name(), "member_joined");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TeamEvent {
    /// Fired when a team is created
    Created {
        team_id: Uuid,
        name: String,
    },
    /// Fired when team fields change
    Updated {
        team_id: Uuid,
    },
    /// Fired when a team is soft-deleted
    Deleted {
        team_id: Uuid,
    },
    /// Fired when a team and its memberships are purged
    Purged {
        team_id: Uuid,
        /// Number of memberships deactivated by the purge
        members_removed: u64,
    },
    /// Fired when a user becomes an active member
    MemberJoined {
        team_id: Uuid,
        user_id: Uuid,
        /// True when a previously removed membership was reactivated
        rejoined: bool,
    },
    /// Fired when a membership is soft-deleted
    MemberRemoved {
        team_id: Uuid,
        user_id: Uuid,
    },
    /// Fired when a member's explicit roles change
    MemberRolesUpdated {
        team_id: Uuid,
        user_id: Uuid,
        roles: String,
    },
    /// Fired when a member's scheme slots change
    MemberSchemeRolesUpdated {
        team_id: Uuid,
        user_id: Uuid,
        guest: bool,
        user: bool,
        admin: bool,
    },
}

impl TeamEvent {
    /// Returns the team_id for this event
    pub fn team_id(&self) -> Uuid {
        match self {
            TeamEvent::Created { team_id, .. }
            | TeamEvent::Updated { team_id }
            | TeamEvent::Deleted { team_id }
            | TeamEvent::Purged { team_id, .. }
            | TeamEvent::MemberJoined { team_id, .. }
            | TeamEvent::MemberRemoved { team_id, .. }
            | TeamEvent::MemberRolesUpdated { team_id, .. }
            | TeamEvent::MemberSchemeRolesUpdated { team_id, .. } => *team_id,
        }
    }

    /// Returns the affected user for membership events
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            TeamEvent::MemberJoined { user_id, .. }
            | TeamEvent::MemberRemoved { user_id, .. }
            | TeamEvent::MemberRolesUpdated { user_id, .. }
            | TeamEvent::MemberSchemeRolesUpdated { user_id, .. } => Some(*user_id),
            _ => None,
        }
    }

    /// Stable event name used in logs and serialized payloads
    pub fn name(&self) -> &'static str {
        match self {
            TeamEvent::Created { .. } => "created",
            TeamEvent::Updated { .. } => "updated",
            TeamEvent::Deleted { .. } => "deleted",
            TeamEvent::Purged { .. } => "purged",
            TeamEvent::MemberJoined { .. } => "member_joined",
            TeamEvent::MemberRemoved { .. } => "member_removed",
            TeamEvent::MemberRolesUpdated { .. } => "member_roles_updated",
            TeamEvent::MemberSchemeRolesUpdated { .. } => "member_scheme_roles_updated",
        }
    }
}
