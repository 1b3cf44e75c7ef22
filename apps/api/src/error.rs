use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the team membership core
///
/// Every variant carries the offending identifier so callers can render an
/// actionable message without inspecting strings.
#[derive(Debug, Error)]
pub enum TeamError {
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Team {team_id} is full (limit of {limit} members reached)")]
    CapacityExceeded { team_id: Uuid, limit: u32 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Team {team_id} references scheme {scheme_id} which cannot be resolved")]
    Configuration { team_id: Uuid, scheme_id: Uuid },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type TeamResult<T> = Result<T, TeamError>;

impl TeamError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            field,
            value: value.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TeamError::Conflict { .. } => "conflict",
            TeamError::NotFound { .. } => "not_found",
            TeamError::CapacityExceeded { .. } => "capacity_exceeded",
            TeamError::Validation(_) => "validation",
            TeamError::Configuration { .. } => "configuration",
            TeamError::Persistence(_) => "persistence",
        }
    }
}

impl From<sqlx::Error> for TeamError {
    fn from(err: sqlx::Error) -> Self {
        TeamError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = TeamError::not_found("Role", "new_role");
        assert_eq!(err.to_string(), "Role not found: new_role");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn capacity_message_names_limit() {
        let team_id = Uuid::new_v4();
        let err = TeamError::CapacityExceeded { team_id, limit: 1 };
        assert!(err.to_string().contains("limit of 1"));
        assert!(err.to_string().contains(&team_id.to_string()));
    }

    #[test]
    fn conflict_message() {
        let err = TeamError::conflict("Team", "name", "alpha");
        assert_eq!(err.to_string(), "Team with name 'alpha' already exists");
    }
}
