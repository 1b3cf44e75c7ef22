use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::TeamError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
        }));

        (self.status, body).into_response()
    }
}

impl From<TeamError> for ApiError {
    fn from(err: TeamError) -> Self {
        let status = match &err {
            TeamError::Conflict { .. } => StatusCode::CONFLICT,
            TeamError::NotFound { .. } => StatusCode::NOT_FOUND,
            TeamError::CapacityExceeded { .. } => StatusCode::FORBIDDEN,
            TeamError::Validation(_) => StatusCode::BAD_REQUEST,
            TeamError::Configuration { .. } | TeamError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        }

        Self::new(status, err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn capacity_maps_to_forbidden() {
        let err = ApiError::from(TeamError::CapacityExceeded {
            team_id: Uuid::new_v4(),
            limit: 1,
        });
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.kind, "capacity_exceeded");
    }

    #[test]
    fn configuration_maps_to_server_error() {
        let err = ApiError::from(TeamError::Configuration {
            team_id: Uuid::new_v4(),
            scheme_id: Uuid::new_v4(),
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn conflict_and_not_found() {
        assert_eq!(
            ApiError::from(TeamError::conflict("Team", "name", "x")).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(TeamError::not_found("Team", "x")).status,
            StatusCode::NOT_FOUND
        );
    }
}
