use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::domain::member::{SchemeRoleFlags, TeamMember};
use crate::domain::team::{Team, TeamType};
use crate::domain::user::value_objects::Email;
use crate::services::{TeamService, UpdateOptions};

/// Request body for creating a team
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub display_name: String,
    pub name: String,
    pub email: String,
    pub team_type: TeamType,
    pub description: Option<String>,
}

/// Request body for updating a team
#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub display_name: String,
    pub description: Option<String>,
    pub team_type: TeamType,
    pub allow_open_invite: bool,
}

/// Request body for adding a user to a team
#[derive(Debug, Deserialize)]
pub struct JoinTeamRequest {
    pub user_id: Uuid,
}

/// Request body for replacing a member's explicit roles
#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: String,
}

/// Request body for changing a member's scheme slots
///
/// The three slot flags are required; only the reserved flag has a default.
#[derive(Debug, Deserialize)]
pub struct UpdateSchemeRolesRequest {
    pub scheme_guest: bool,
    pub scheme_user: bool,
    pub scheme_admin: bool,
    #[serde(default)]
    pub scheme_reserved: bool,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: Uuid,
    pub display_name: String,
    pub name: String,
    pub email: String,
    pub team_type: TeamType,
    pub description: String,
    pub allow_open_invite: bool,
    pub scheme_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub delete_at: Option<DateTime<Utc>>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            display_name: team.display_name().to_string(),
            name: team.name().to_string(),
            email: team.email().to_string(),
            team_type: team.team_type(),
            description: team.description().to_string(),
            allow_open_invite: team.allow_open_invite(),
            scheme_id: team.scheme_id(),
            created_at: team.created_at(),
            delete_at: team.delete_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub team_id: Uuid,
    pub user_id: Uuid,
    /// Scheme slot roles followed by explicit roles
    pub roles: String,
    pub explicit_roles: String,
    pub scheme_guest: bool,
    pub scheme_user: bool,
    pub scheme_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_added: Option<bool>,
}

impl MemberResponse {
    async fn build(
        service: &TeamService,
        member: &TeamMember,
        already_added: Option<bool>,
    ) -> Result<Self, ApiError> {
        let roles = service.effective_roles(member).await?;
        let flags = member.scheme_flags();

        Ok(Self {
            team_id: member.team_id(),
            user_id: member.user_id(),
            roles,
            explicit_roles: member.roles().to_string(),
            scheme_guest: flags.guest,
            scheme_user: flags.user,
            scheme_admin: flags.admin,
            already_added,
        })
    }
}

/// Create a new team
///
/// POST /api/teams
pub async fn create_team(
    State(service): State<TeamService>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let email = Email::new(&req.email).map_err(ApiError::bad_request)?;
    let mut team = Team::new(req.display_name, req.name, email, req.team_type)?;
    if let Some(description) = req.description {
        team.set_description(description);
    }

    let team = service.create_team(team).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// Get a team by ID
///
/// GET /api/teams/:id
pub async fn get_team(
    State(service): State<TeamService>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = service.get_team(id).await?;
    Ok(Json(TeamResponse::from(&team)))
}

/// Update the editable fields of a team
///
/// PUT /api/teams/:id
pub async fn update_team(
    State(service): State<TeamService>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let mut patch = service.get_team(id).await?;
    patch.set_display_name(req.display_name);
    patch.set_team_type(req.team_type);
    patch.set_allow_open_invite(req.allow_open_invite);
    if let Some(description) = req.description {
        patch.set_description(description);
    }

    let team = service.update_team(&patch, UpdateOptions::default()).await?;
    Ok(Json(TeamResponse::from(&team)))
}

/// Soft-delete a team
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    State(service): State<TeamService>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service.soft_delete_team(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to a team
///
/// POST /api/teams/:id/members
///
/// Responds 201 for a new or reactivated membership and 200 when the user
/// already was a member.
pub async fn add_team_member(
    State(service): State<TeamService>,
    Path(id): Path<Uuid>,
    Json(req): Json<JoinTeamRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let team = service.get_team(id).await?;
    let user = service.get_user(req.user_id).await?;

    let join = service.join_user_to_team(&team, &user).await?;
    let status = if join.already_added {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let body = MemberResponse::build(&service, &join.member, Some(join.already_added)).await?;

    Ok((status, Json(body)))
}

/// List the active members of a team
///
/// GET /api/teams/:id/members
pub async fn get_team_members(
    State(service): State<TeamService>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let members = service.get_team_members(id).await?;

    let mut responses = Vec::with_capacity(members.len());
    for member in &members {
        responses.push(MemberResponse::build(&service, member, None).await?);
    }

    Ok(Json(responses))
}

/// Remove a user from a team
///
/// DELETE /api/teams/:id/members/:user_id
pub async fn remove_team_member(
    State(service): State<TeamService>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let member = service.get_team_member(id, user_id).await?;
    service.remove_team_member(&member).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace a member's explicit roles
///
/// PUT /api/teams/:id/members/:user_id/roles
pub async fn update_team_member_roles(
    State(service): State<TeamService>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateRolesRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = service
        .update_team_member_roles(id, user_id, &req.roles)
        .await?;
    Ok(Json(MemberResponse::build(&service, &member, None).await?))
}

/// Change a member's scheme slots
///
/// PUT /api/teams/:id/members/:user_id/schemeRoles
pub async fn update_team_member_scheme_roles(
    State(service): State<TeamService>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateSchemeRolesRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let flags = SchemeRoleFlags::new(
        req.scheme_guest,
        req.scheme_user,
        req.scheme_admin,
        req.scheme_reserved,
    );
    let member = service
        .update_team_member_scheme_roles(id, user_id, flags)
        .await?;
    Ok(Json(MemberResponse::build(&service, &member, None).await?))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
