use super::events::TeamEvent;
use super::value_objects::{is_valid_team_name, TeamType};
use crate::domain::user::value_objects::Email;
use crate::error::{TeamError, TeamResult};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const MAX_DISPLAY_NAME_LENGTH: usize = 64;
const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Team aggregate root
///
/// A team is the unit of membership: users join teams, and the team's
/// optional permission scheme decides which concrete roles its members hold.
///
/// # Invariants
/// - Display name is non-empty and at most 64 characters
/// - Name is a valid, non-reserved slug (see [`is_valid_team_name`])
/// - Email is a valid address
/// - A soft-deleted team stays deleted; it can only be purged afterwards
///
/// # Example
/// ```
/// use team_membership_api::domain::team::{Team, TeamType};
/// use team_membership_api::domain::user::value_objects::Email;
///
/// let team = Team::new(
///     "Red Team".to_string(),
///     "red-team".to_string(),
///     Email::new("red@example.com").expect("valid email"),
///     TeamType::Open,
/// )
/// .expect("valid team");
///
/// assert_eq!(team.name(), "red-team");
/// assert!(team.scheme_id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    id: Uuid,
    display_name: String,
    name: String,
    email: Email,
    team_type: TeamType,
    description: String,
    allow_open_invite: bool,
    scheme_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    delete_at: Option<DateTime<Utc>>,
}

impl Team {
    /// Creates a new Team with a freshly generated id
    ///
    /// # Returns
    /// * `Ok(Team)` - The validated team
    /// * `Err(TeamError::Validation)` - If any invariant is violated
    pub fn new(
        display_name: String,
        name: String,
        email: Email,
        team_type: TeamType,
    ) -> TeamResult<Self> {
        let now = Utc::now();
        let team = Self {
            id: Uuid::new_v4(),
            display_name,
            name,
            email,
            team_type,
            description: String::new(),
            allow_open_invite: team_type == TeamType::Open,
            scheme_id: None,
            created_at: now,
            updated_at: now,
            delete_at: None,
        };

        team.validate()?;
        Ok(team)
    }

    /// Checks every field-level invariant
    pub fn validate(&self) -> TeamResult<()> {
        if self.display_name.trim().is_empty() {
            return Err(TeamError::validation("Team display name cannot be empty"));
        }

        if self.display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(TeamError::validation(format!(
                "Team display name cannot exceed {} characters",
                MAX_DISPLAY_NAME_LENGTH
            )));
        }

        if !is_valid_team_name(&self.name) {
            return Err(TeamError::validation(format!(
                "Invalid team name: {}",
                self.name
            )));
        }

        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(TeamError::validation(format!(
                "Team description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }

        Ok(())
    }

    /// Copies the fields a regular (non-import) update may change
    ///
    /// Identity, name, email and scheme are left untouched.
    pub fn apply_patch(&mut self, patch: &Team) -> TeamResult<TeamEvent> {
        if self.is_deleted() {
            return Err(TeamError::validation(format!(
                "Cannot update deleted team {}",
                self.id
            )));
        }

        self.display_name = patch.display_name.clone();
        self.description = patch.description.clone();
        self.team_type = patch.team_type;
        self.allow_open_invite = patch.allow_open_invite;
        self.validate()?;
        self.touch();

        Ok(TeamEvent::Updated { team_id: self.id })
    }

    /// Marks the team as deleted without removing it
    ///
    /// # Business Rules
    /// - A team can only be soft-deleted once
    pub fn soft_delete(&mut self) -> TeamResult<TeamEvent> {
        if self.is_deleted() {
            return Err(TeamError::not_found("Team", self.id));
        }

        let now = Utc::now();
        self.delete_at = Some(now);
        self.updated_at = now;

        Ok(TeamEvent::Deleted { team_id: self.id })
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_allow_open_invite(&mut self, allow: bool) {
        self.allow_open_invite = allow;
    }

    pub fn set_scheme_id(&mut self, scheme_id: Option<Uuid>) {
        self.scheme_id = scheme_id;
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    pub fn set_team_type(&mut self, team_type: TeamType) {
        self.team_type = team_type;
    }

    /// Bumps the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn team_type(&self) -> TeamType {
        self.team_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn allow_open_invite(&self) -> bool {
        self.allow_open_invite
    }

    /// Returns the permission scheme this team uses, if any
    pub fn scheme_id(&self) -> Option<Uuid> {
        self.scheme_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn delete_at(&self) -> Option<DateTime<Utc>> {
        self.delete_at
    }

    /// Returns true once the team has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.delete_at.is_some()
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// This method bypasses validation since the data was validated before
    /// it was stored.
    ///
    /// # Note
    /// Only to be used by repository implementations for data reconstruction.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        display_name: String,
        name: String,
        email: Email,
        team_type: TeamType,
        description: String,
        allow_open_invite: bool,
        scheme_id: Option<Uuid>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        delete_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            display_name,
            name,
            email,
            team_type,
            description,
            allow_open_invite,
            scheme_id,
            created_at,
            updated_at,
            delete_at,
        }
    }
}
