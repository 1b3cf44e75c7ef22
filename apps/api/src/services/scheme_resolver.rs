use std::sync::Arc;

use crate::domain::repositories::SchemeRepository;
use crate::domain::scheme::SchemeRoleNames;
use crate::domain::team::Team;
use crate::error::{TeamError, TeamResult};

/// Resolves the slot role names that apply to a team
///
/// Teams without a scheme use the system roles. A team whose scheme id is
/// set but missing from the store is misconfigured; that is reported as
/// `TeamError::Configuration` instead of silently falling back.
#[derive(Clone)]
pub struct SchemeResolver {
    schemes: Arc<dyn SchemeRepository>,
}

impl SchemeResolver {
    pub fn new(schemes: Arc<dyn SchemeRepository>) -> Self {
        Self { schemes }
    }

    pub async fn resolve_for_team(&self, team: &Team) -> TeamResult<SchemeRoleNames> {
        let Some(scheme_id) = team.scheme_id() else {
            return Ok(SchemeRoleNames::default());
        };

        match self.schemes.find_by_id(scheme_id).await? {
            Some(scheme) => Ok(scheme.role_names()),
            None => {
                tracing::warn!(team_id = %team.id(), %scheme_id, "Team scheme cannot be resolved");
                Err(TeamError::Configuration {
                    team_id: team.id(),
                    scheme_id,
                })
            }
        }
    }
}
