use async_trait::async_trait;

use crate::domain::role::Role;
use crate::error::TeamResult;

/// Lookup of role definitions by name
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find a role by its unique name
    async fn find_by_name(&self, name: &str) -> TeamResult<Option<Role>>;

    /// Insert or replace a role (used by scheme administration)
    async fn save(&self, role: &Role) -> TeamResult<Role>;
}
