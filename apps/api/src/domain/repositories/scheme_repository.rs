use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::scheme::Scheme;
use crate::error::TeamResult;

/// Lookup of permission schemes
#[async_trait]
pub trait SchemeRepository: Send + Sync {
    /// Find a scheme by ID
    async fn find_by_id(&self, id: Uuid) -> TeamResult<Option<Scheme>>;

    /// Insert or replace a scheme
    async fn save(&self, scheme: &Scheme) -> TeamResult<Scheme>;
}
