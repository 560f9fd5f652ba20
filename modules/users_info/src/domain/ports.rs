use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::DomainError;

/// Transport-agnostic port to the random-user generator.
///
/// Returns raw external records; callers map them with
/// [`crate::domain::mapper::map_external`].
#[async_trait]
pub trait RandomUserSource: Send + Sync {
    async fn fetch(&self, count: u32) -> Result<Vec<Value>, DomainError>;
}
