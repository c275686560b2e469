//! Realm repository trait for resolving tenant policy records.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Realm;
use crate::errors::StoreError;

/// Repository trait for realm lookup
///
/// The engines receive fully-hydrated `Realm` values; only the HTTP layer
/// performs lookups, resolving the calling realm from its hashed API key.
#[async_trait]
pub trait RealmRepository: Send + Sync {
    /// Find a realm by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Realm>, StoreError>;

    /// Find a realm by the SHA-256 hex digest of its API key
    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<Realm>, StoreError>;
}
