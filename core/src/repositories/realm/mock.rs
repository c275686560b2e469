//! In-memory implementation of RealmRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::Realm;
use crate::errors::StoreError;

use super::trait_::RealmRepository;

/// Mock realm repository for testing
pub struct MockRealmRepository {
    realms: Arc<RwLock<HashMap<Uuid, Realm>>>,
}

impl MockRealmRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self {
            realms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a realm
    pub async fn put(&self, realm: Realm) {
        self.realms.write().await.insert(realm.id, realm);
    }
}

impl Default for MockRealmRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RealmRepository for MockRealmRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Realm>, StoreError> {
        Ok(self.realms.read().await.get(&id).cloned())
    }

    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<Realm>, StoreError> {
        Ok(self
            .realms
            .read()
            .await
            .values()
            .find(|r| r.api_key_hash == hash)
            .cloned())
    }
}
