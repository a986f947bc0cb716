//! In-memory [`ApiKeyRepository`].

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use aar_domain::entities::ApiKey;
use aar_domain::error::{Error, Result};
use aar_domain::ports::ApiKeyRepository;
use aar_domain::value_objects::{ApiKeyId, OwnerId};

/// `DashMap`-backed API key store, keyed by key ID with lookup by `(prefix, salted_hash)`.
#[derive(Default)]
pub struct InMemoryApiKeyRepository {
    rows: DashMap<ApiKeyId, ApiKey>,
}

impl InMemoryApiKeyRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key directly (used by tests and local bootstrap, not part of the port).
    pub fn insert(&self, key: ApiKey) {
        self.rows.insert(key.id, key);
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn resolve_owner(&self, prefix: &str, salted_hash: &str) -> Result<OwnerId> {
        self.rows
            .iter()
            .find(|r| r.active && r.prefix == prefix && r.salted_hash == salted_hash)
            .map(|r| r.owner)
            .ok_or_else(|| Error::not_found("api key"))
    }

    async fn mark_used(&self, id: ApiKeyId) -> Result<()> {
        if let Some(mut row) = self.rows.get_mut(&id) {
            row.last_used_at = Some(Utc::now());
        }
        Ok(())
    }
}
