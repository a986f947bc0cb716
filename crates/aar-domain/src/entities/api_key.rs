//! ApiKey entity — opaque, used only to attribute a submission to an owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ApiKeyId, OwnerId};

/// A salted-hash API key used to attribute submissions. The core never
/// validates credentials itself (authentication is an external-HTTP-layer
/// Non-goal); this entity exists so ingestion can record which owner a key
/// maps to and enforce per-owner quotas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Generated identifier.
    pub id: ApiKeyId,
    /// The owner this key is attributed to.
    pub owner: OwnerId,
    /// Short, non-secret prefix shown in UIs/logs (e.g. `aar_live_`).
    pub prefix: String,
    /// Salted hash of the full key; the core never stores or compares raw keys.
    pub salted_hash: String,
    /// Whether this key is currently usable.
    pub active: bool,
    /// When this key was last used to attribute a submission.
    pub last_used_at: Option<DateTime<Utc>>,
}
