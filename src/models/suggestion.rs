use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user list of suggested accounts to follow.
///
/// Exactly one record exists per owner. The `users` list is a snapshot: it
/// never contains the owner, never contains a duplicate, and at the moment it
/// was computed contained nobody the owner already followed. Staleness
/// between recomputations is expected; the read path re-filters live.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SuggestionRecord {
    pub owner: Uuid,
    pub users: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SuggestionRecord {
    pub fn new(owner: Uuid, users: Vec<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            owner,
            users,
            created_at: now,
            updated_at: now,
        }
    }
}
