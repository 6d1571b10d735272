use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed edge of the social graph: `follower` follows `following`.
/// One edge per ordered pair; existence of the edge is the sole source of
/// truth for the relationship.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub follower: Uuid,
    pub following: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    pub fn new(follower: Uuid, following: Uuid) -> Self {
        Self {
            follower,
            following,
            created_at: Utc::now(),
        }
    }
}
