use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
///
/// The follow graph is kept in the `follows` relation, not on the user row;
/// follower/following counts are derived when a profile projection is built.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    pub user_name: String,

    pub email: String,

    /// Argon2id hash, never the plain credential.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub avatar_url: Option<String>,

    /// Deactivated accounts keep their data but cannot sign in.
    pub active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(user_name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_name,
            email,
            password_hash,
            avatar_url: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public projection of a user, served to other users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_name: String,
    pub avatar_url: Option<String>,
    pub followers_count: i64,
    pub followings_count: i64,
    pub posts_count: i64,
}
