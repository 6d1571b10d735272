//! Storage contracts for the service.
//!
//! Every consumer takes these traits as injected `Arc<dyn ...>` handles, so
//! the Postgres implementations can be swapped for the in-memory ones in
//! tests. The suggestion engine only ever sees the read-only [`SocialGraph`]
//! view of the follow relation; writes go through [`FollowStore`], which is
//! owned by the account subsystem.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Follow, Notification, Profile, SuggestionRecord, User};

pub use memory::MemoryStore;
pub use postgres::{
    PgNotificationStore, PgSocialGraph, PgSuggestionStore, PgUserStore,
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Account records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: User) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Public projection with follower/following/post counts derived from
    /// the graph.
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>>;
}

/// Read-only queries over the follow relation and the user population.
///
/// Enumeration order of [`all_user_ids`](SocialGraph::all_user_ids) is stable
/// across calls within one refresh cycle; it is not guaranteed stable across
/// cycles.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    async fn is_following(&self, follower: Uuid, following: Uuid) -> Result<bool>;

    /// Ids of users following `user`, in edge-creation order.
    async fn followers_of(&self, user: Uuid) -> Result<Vec<Uuid>>;

    async fn all_user_ids(&self) -> Result<Vec<Uuid>>;
}

/// Mutations of the follow relation.
#[async_trait]
pub trait FollowStore: Send + Sync {
    /// Create the edge. Creating an edge that already exists is a no-op.
    async fn follow(&self, edge: Follow) -> Result<()>;

    async fn unfollow(&self, follower: Uuid, following: Uuid) -> Result<()>;
}

/// One suggestion record per owner. Uniqueness is enforced by the backend:
/// the record is keyed by owner, and `create` for an existing owner fails
/// with [`StorageError::Conflict`].
#[async_trait]
pub trait SuggestionStore: Send + Sync {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<SuggestionRecord>>;

    async fn insert(&self, record: SuggestionRecord) -> Result<SuggestionRecord>;

    /// Overwrite the stored record for `record.owner`.
    async fn save(&self, record: &SuggestionRecord) -> Result<()>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn add(&self, notification: Notification) -> Result<Notification>;

    /// Notifications for `user`, newest first.
    async fn for_user(&self, user: Uuid) -> Result<Vec<Notification>>;
}
