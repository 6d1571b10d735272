//! Postgres-backed store implementations.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Follow, Notification, Profile, SuggestionRecord, User};
use crate::storage::{
    FollowStore, NotificationStore, Result, SocialGraph, StorageError,
    SuggestionStore, UserStore,
};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: User) -> Result<User> {
        sqlx::query(
            "INSERT INTO users \
             (id, user_name, email, password_hash, avatar_url, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Conflict(format!("user {}", user.user_name))
            } else {
                StorageError::from(e)
            }
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let user = match self.find_by_id(id).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        let followers_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE following = $1")
                .bind(id)
                .fetch_one(self.pool.as_ref())
                .await?;

        let followings_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower = $1")
                .bind(id)
                .fetch_one(self.pool.as_ref())
                .await?;

        let posts_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author = $1")
                .bind(id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(Some(Profile {
            id: user.id,
            user_name: user.user_name,
            avatar_url: user.avatar_url,
            followers_count,
            followings_count,
            posts_count,
        }))
    }
}

pub struct PgSocialGraph {
    pool: Arc<PgPool>,
}

impl PgSocialGraph {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialGraph for PgSocialGraph {
    async fn is_following(&self, follower: Uuid, following: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower = $1 AND following = $2)",
        )
        .bind(follower)
        .bind(following)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn followers_of(&self, user: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT follower FROM follows WHERE following = $1 ORDER BY created_at, follower",
        )
        .bind(user)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }

    async fn all_user_ids(&self) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM users ORDER BY created_at, id")
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(ids)
    }
}

#[async_trait]
impl FollowStore for PgSocialGraph {
    async fn follow(&self, edge: Follow) -> Result<()> {
        sqlx::query(
            "INSERT INTO follows (follower, following, created_at) \
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(edge.follower)
        .bind(edge.following)
        .bind(edge.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn unfollow(&self, follower: Uuid, following: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM follows WHERE follower = $1 AND following = $2")
            .bind(follower)
            .bind(following)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}

pub struct PgSuggestionStore {
    pool: Arc<PgPool>,
}

impl PgSuggestionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SuggestionStore for PgSuggestionStore {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<SuggestionRecord>> {
        let record = sqlx::query_as::<_, SuggestionRecord>(
            "SELECT owner, users, created_at, updated_at FROM suggestions WHERE owner = $1",
        )
        .bind(owner)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn insert(&self, record: SuggestionRecord) -> Result<SuggestionRecord> {
        sqlx::query(
            "INSERT INTO suggestions (owner, users, created_at, updated_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(record.owner)
        .bind(&record.users)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Conflict(format!("suggestion record for {}", record.owner))
            } else {
                StorageError::from(e)
            }
        })?;

        Ok(record)
    }

    async fn save(&self, record: &SuggestionRecord) -> Result<()> {
        let result = sqlx::query(
            "UPDATE suggestions SET users = $2, updated_at = $3 WHERE owner = $1",
        )
        .bind(record.owner)
        .bind(&record.users)
        .bind(record.updated_at)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

pub struct PgNotificationStore {
    pool: Arc<PgPool>,
}

impl PgNotificationStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn add(&self, notification: Notification) -> Result<Notification> {
        sqlx::query(
            "INSERT INTO notifications \
             (id, dest_user, actor, kind, content, image, read, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(notification.id)
        .bind(notification.dest_user)
        .bind(notification.actor)
        .bind(notification.kind)
        .bind(&notification.content)
        .bind(&notification.image)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(notification)
    }

    async fn for_user(&self, user: Uuid) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE dest_user = $1 ORDER BY created_at DESC",
        )
        .bind(user)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(notifications)
    }
}
