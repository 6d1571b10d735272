//! In-memory store used by tests and local development.
//!
//! A single [`MemoryStore`] implements every storage contract, with users
//! kept in insertion order so population enumeration is stable. Writes to
//! suggestion records can be made to fail for selected owners, which is how
//! the partial-failure behavior of the refresh batch is exercised.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Follow, Notification, Profile, SuggestionRecord, User};
use crate::storage::{
    FollowStore, NotificationStore, Result, SocialGraph, StorageError,
    SuggestionStore, UserStore,
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    user_order: RwLock<Vec<Uuid>>,
    follows: RwLock<Vec<Follow>>,
    suggestions: RwLock<HashMap<Uuid, SuggestionRecord>>,
    notifications: RwLock<Vec<Notification>>,
    failing_owners: RwLock<HashSet<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make suggestion-record writes fail for `owner` until cleared.
    pub async fn fail_suggestion_writes_for(&self, owner: Uuid) {
        self.failing_owners.write().await.insert(owner);
    }

    pub async fn clear_write_failures(&self) {
        self.failing_owners.write().await.clear();
    }

    async fn check_writable(&self, owner: Uuid) -> Result<()> {
        if self.failing_owners.read().await.contains(&owner) {
            return Err(StorageError::Backend(format!(
                "injected write failure for {owner}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StorageError::Conflict(format!("user {}", user.email)));
        }
        self.user_order.write().await.push(user.id);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let user = match self.users.read().await.get(&id).cloned() {
            Some(user) => user,
            None => return Ok(None),
        };

        let follows = self.follows.read().await;
        let followers_count = follows.iter().filter(|f| f.following == id).count() as i64;
        let followings_count = follows.iter().filter(|f| f.follower == id).count() as i64;

        Ok(Some(Profile {
            id: user.id,
            user_name: user.user_name,
            avatar_url: user.avatar_url,
            followers_count,
            followings_count,
            posts_count: 0,
        }))
    }
}

#[async_trait]
impl SocialGraph for MemoryStore {
    async fn is_following(&self, follower: Uuid, following: Uuid) -> Result<bool> {
        Ok(self
            .follows
            .read()
            .await
            .iter()
            .any(|f| f.follower == follower && f.following == following))
    }

    async fn followers_of(&self, user: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .follows
            .read()
            .await
            .iter()
            .filter(|f| f.following == user)
            .map(|f| f.follower)
            .collect())
    }

    async fn all_user_ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.user_order.read().await.clone())
    }
}

#[async_trait]
impl FollowStore for MemoryStore {
    async fn follow(&self, edge: Follow) -> Result<()> {
        let mut follows = self.follows.write().await;
        if follows
            .iter()
            .any(|f| f.follower == edge.follower && f.following == edge.following)
        {
            return Ok(());
        }
        follows.push(edge);
        Ok(())
    }

    async fn unfollow(&self, follower: Uuid, following: Uuid) -> Result<()> {
        self.follows
            .write()
            .await
            .retain(|f| !(f.follower == follower && f.following == following));
        Ok(())
    }
}

#[async_trait]
impl SuggestionStore for MemoryStore {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<SuggestionRecord>> {
        Ok(self.suggestions.read().await.get(&owner).cloned())
    }

    async fn insert(&self, record: SuggestionRecord) -> Result<SuggestionRecord> {
        self.check_writable(record.owner).await?;
        let mut suggestions = self.suggestions.write().await;
        if suggestions.contains_key(&record.owner) {
            return Err(StorageError::Conflict(format!(
                "suggestion record for {}",
                record.owner
            )));
        }
        suggestions.insert(record.owner, record.clone());
        Ok(record)
    }

    async fn save(&self, record: &SuggestionRecord) -> Result<()> {
        self.check_writable(record.owner).await?;
        let mut suggestions = self.suggestions.write().await;
        match suggestions.get_mut(&record.owner) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn add(&self, notification: Notification) -> Result<Notification> {
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn for_user(&self, user: Uuid) -> Result<Vec<Notification>> {
        let mut out: Vec<Notification> = self
            .notifications
            .read()
            .await
            .iter()
            .filter(|n| n.dest_user == user)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User::new(name.to_string(), format!("{name}@example.com"), "hash".into())
    }

    #[tokio::test]
    async fn enumeration_preserves_insertion_order() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["ada", "brie", "cam"] {
            let u = store.create(user(name)).await.unwrap();
            ids.push(u.id);
        }
        assert_eq!(store.all_user_ids().await.unwrap(), ids);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        store.create(user("ada")).await.unwrap();
        let err = store.create(user("ada")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn follow_edges_drive_graph_queries() {
        let store = MemoryStore::new();
        let a = store.create(user("ada")).await.unwrap();
        let b = store.create(user("brie")).await.unwrap();

        store.follow(Follow::new(a.id, b.id)).await.unwrap();
        assert!(store.is_following(a.id, b.id).await.unwrap());
        assert!(!store.is_following(b.id, a.id).await.unwrap());
        assert_eq!(store.followers_of(b.id).await.unwrap(), vec![a.id]);

        // double follow is a no-op
        store.follow(Follow::new(a.id, b.id)).await.unwrap();
        assert_eq!(store.followers_of(b.id).await.unwrap().len(), 1);

        store.unfollow(a.id, b.id).await.unwrap();
        assert!(!store.is_following(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn second_record_for_owner_is_conflict() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store
            .insert(SuggestionRecord::new(owner, vec![]))
            .await
            .unwrap();
        let err = store
            .insert(SuggestionRecord::new(owner, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn save_without_record_is_not_found() {
        let store = MemoryStore::new();
        let record = SuggestionRecord::new(Uuid::new_v4(), vec![]);
        let err = store.save(&record).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
