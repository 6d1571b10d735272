//! Periodic recomputation of every user's suggestion record.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::storage::SocialGraph;
use crate::suggest::{SuggestError, SuggestionEngine};

/// Drives one refresh per user on a fixed interval.
///
/// A tick enumerates the whole population and refreshes each user
/// independently; one user's failure is logged and the rest of the batch
/// proceeds. There is no retry: the next tick recomputes from scratch. A
/// user found without a record (an account whose seeding was lost) is seeded
/// here instead.
pub struct RefreshScheduler {
    engine: Arc<SuggestionEngine>,
    graph: Arc<dyn SocialGraph>,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(
        engine: Arc<SuggestionEngine>,
        graph: Arc<dyn SocialGraph>,
        period: Duration,
    ) -> Self {
        Self {
            engine,
            graph,
            period,
        }
    }

    /// Run the refresh loop until the task is aborted. The first pass runs
    /// immediately at startup.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            loop {
                ticker.tick().await;
                self.run_once().await;
            }
        })
    }

    /// One full pass over the population. Never returns an error: failures
    /// are logged per user and swallowed.
    pub async fn run_once(&self) {
        let ids = match self.graph.all_user_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "could not enumerate users for suggestion refresh");
                return;
            }
        };

        debug!(users = ids.len(), "starting suggestion refresh pass");

        let tasks = ids.into_iter().map(|id| {
            let engine = Arc::clone(&self.engine);
            async move { refresh_one(&engine, id).await }
        });
        join_all(tasks).await;
    }
}

async fn refresh_one(engine: &SuggestionEngine, id: Uuid) {
    match engine.refresh(id).await {
        Ok(()) => {}
        Err(SuggestError::NotFound(_)) => {
            if let Err(e) = engine.seed(id).await {
                warn!(user = %id, error = %e, "could not seed missing suggestion record");
            }
        }
        Err(e) => {
            warn!(user = %id, error = %e, "suggestion refresh failed, keeping previous record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Follow, User};
    use crate::storage::{FollowStore, MemoryStore, SuggestionStore, UserStore};

    fn scheduler(store: &Arc<MemoryStore>) -> RefreshScheduler {
        let engine = Arc::new(SuggestionEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            20,
        ));
        RefreshScheduler::new(engine, store.clone(), Duration::from_secs(3600))
    }

    async fn add_users(store: &Arc<MemoryStore>, count: usize) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for i in 0..count {
            let user = User::new(
                format!("user{i}"),
                format!("user{i}@example.com"),
                "hash".into(),
            );
            ids.push(UserStore::create(store.as_ref(), user).await.unwrap().id);
        }
        ids
    }

    #[tokio::test]
    async fn pass_refreshes_every_record() {
        let store = MemoryStore::new();
        let ids = add_users(&store, 5).await;
        let scheduler = scheduler(&store);
        for id in &ids {
            scheduler.engine.seed(*id).await.unwrap();
        }
        let before: Vec<_> = {
            let mut stamps = Vec::new();
            for id in &ids {
                stamps.push(store.find_by_owner(*id).await.unwrap().unwrap().updated_at);
            }
            stamps
        };

        scheduler.run_once().await;

        for (id, seeded_at) in ids.iter().zip(before) {
            let record = store.find_by_owner(*id).await.unwrap().unwrap();
            assert!(record.updated_at > seeded_at);
        }
    }

    #[tokio::test]
    async fn pass_survives_one_user_failing() {
        let store = MemoryStore::new();
        let ids = add_users(&store, 5).await;
        let scheduler = scheduler(&store);
        for id in &ids {
            scheduler.engine.seed(*id).await.unwrap();
        }
        let poisoned = ids[2];
        let poisoned_before = store
            .find_by_owner(poisoned)
            .await
            .unwrap()
            .unwrap();
        store.fail_suggestion_writes_for(poisoned).await;

        scheduler.run_once().await;

        for id in &ids {
            let record = store.find_by_owner(*id).await.unwrap().unwrap();
            if *id == poisoned {
                assert_eq!(record.updated_at, poisoned_before.updated_at);
                assert_eq!(record.users, poisoned_before.users);
            } else {
                assert!(record.updated_at > poisoned_before.updated_at);
            }
        }
    }

    #[tokio::test]
    async fn pass_seeds_users_without_a_record() {
        let store = MemoryStore::new();
        let ids = add_users(&store, 4).await;
        let scheduler = scheduler(&store);
        // only the first user was seeded at signup
        scheduler.engine.seed(ids[0]).await.unwrap();

        scheduler.run_once().await;

        for id in &ids {
            let record = store.find_by_owner(*id).await.unwrap();
            assert!(record.is_some());
        }
    }

    #[tokio::test]
    async fn pass_recomputes_against_the_current_graph() {
        let store = MemoryStore::new();
        let ids = add_users(&store, 4).await;
        let scheduler = scheduler(&store);
        for id in &ids {
            scheduler.engine.seed(*id).await.unwrap();
        }

        // ids[3] follows ids[0] after seeding; the next pass must surface it
        // as the first (follow-back) candidate for ids[0]
        store
            .follow(Follow::new(ids[3], ids[0]))
            .await
            .unwrap();

        scheduler.run_once().await;

        let record = store.find_by_owner(ids[0]).await.unwrap().unwrap();
        assert_eq!(record.users[0], ids[3]);
    }
}
