//! End-to-end flow over the in-memory stores: accounts are created and
//! seeded, the follow graph evolves, a scheduled pass recomputes every
//! record, and the read path serves a live-filtered view.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use mingle::models::{Follow, User};
use mingle::storage::{FollowStore, MemoryStore, SocialGraph, SuggestionStore, UserStore};
use mingle::suggest::{RefreshScheduler, SuggestError, SuggestionEngine};
use uuid::Uuid;

const CAP: usize = 20;

struct World {
    store: Arc<MemoryStore>,
    engine: Arc<SuggestionEngine>,
    scheduler: RefreshScheduler,
}

impl World {
    fn new() -> Self {
        let store = MemoryStore::new();
        let engine = Arc::new(SuggestionEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            CAP,
        ));
        let scheduler = RefreshScheduler::new(
            engine.clone(),
            store.clone(),
            Duration::from_secs(3600),
        );
        Self {
            store,
            engine,
            scheduler,
        }
    }

    /// Create an account and seed its suggestions, as signup does.
    async fn signup(&self, name: &str) -> Uuid {
        let user = User::new(
            name.to_string(),
            format!("{name}@example.com"),
            "hash".to_string(),
        );
        let user = UserStore::create(self.store.as_ref(), user).await.unwrap();
        self.engine.seed(user.id).await.unwrap();
        user.id
    }

    async fn follow(&self, follower: Uuid, following: Uuid) {
        self.store
            .follow(Follow::new(follower, following))
            .await
            .unwrap();
    }

    async fn stored_users(&self, owner: Uuid) -> Vec<Uuid> {
        self.store
            .find_by_owner(owner)
            .await
            .unwrap()
            .unwrap()
            .users
    }

    /// Assert the snapshot invariants for every record.
    async fn assert_invariants(&self) {
        for owner in self.store.all_user_ids().await.unwrap() {
            let users = self.stored_users(owner).await;
            assert!(users.len() <= CAP, "cap exceeded for {owner}");
            assert!(!users.contains(&owner), "{owner} suggested to itself");
            let unique: HashSet<_> = users.iter().collect();
            assert_eq!(unique.len(), users.len(), "duplicates for {owner}");
        }
    }
}

#[tokio::test]
async fn signup_seeds_a_bounded_record_for_everyone() {
    let world = World::new();
    let mut ids = Vec::new();
    for i in 0..25 {
        ids.push(world.signup(&format!("user{i}")).await);
    }

    // the 25th account saw 24 existing users, capped to 20
    assert_eq!(world.stored_users(ids[24]).await.len(), 24.min(CAP));
    // the first account saw nobody
    assert!(world.stored_users(ids[0]).await.is_empty());

    world.assert_invariants().await;
}

#[tokio::test]
async fn scheduled_pass_tracks_the_evolving_graph() {
    let world = World::new();
    let mut ids = Vec::new();
    for i in 0..32 {
        ids.push(world.signup(&format!("user{i}")).await);
    }
    let owner = ids[0];

    // two accounts follow the owner; the owner follows someone else
    world.follow(ids[5], owner).await;
    world.follow(ids[9], owner).await;
    world.follow(owner, ids[3]).await;

    world.scheduler.run_once().await;

    let users = world.stored_users(owner).await;
    assert_eq!(users.len(), CAP);
    // follow-back candidates lead the list
    assert_eq!(&users[..2], &[ids[5], ids[9]]);
    // followed accounts are not suggested
    assert!(!users.contains(&ids[3]));

    world.assert_invariants().await;
}

#[tokio::test]
async fn read_path_filters_live_and_honors_limit() {
    let world = World::new();
    let mut ids = Vec::new();
    for i in 0..30 {
        ids.push(world.signup(&format!("user{i}")).await);
    }
    let owner = ids[29];
    world.scheduler.run_once().await;

    let stored = world.stored_users(owner).await;
    assert_eq!(stored.len(), CAP);

    // follow a stored candidate after the refresh; it must disappear from
    // the served view even though the snapshot still carries it
    world.follow(owner, stored[4]).await;

    let served = world.engine.suggest(owner, CAP).await.unwrap();
    let served_ids: Vec<Uuid> = served.iter().map(|p| p.id).collect();
    assert!(!served_ids.contains(&stored[4]));
    assert_eq!(served_ids.len(), CAP - 1);

    // a smaller limit truncates while preserving relative order
    let top5 = world.engine.suggest(owner, 5).await.unwrap();
    let top5_ids: Vec<Uuid> = top5.iter().map(|p| p.id).collect();
    assert_eq!(top5_ids, served_ids[..5].to_vec());

    // an out-of-range limit is refused outright
    let err = world.engine.suggest(owner, CAP + 1).await.unwrap_err();
    assert!(matches!(err, SuggestError::LimitExceedsMaximum { .. }));
}

#[tokio::test]
async fn one_failing_record_does_not_stall_the_batch() {
    let world = World::new();
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(world.signup(&format!("user{i}")).await);
    }
    let poisoned = ids[2];
    let before = world.stored_users(poisoned).await;

    world.store.fail_suggestion_writes_for(poisoned).await;
    // make the graph move so refreshed lists change
    world.follow(ids[4], ids[0]).await;
    world.scheduler.run_once().await;
    world.store.clear_write_failures().await;

    // the poisoned record kept its previous value
    assert_eq!(world.stored_users(poisoned).await, before);
    // everyone else was recomputed: the new follower now leads user0's list
    assert_eq!(world.stored_users(ids[0]).await[0], ids[4]);

    // the next pass picks the failed user back up
    world.scheduler.run_once().await;
    let record = world
        .store
        .find_by_owner(poisoned)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.users.len(), 4);
}
