//! Friend-suggestion core.
//!
//! Each user owns a single bounded list of suggested accounts. The list is
//! seeded when the account is created and recomputed on a schedule: followers
//! the owner has not followed back come first, then the list is topped up
//! from the rest of the population. The read path re-filters against the
//! live graph so a follow made between recomputations never resurfaces as a
//! suggestion.

pub mod scheduler;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Profile, SuggestionRecord};
use crate::storage::{SocialGraph, StorageError, SuggestionStore, UserStore};

pub use scheduler::RefreshScheduler;

/// Default cap on stored and returned candidates.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 20;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("no suggestion record for user {0}")]
    NotFound(Uuid),

    #[error("limit {requested} exceeds the maximum of {max}")]
    LimitExceedsMaximum { requested: usize, max: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct SuggestionEngine {
    graph: Arc<dyn SocialGraph>,
    store: Arc<dyn SuggestionStore>,
    users: Arc<dyn UserStore>,
    cap: usize,
}

impl SuggestionEngine {
    pub fn new(
        graph: Arc<dyn SocialGraph>,
        store: Arc<dyn SuggestionStore>,
        users: Arc<dyn UserStore>,
        cap: usize,
    ) -> Self {
        Self {
            graph,
            store,
            users,
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Create the initial record for a new account.
    ///
    /// Candidates are taken in population-enumeration order, skipping the
    /// owner and anyone the owner already follows, until the cap is reached.
    /// A freshly created account follows nobody, but the filter still runs so
    /// the snapshot invariant holds even if a signup flow ever pre-populates
    /// follows.
    pub async fn seed(&self, owner: Uuid) -> Result<SuggestionRecord, SuggestError> {
        let mut candidates = Vec::new();
        for id in self.graph.all_user_ids().await? {
            if candidates.len() == self.cap {
                break;
            }
            if id == owner || self.graph.is_following(owner, id).await? {
                continue;
            }
            candidates.push(id);
        }

        let record = self
            .store
            .insert(SuggestionRecord::new(owner, candidates))
            .await?;

        Ok(record)
    }

    /// Recompute the owner's candidate list against the current graph.
    ///
    /// Touches only the owner's record and issues read-only graph queries,
    /// so refreshes for different users are independent and safe to run
    /// concurrently. A follow racing with the recomputation can produce a
    /// momentarily stale list; the list is a snapshot, not a live view.
    pub async fn refresh(&self, owner: Uuid) -> Result<(), SuggestError> {
        let mut record = self
            .store
            .find_by_owner(owner)
            .await?
            .ok_or(SuggestError::NotFound(owner))?;

        // Followers the owner has not followed back, in follower order.
        let mut candidates = Vec::new();
        for follower in self.graph.followers_of(owner).await? {
            if candidates.len() == self.cap {
                break;
            }
            if !self.graph.is_following(owner, follower).await? {
                candidates.push(follower);
            }
        }

        // Top up from the rest of the population.
        if candidates.len() < self.cap {
            for id in self.graph.all_user_ids().await? {
                if candidates.len() == self.cap {
                    break;
                }
                if id == owner || candidates.contains(&id) {
                    continue;
                }
                if self.graph.is_following(owner, id).await? {
                    continue;
                }
                candidates.push(id);
            }
        }

        record.users = candidates;
        record.updated_at = Utc::now();
        self.store.save(&record).await?;

        Ok(())
    }

    /// Resolve the owner's stored candidates into public profiles.
    ///
    /// Candidates the owner followed since the last recomputation are
    /// dropped here, against the live graph, preserving relative order; the
    /// result is then cut to `limit`. A `limit` above the cap is rejected
    /// outright with no partial result.
    pub async fn suggest(&self, owner: Uuid, limit: usize) -> Result<Vec<Profile>, SuggestError> {
        if limit > self.cap {
            return Err(SuggestError::LimitExceedsMaximum {
                requested: limit,
                max: self.cap,
            });
        }

        let record = self
            .store
            .find_by_owner(owner)
            .await?
            .ok_or(SuggestError::NotFound(owner))?;

        let mut suggestions = Vec::new();
        for id in record.users {
            if suggestions.len() == limit {
                break;
            }
            if self.graph.is_following(owner, id).await? {
                continue;
            }
            match self.users.profile(id).await? {
                Some(profile) => suggestions.push(profile),
                // candidate account vanished between refresh and read
                None => debug!(user = %id, "dropping stale suggestion candidate"),
            }
        }

        Ok(suggestions)
    }
}
