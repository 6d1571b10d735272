use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::EventBus;
use crate::storage::{FollowStore, NotificationStore, SocialGraph, UserStore};
use crate::suggest::SuggestionEngine;

/// Shared application state, handed to every route and service.
///
/// All storage handles are trait objects so the Postgres implementations can
/// be replaced by in-memory ones in tests.
pub struct AppState {
    pub config: AppConfig,

    /// Present when backed by Postgres; used by the health endpoint.
    pub db_pool: Option<Arc<PgPool>>,

    pub users: Arc<dyn UserStore>,

    pub graph: Arc<dyn SocialGraph>,

    pub follows: Arc<dyn FollowStore>,

    pub notifications: Arc<dyn NotificationStore>,

    pub suggestions: Arc<SuggestionEngine>,

    pub events: EventBus,
}
