use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mingle::config::AppConfig;
use mingle::events::EventBus;
use mingle::routes;
use mingle::state::AppState;
use mingle::storage::{
    FollowStore, NotificationStore, PgNotificationStore, PgSocialGraph,
    PgSuggestionStore, PgUserStore, SocialGraph, SuggestionStore, UserStore,
};
use mingle::suggest::{RefreshScheduler, SuggestionEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mingle=debug,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let pool = Arc::new(pool);

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(Arc::clone(&pool)));
    let social = Arc::new(PgSocialGraph::new(Arc::clone(&pool)));
    let graph: Arc<dyn SocialGraph> = social.clone();
    let follows: Arc<dyn FollowStore> = social;
    let suggestion_store: Arc<dyn SuggestionStore> =
        Arc::new(PgSuggestionStore::new(Arc::clone(&pool)));
    let notifications: Arc<dyn NotificationStore> =
        Arc::new(PgNotificationStore::new(Arc::clone(&pool)));

    let suggestions = Arc::new(SuggestionEngine::new(
        Arc::clone(&graph),
        suggestion_store,
        Arc::clone(&users),
        config.max_suggestions,
    ));

    RefreshScheduler::new(
        Arc::clone(&suggestions),
        Arc::clone(&graph),
        Duration::from_secs(config.refresh_interval_secs),
    )
    .spawn();

    let events = EventBus::new(config.event_capacity);
    let port = config.port;

    let state = Arc::new(AppState {
        config,
        db_pool: Some(pool),
        users,
        graph,
        follows,
        notifications,
        suggestions,
        events,
    });

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("mingle listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
