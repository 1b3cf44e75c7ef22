use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use team_membership_api::api;
use team_membership_api::config::{AppConfig, SharedConfig};
use team_membership_api::infrastructure::repositories::InMemoryDatabase;
use team_membership_api::services::{TeamService, TeamStores, TracingEventSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let stores = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database connected successfully");

            TeamStores::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            TeamStores::in_memory(Arc::new(InMemoryDatabase::with_system_roles()))
        }
    };

    let settings = SharedConfig::new(config.team);
    let service = TeamService::new(stores, Arc::new(settings), Arc::new(TracingEventSink));

    let app = api::router(service);

    tracing::info!("Server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
