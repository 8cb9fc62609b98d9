use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tasksmith::api;
use tasksmith::config::Config;
use tasksmith::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);
    tracing::info!("Database gateway: {}", config.database.base_url);
    tracing::info!("Storage bucket: {}", config.storage.bucket);

    let cors = cors_layer(&config.allowed_origins);
    let state = AppState::new(config.clone())?;

    let app = Router::new()
        // Health
        .route("/", get(api::root))
        .route("/health", get(api::health))
        // Catalog search + update
        .route("/v1/update-database", post(api::problems::update_database))
        .route("/v1/query", post(api::problems::query_database))
        .route("/v1/searchsmith-results", post(api::problems::searchsmith_results))
        .route("/v1/generate-only", post(api::problems::generate_only))
        // Task generation + upload
        .route("/generate-preview", post(api::tasks::generate_preview))
        .route("/upload-task", post(api::tasks::upload_task))
        .route("/upload-task-zip", post(api::tasks::upload_task_zip))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// CORS restricted to the configured frontend origins.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
}
