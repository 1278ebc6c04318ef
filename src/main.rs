use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tracing_subscriber::EnvFilter;

use anime_recommender::api;
use anime_recommender::config::Config;
use anime_recommender::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);
    if config.llm.api_key.is_none() && config.llm.provider != "ollama" {
        tracing::warn!("No LLM API key configured; generation requests will be rejected");
    }

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;

    let app = Router::new()
        .route("/", get(serve_index))
        .route("/api/recommend", get(api::recommend::recommend))
        .route("/api/metadata", get(api::catalog::metadata))
        .route("/api/top-anime", get(api::catalog::top_anime))
        .route("/api/top-characters", get(api::catalog::top_characters))
        .with_state(state)
        .fallback(get(serve_index));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
