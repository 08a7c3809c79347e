use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod db;
mod error;
mod integrations;
mod models;
mod services;

use config::Config;
use constants::API_VERSION;
use db::{Database, MemoryStore, WalletStore};
use integrations::gemini::GeminiClient;
use integrations::sui::SuiClient;
use services::agent::llm::{DisabledModel, LanguageModel};
use services::wallet_actions::{build_registry, domain_action_map};
use services::AgentPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting wallet agent");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);

    let store = build_store(&config).await?;
    let llm = build_llm(&config)?;
    let chain = Arc::new(SuiClient::new(
        config.sui_rpc_url.clone(),
        config.sui_network.clone(),
    ));

    let registry = build_registry(store.clone(), chain)?;
    let pipeline = AgentPipeline::new(
        llm.clone(),
        Arc::new(registry),
        Arc::new(domain_action_map()),
        Duration::from_millis(config.agent_run_timeout_ms),
    )?;

    let app_state = api::AppState {
        pipeline: Arc::new(pipeline),
        store,
        config: config.clone(),
        llm_provider: llm.provider_name(),
    };

    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn WalletStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::info!("Using in-memory wallet store");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let db = Database::new(config, database_url).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db.run_migrations().await?;
    Ok(Arc::new(db))
}

fn build_llm(config: &Config) -> anyhow::Result<Arc<dyn LanguageModel>> {
    match config.google_ai_api_key.clone() {
        Some(key) => {
            tracing::info!("LLM provider: gemini ({})", config.gemini_model);
            Ok(Arc::new(GeminiClient::new(key, config.gemini_model.clone())?))
        }
        None => Ok(Arc::new(DisabledModel)),
    }
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Agent
        .route("/api/v1/agent/message", post(api::agent::handle_message))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
