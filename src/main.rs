//! Thread Chat - conversation API with Redis-backed memory
//!
//! Accepts a user message, replays the thread's history to an
//! OpenAI-compatible completion provider, stores both sides of the turn and
//! returns the reply.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;
mod store;

use config::Config;
use crate::core::{ChatEngine, MemoryStore};
use providers::{OpenAICompatConfig, OpenAICompatProvider};
use store::{InMemoryBackend, RedisBackend, ThreadBackend};

/// `REDIS_URL` value that keeps threads in process memory instead
const IN_MEMORY_URL: &str = "memory://";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat_engine: Arc<ChatEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thread_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let backend: Arc<dyn ThreadBackend> = if config.redis_url == IN_MEMORY_URL {
        tracing::warn!("Using in-process thread storage; threads are lost on restart");
        Arc::new(InMemoryBackend::new())
    } else {
        tracing::info!("Connecting to {}", config.redis_url);
        Arc::new(RedisBackend::connect(&config.redis_url).await?)
    };
    let memory = Arc::new(MemoryStore::new(backend, config.message_ttl));

    let provider = Arc::new(OpenAICompatProvider::new(OpenAICompatConfig::from_config(
        &config,
    ))?);
    tracing::info!("Using model {} at {}", config.openai_model, config.openai_base_url);

    let state = AppState {
        chat_engine: Arc::new(ChatEngine::new(provider, memory)),
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(routes::cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Thread chat API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
