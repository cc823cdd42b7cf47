mod assessment;
mod config;
mod criteria;
mod errors;
mod extract;
mod metrics;
mod pipeline;
mod report;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::criteria::CriteriaSet;
use crate::metrics::ApiMetrics;
use crate::pipeline::classify::{EvidenceClassifier, LexicalClassifier, ZeroShotClassifier};
use crate::pipeline::embedding::{Embedder, FastEmbedder, HashEmbedder};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("o1a_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting O-1A Assessment API v{}", env!("CARGO_PKG_VERSION"));

    // Load the criteria definitions once; assessments share them read-only.
    let criteria = Arc::new(CriteriaSet::load(&config.criteria_file)?);
    info!(
        "Loaded {} criteria from {}",
        criteria.len(),
        config.criteria_file
    );

    // Initialize embedding backend (fastembed pulls model weights on first run)
    let embedder: Arc<dyn Embedder> = match config.embedder_backend.as_str() {
        "hash" => Arc::new(HashEmbedder::default()),
        _ => Arc::new(FastEmbedder::new()?),
    };
    info!("Embedder initialized (backend: {})", embedder.name());

    // Initialize evidence classifier (LexicalClassifier by default — swap via
    // ENABLE_REMOTE_CLASSIFIER + HF_API_TOKEN)
    let classifier: Arc<dyn EvidenceClassifier> = match &config.hf_api_token {
        Some(token) if config.enable_remote_classifier => {
            Arc::new(ZeroShotClassifier::new(token.clone()))
        }
        _ => Arc::new(LexicalClassifier),
    };
    info!("Classifier initialized (backend: {})", classifier.name());

    // Build app state
    let state = AppState {
        config: config.clone(),
        criteria,
        embedder,
        classifier,
        metrics: Arc::new(ApiMetrics::default()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
