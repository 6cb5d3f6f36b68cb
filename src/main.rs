//! Bizmatch HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use bizmatch::config::Config;
use bizmatch::constants::DEFAULT_PROPAGATION_CONCURRENCY;
use bizmatch::embedding::{
    EmbeddingAccessor, HttpEmbedder, HttpEmbedderConfig, LocalEmbedder, LocalEmbedderConfig,
    TextEmbedder,
};
use bizmatch::gateway::{HandlerState, create_router_with_state};
use bizmatch::propagation::{PropagationCoordinator, RetryPolicy, TokioJobQueue};
use bizmatch::ranking::RankingEngine;
use bizmatch::service::RecommendationService;
use bizmatch::store::{HydrationResult, MemoryRecordStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Bizmatch starting"
    );

    let embedder = build_embedder(&config)?;
    tracing::info!(
        backend = embedder.backend_name(),
        dimension = embedder.dimension(),
        "Embedder ready"
    );

    let accessor = Arc::new(EmbeddingAccessor::with_capacity(
        embedder,
        config.embedding_cache_capacity,
    ));
    let dimension = accessor.dimension();
    let engine = Arc::new(RankingEngine::new(accessor));

    let store = Arc::new(MemoryRecordStore::new());
    let snapshot_path = config.snapshot_path();
    match store.hydrate(&snapshot_path).await {
        Ok(HydrationResult::Loaded { records, bytes }) => {
            tracing::info!(records, bytes, "Hydration complete.");
            let mismatched = store.mismatched_dimensions(dimension);
            if !mismatched.is_empty() {
                tracing::warn!(
                    count = mismatched.len(),
                    dimension,
                    "Snapshot holds embeddings the current embedder cannot score against"
                );
            }
        }
        Ok(HydrationResult::NotFound) => {}
        Err(e) => {
            tracing::warn!("Failed to hydrate state: {}. Starting empty.", e);
        }
    }

    let coordinator = Arc::new(
        PropagationCoordinator::new(store.clone(), engine.clone())
            .with_concurrency(DEFAULT_PROPAGATION_CONCURRENCY),
    );
    let queue = Arc::new(TokioJobQueue::spawn(
        coordinator,
        config.propagation_workers,
        RetryPolicy::default().with_max_attempts(config.propagation_max_attempts),
    ));

    let service = Arc::new(RecommendationService::new(
        store.clone(),
        engine,
        queue.clone(),
    ));
    let app = create_router_with_state(HandlerState::new(service));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Draining propagation queue...");
    queue.shutdown().await;

    tracing::info!("Writing snapshot...");
    match store.persist(&snapshot_path).await {
        Ok(result) => tracing::info!(
            records = result.records,
            bytes = result.bytes,
            "Snapshot complete."
        ),
        Err(e) => tracing::error!("Failed to write snapshot: {}", e),
    }

    tracing::info!("Bizmatch shutdown complete");
    Ok(())
}

fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn TextEmbedder>> {
    if let Some(url) = &config.embedding_url {
        let http_config = HttpEmbedderConfig::new(url.clone(), config.embedding_model.clone())
            .with_api_key(config.embedding_api_key.clone())
            .with_dimension(config.embedding_dim);
        return Ok(Arc::new(HttpEmbedder::new(http_config)?));
    }

    let local_config = if let Some(path) = &config.model_path {
        LocalEmbedderConfig::new(path.clone())
    } else {
        tracing::warn!(
            "No BIZMATCH_MODEL_PATH or BIZMATCH_EMBEDDING_URL configured, running embedder in stub mode"
        );
        LocalEmbedderConfig::stub()
    };
    let embedder = LocalEmbedder::load(local_config.with_embedding_dim(config.embedding_dim))?;
    Ok(Arc::new(embedder))
}

fn run_health_check() -> i32 {
    let port = std::env::var("BIZMATCH_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
