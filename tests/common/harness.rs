//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bizmatch::embedding::{EmbeddingAccessor, MockEmbedder, TextEmbedder};
use bizmatch::gateway::{HandlerState, create_router_with_state};
use bizmatch::propagation::{PropagationCoordinator, RetryPolicy, TokioJobQueue};
use bizmatch::ranking::RankingEngine;
use bizmatch::service::RecommendationService;
use bizmatch::store::{CompanyRecord, InstrumentedRecordStore, MemoryRecordStore};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub type TestStore = InstrumentedRecordStore<MemoryRecordStore>;

pub struct TestServerConfig {
    pub records: Vec<CompanyRecord>,
    pub embedder: Arc<dyn TextEmbedder>,
    pub workers: usize,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            embedder: Arc::new(MockEmbedder::new(super::fixtures::DIM)),
            workers: 2,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<TestStore>,
    pub queue: Arc<TokioJobQueue>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    /// Waits for every queued propagation job, then stops the HTTP server.
    pub async fn drain(mut self) -> Arc<TestStore> {
        self.queue.shutdown().await;
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        Arc::clone(&self.store)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(interval).await,
        }
    }
}

/// Spawns the full stack (store, ranking, propagation workers, router) on an
/// ephemeral port with an in-memory store and a mock embedder.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;

    let store = Arc::new(InstrumentedRecordStore::new(
        MemoryRecordStore::with_records(config.records),
    ));
    let engine = Arc::new(RankingEngine::new(Arc::new(EmbeddingAccessor::new(
        config.embedder,
    ))));
    let coordinator = Arc::new(PropagationCoordinator::new(store.clone(), engine.clone()));
    let queue = Arc::new(TokioJobQueue::spawn(
        coordinator,
        config.workers,
        RetryPolicy::default().immediate(),
    ));
    let service = Arc::new(RecommendationService::new(
        store.clone(),
        engine,
        queue.clone(),
    ));
    let app = create_router_with_state(HandlerState::new(service));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    wait_for_server_ready(
        addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr,
        store,
        queue,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
