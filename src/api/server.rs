//! HTTP server lifecycle: bind, spawn the axum server in a background task,
//! and return a handle with a shutdown channel.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Failed to get server address: {0}")]
    LocalAddr(std::io::Error),
}

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    pub started_at: DateTime<Utc>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Ask the server to stop accepting connections and drain in-flight ones.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn stopped(self) {
        if let Err(e) = self.task.await {
            tracing::error!("API server task failed: {e}");
        }
    }
}

/// Bind `addr` (port 0 picks an ephemeral port) and start serving.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        started_at: Utc::now(),
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pipeline::delivery::MockCrmClient;
    use crate::pipeline::extraction::MockOcrEngine;
    use crate::pipeline::processor::{PipelineSettings, TranslationProcessor};
    use crate::pipeline::storage::{MemoryObjectStore, ObjectStore};
    use crate::pipeline::translation::{MockTranslationService, Translator};

    fn test_context() -> ApiContext {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
        let processor = TranslationProcessor::new(
            Box::new(MockOcrEngine::with_lines(&["x"])),
            Translator::new(Box::new(MockTranslationService::returning("y"))),
            store.clone(),
            Box::new(MockCrmClient::new()),
            PipelineSettings::new("translations"),
        );
        ApiContext::new(processor, store, "intake")
    }

    #[tokio::test]
    async fn start_serve_and_stop() {
        let mut server = start_server(test_context(), "127.0.0.1:0".parse().unwrap())
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert!(resp.status().is_success());

        server.shutdown();
        server.stopped().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = start_server(test_context(), "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let err = start_server(test_context(), first.addr).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
        first.shutdown();
    }
}
