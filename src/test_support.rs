//! Shared helpers for tests that exercise HTTP clients against local stubs.

use axum::Router;

/// Serve `router` on an ephemeral localhost port. Returns the base URL.
pub(crate) async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Stub server error: {e}");
        }
    });
    format!("http://{addr}")
}

/// Minimal bytes that pass format detection as a PDF.
pub(crate) const PDF_BYTES: &[u8] = b"%PDF-1.4\n%stub\n";
