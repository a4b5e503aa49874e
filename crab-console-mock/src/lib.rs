//! In-memory admin backend for the Crab console
//!
//! Implements the `/admin` branch/table contract with a process-local store.
//! Used by integration tests and for running the console against something
//! real during development. Nothing is persisted.

pub mod api;
pub mod state;

pub use api::router;
pub use state::{AdminStore, AppState};

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Bind `addr` and serve the admin router in a background task.
///
/// Pass port 0 to let the OS pick one; the bound address is returned.
pub async fn spawn(
    state: Arc<AppState>,
    addr: SocketAddr,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "mock admin server stopped");
        }
    });

    tracing::info!(addr = %local, "mock admin server listening");
    Ok((local, handle))
}
