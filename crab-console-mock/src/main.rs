use crab_console_mock::{AppState, spawn};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crab_console_mock=info,tower_http=info".into()),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let api_token = std::env::var("CRAB_ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

    let state = Arc::new(AppState::new(api_token));
    state.seed_demo().await;

    let (addr, handle) = spawn(state, SocketAddr::from(([127, 0, 0, 1], port))).await?;
    tracing::info!("crab-console-mock ready on http://{}/admin", addr);

    handle.await?;
    Ok(())
}
