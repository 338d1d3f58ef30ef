//! latchkv server binary.

use latchkv::config::ServerConfig;
use latchkv::server::build_router;
use latchkv::state::AppState;
use latchkv::store::LockStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::load()?;
    let store = LockStore::new("latchkv");
    let state = AppState::new(store);
    let app = build_router(&state);

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    tracing::info!(addr = %config.http_addr, "latchkv listening");
    axum::serve(listener, app).await?;

    Ok(())
}
