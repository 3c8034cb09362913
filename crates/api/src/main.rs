use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod error;
mod middleware;
mod routes;
mod state;

use crate::state::AppState;
use waitlist_core::auth::AdminGate;
use waitlist_core::config::Settings;
use waitlist_store::{FileStore, MemoryStore, SubscriptionService, SubscriptionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let settings = Settings::from_env()?;

    let store: Arc<dyn SubscriptionStore> = match &settings.store_dir {
        Some(dir) => {
            let store = FileStore::open(dir.clone()).await?;
            info!(dir = %dir.display(), subscribers = store.count().await?, "using file store");
            Arc::new(store)
        }
        None => {
            info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState {
        service: SubscriptionService::new(store),
        gate: Arc::new(AdminGate::new(
            settings.admin_credentials(),
            settings.session_ttl(),
        )),
        waitlist_env: settings.waitlist_env.clone(),
    };

    let app = routes::app(state);

    let addr: SocketAddr = settings.api_bind.parse()?;

    info!(%addr, env = %settings.waitlist_env, "starting api");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
