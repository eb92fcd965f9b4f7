mod api;
mod error;
mod state;

use std::net::SocketAddr;

use guestdesk_core::Config;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

const DEFAULT_PORT: u16 = 5080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "guestdesk_web=debug,guestdesk_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("GUESTDESK_CONFIG") {
        Ok(path) => Config::from_json_file(std::path::Path::new(&path))?,
        Err(_) => Config::from_env()?,
    };
    tracing::debug!(?config, "Loaded configuration");

    let port = match std::env::var("GUESTDESK_PORT") {
        Ok(v) => v.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    let state = AppState::new(config).await?;
    let app = api::app(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting guestdesk on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
