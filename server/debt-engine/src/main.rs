//! Binary entrypoint for the debt engine.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use debt_engine::{AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::registry()
    .with(fmt::layer())
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = Config::from_env()?;
  let state = Arc::new(AppState::from_config(&config));
  info!(
    models_dir = %config.models_dir.display(),
    supported = ?state.registry.supported(),
    "model registry ready"
  );

  let app = debt_engine::router(state);

  let addr = config.addr();
  info!("debt-engine listening on http://{}", addr);

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
