//! Technical Debt Scoring Engine
//!
//! HTTP service that scores submitted source files with a per-language
//! vectorizer/model bundle, buckets the score into a risk tier, and attaches
//! heuristic quality metrics plus a rendered chart of them.
//! Models are loaded once at startup; no DB, no per-request state.

pub mod chart;
pub mod config;
pub mod error;
mod handlers;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod scoring;
mod state;
pub mod types;
pub mod vectorizer;

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use chart::ChartRenderer;
pub use config::Config;
pub use error::EngineError;
pub use handlers::{health, models, predict, ApiError};
pub use registry::{ModelEntry, ModelRegistry};
pub use state::AppState;
pub use types::{Language, Risk, ScoringResult};

/// All routes with permissive CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/models", get(models))
    .route("/predict", post(predict))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
