//! Shared, read-only application state injected into every handler.

use crate::chart::ChartRenderer;
use crate::config::Config;
use crate::registry::ModelRegistry;

pub struct AppState {
  pub registry: ModelRegistry,
  pub chart: ChartRenderer,
}

impl AppState {
  pub fn new(registry: ModelRegistry, chart: ChartRenderer) -> Self {
    Self { registry, chart }
  }

  /// Load models and the chart font once; nothing here is reloaded later.
  pub fn from_config(config: &Config) -> Self {
    Self::new(
      ModelRegistry::load(&config.models_dir),
      ChartRenderer::from_config(config),
    )
  }
}
