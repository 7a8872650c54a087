//! Structured error types for the debt engine.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("artifact {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("artifact: {0}")]
  Artifact(String),

  #[error("feature index {index} out of range for {len} coefficients")]
  Dimension { index: usize, len: usize },

  #[error("model produced a non-finite prediction")]
  NonFinite,

  #[error("files: {0}: content is not a string")]
  Content(String),

  #[error("chart: {0}")]
  Chart(String),

  #[error("config: {field}: {reason}")]
  Config { field: String, reason: String },

  #[error("worker: {0}")]
  Task(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn artifact(msg: impl Into<String>) -> Self {
    Self::Artifact(msg.into())
  }

  pub fn config(field: &str, reason: impl Into<String>) -> Self {
    Self::Config {
      field: field.to_string(),
      reason: reason.into(),
    }
  }
}

impl From<image::ImageError> for EngineError {
  fn from(e: image::ImageError) -> Self {
    Self::Chart(e.to_string())
  }
}
