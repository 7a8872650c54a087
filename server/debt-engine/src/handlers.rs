//! HTTP handlers for the debt engine.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::Value;
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::error::EngineError;
use crate::scoring;
use crate::state::AppState;
use crate::types::{ErrorBody, ModelsResponse, PredictRequest, PredictResponse, NO_FILES_MESSAGE};

/// Handler-boundary error: a client error or a generic failure with its message.
#[derive(Debug)]
pub enum ApiError {
  BadRequest(String),
  Internal(String),
}

impl From<EngineError> for ApiError {
  fn from(e: EngineError) -> Self {
    Self::Internal(e.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      Self::Internal(m) => {
        error!(error = %m, "predict failed");
        (StatusCode::INTERNAL_SERVER_ERROR, m)
      }
    };
    (status, Json(ErrorBody { error: message })).into_response()
  }
}

pub async fn health() -> &'static str {
  "ok"
}

pub async fn models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
  Json(ModelsResponse {
    supported: state.registry.supported(),
  })
}

pub async fn predict(
  State(state): State<Arc<AppState>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
  // Unreadable or non-object bodies count as unexpected failures, not client errors.
  let Json(body) = body.map_err(|rejection| ApiError::Internal(rejection.body_text()))?;
  let payload = PredictRequest::from_body(body)
    .ok_or_else(|| ApiError::Internal("request body must be a JSON object".to_string()))?;

  let request_id = Uuid::new_v4();
  let span = info_span!("predict", %request_id);

  if is_empty_value(&payload.files) {
    return Err(ApiError::BadRequest(NO_FILES_MESSAGE.to_string()));
  }
  let files = match payload.files {
    Value::Object(files) => files,
    other => {
      return Err(ApiError::Internal(format!(
        "files: expected an object of filename to content, got {}",
        other
      )))
    }
  };

  span.in_scope(|| {
    info!(
      repo = %payload.repo,
      commit = %payload.commit,
      files = files.len(),
      "received request"
    )
  });

  let worker = Arc::clone(&state);
  let analysis = tokio::task::spawn_blocking(move || {
    let _guard = span.enter();
    scoring::score_files(&worker.registry, &worker.chart, &files)
  })
  .await
  .map_err(|e| EngineError::Task(e.to_string()))??;

  Ok(Json(PredictResponse {
    repository: payload.repo,
    commit: payload.commit,
    analysis,
  }))
}

/// Absent, null, false, zero, and empty strings/arrays/objects all mean "no files".
fn is_empty_value(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Bool(b) => !b,
    Value::Number(n) => n.as_f64() == Some(0.0),
    Value::String(s) => s.is_empty(),
    Value::Array(a) => a.is_empty(),
    Value::Object(o) => o.is_empty(),
  }
}
