//! HTTP contract tests for the debt engine.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use debt_engine::{AppState, ChartRenderer, Language, ModelRegistry};

/// Prediction = 0.25 + 0.3 per "import" + 0.4 per "todo" (raw counts).
fn python_bundle() -> Value {
  json!({
    "vectorizer": {
      "vocabulary": {"import": 0, "todo": 1},
      "norm": null
    },
    "model": {"kind": "linear", "coef": [0.3, 0.4], "intercept": 0.25}
  })
}

fn app_with(bundles: &[(Language, Value)]) -> (TempDir, Router) {
  let dir = tempfile::tempdir().unwrap();
  for (language, bundle) in bundles {
    std::fs::write(
      ModelRegistry::artifact_path(dir.path(), *language),
      bundle.to_string(),
    )
    .unwrap();
  }
  let state = AppState::new(ModelRegistry::load(dir.path()), ChartRenderer::new(640, 480));
  (dir, debt_engine::router(Arc::new(state)))
}

fn app() -> (TempDir, Router) {
  app_with(&[(Language::Python, python_bundle())])
}

async fn post_raw(app: Router, body: String) -> (StatusCode, Value) {
  let req = Request::builder()
    .method("POST")
    .uri("/predict")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body))
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: Router, body: Value) -> (StatusCode, Value) {
  post_raw(app, body.to_string()).await
}

#[tokio::test]
async fn single_python_file_is_fully_scored() {
  let (_dir, app) = app();
  let (status, body) = post(
    app,
    json!({"repo": "acme/api", "commit": "abc123", "files": {"a.py": "x=1\n"}}),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["repository"], "acme/api");
  assert_eq!(body["commit"], "abc123");

  let result = &body["analysis"]["a.py"];
  assert_eq!(result["technical_debt_score"], 0.25);
  assert_eq!(result["risk"], "Low");
  assert_eq!(result["language"], "python");
  assert_eq!(result["lines_of_code"], 1);
  assert_eq!(result["bug_density"], 0.05);
  assert_eq!(result["comment_density"], 0.0);
  let mi = result["maintainability_index"].as_f64().unwrap();
  assert!((0.0..=100.0).contains(&mi));

  let graph = result["metrics_graph"].as_str().unwrap();
  assert!(!graph.is_empty());
  let png = STANDARD.decode(graph).unwrap();
  assert_eq!(&png[1..4], b"PNG");
}

#[tokio::test]
async fn risk_follows_prediction() {
  let (_dir, app) = app();
  // 0.25 + 0.3 = 0.55 -> Medium; 0.25 + 0.3 + 0.4 = 0.95 -> High.
  let (status, body) = post(
    app,
    json!({"files": {
      "mid.py": "import os\n",
      "high.py": "import os  # todo\n"
    }}),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["analysis"]["mid.py"]["risk"], "Medium");
  assert_eq!(body["analysis"]["mid.py"]["technical_debt_score"], 0.55);
  assert_eq!(body["analysis"]["high.py"]["risk"], "High");
  assert_eq!(body["analysis"]["high.py"]["technical_debt_score"], 0.95);
}

#[tokio::test]
async fn unknown_and_unloaded_languages_get_exact_stub() {
  let (_dir, app) = app();
  let (status, body) = post(
    app,
    json!({"repo": "r", "commit": "c", "files": {"foo.rb": "puts 1", "app.js": "let x = 1;"}}),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  let stub = json!({
    "technical_debt_score": "N/A",
    "message": "No model found for this language"
  });
  assert_eq!(body["analysis"]["foo.rb"], stub);
  assert_eq!(body["analysis"]["app.js"], stub);
}

#[tokio::test]
async fn analysis_keeps_submission_order() {
  let (_dir, app) = app();
  let (_, body) = post_raw(
    app,
    r#"{"files": {"z.py": "x", "b.rb": "y", "a.py": "z"}}"#.to_string(),
  )
  .await;

  let keys: Vec<&str> = body["analysis"]
    .as_object()
    .unwrap()
    .keys()
    .map(String::as_str)
    .collect();
  assert_eq!(keys, vec!["z.py", "b.rb", "a.py"]);
}

#[tokio::test]
async fn empty_or_missing_files_is_a_client_error() {
  for payload in [
    json!({"repo": "r", "commit": "c", "files": {}}),
    json!({"repo": "r", "commit": "c"}),
    json!({"files": null}),
  ] {
    let (_dir, app) = app();
    let (status, body) = post(app, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No files received"}));
  }
}

#[tokio::test]
async fn missing_repo_and_commit_echo_null() {
  let (_dir, app) = app();
  let (status, body) = post(app, json!({"files": {"a.rb": ""}})).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["repository"].is_null());
  assert!(body["commit"].is_null());
}

#[tokio::test]
async fn malformed_body_is_a_server_error() {
  let (_dir, app) = app();
  let (status, body) = post_raw(app, "{ not json".to_string()).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn non_string_file_content_is_a_server_error() {
  let (_dir, app) = app();
  let (status, body) = post(app, json!({"files": {"a.py": 5}})).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body["error"].as_str().unwrap().starts_with("files:"));
}

#[tokio::test]
async fn non_string_content_for_unscored_language_gets_stub() {
  let (_dir, app) = app();
  let (status, body) = post(app, json!({"files": {"foo.rb": 1, "a.py": "x=1\n"}})).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body["analysis"]["foo.rb"],
    json!({"technical_debt_score": "N/A", "message": "No model found for this language"})
  );
  assert_eq!(body["analysis"]["a.py"]["language"], "python");
}

#[tokio::test]
async fn non_object_files_is_a_server_error() {
  let (_dir, app) = app();
  let (status, body) = post(app, json!({"files": ["a.py"]})).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body["error"].as_str().unwrap().starts_with("files:"));
}

#[tokio::test]
async fn array_body_is_a_server_error() {
  for body in [json!([]), json!(["acme/api", "abc123", {"a.py": "x=1\n"}])] {
    let (_dir, app) = app();
    let (status, resp) = post(app, body.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", body);
    assert_eq!(resp["error"], "request body must be a JSON object");
  }
}

#[tokio::test]
async fn inference_failure_returns_no_partial_results() {
  let exploding = json!({
    "vectorizer": {"vocabulary": {"todo": 0}, "norm": null},
    "model": {"kind": "linear", "coef": [1e308], "intercept": 1e308}
  });
  let (_dir, app) = app_with(&[
    (Language::Python, python_bundle()),
    (Language::Java, exploding),
  ]);
  let (status, body) = post(
    app,
    json!({"files": {"ok.py": "x = 1", "Bad.java": "// todo todo"}}),
  )
  .await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body.get("analysis").is_none());
  assert!(body["error"].as_str().unwrap().contains("non-finite"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
  let (_dir, app) = app();
  let req = Request::builder()
    .method("POST")
    .uri("/predict")
    .header(header::ORIGIN, "https://dashboard.example.com")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(json!({"files": {"a.py": "x"}}).to_string()))
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn models_endpoint_lists_loaded_languages() {
  let (_dir, app) = app_with(&[
    (Language::Cpp, python_bundle()),
    (Language::Python, python_bundle()),
  ]);
  let req = Request::builder().uri("/models").body(Body::empty()).unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(body, json!({"supported": ["python", "cpp"]}));
}

#[tokio::test]
async fn health_is_ok() {
  let (_dir, app) = app();
  let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  assert_eq!(&bytes[..], b"ok");
}
