//! Request/response types for the debt engine (JSON contract with clients).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NO_MODEL_MESSAGE: &str = "No model found for this language";
pub const NO_FILES_MESSAGE: &str = "No files received";

// ---------------------------------------------------------------------------
// Language + risk tier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  Python,
  Javascript,
  Java,
  Cpp,
  Unknown,
}

impl Language {
  /// Languages that may have a model bundle, in registry order.
  pub const SUPPORTED: [Language; 4] = [Self::Python, Self::Javascript, Self::Java, Self::Cpp];

  /// Resolve purely from the filename suffix (case-sensitive).
  pub fn from_filename(name: &str) -> Self {
    if name.ends_with(".py") {
      Self::Python
    } else if name.ends_with(".js") {
      Self::Javascript
    } else if name.ends_with(".java") {
      Self::Java
    } else if name.ends_with(".cpp") || name.ends_with(".c") {
      Self::Cpp
    } else {
      Self::Unknown
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Python => "python",
      Self::Javascript => "javascript",
      Self::Java => "java",
      Self::Cpp => "cpp",
      Self::Unknown => "unknown",
    }
  }
}

impl std::fmt::Display for Language {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Risk {
  High,
  Medium,
  Low,
}

impl Risk {
  /// Strict thresholds: exactly 0.7 is Medium, exactly 0.4 is Low.
  pub fn from_prediction(prediction: f64) -> Self {
    if prediction > 0.7 {
      Self::High
    } else if prediction > 0.4 {
      Self::Medium
    } else {
      Self::Low
    }
  }
}

// ---------------------------------------------------------------------------
// Per-file result
// ---------------------------------------------------------------------------

/// Heuristic quality metrics; field names are the JSON keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
  pub lines_of_code: usize,
  pub maintainability_index: f64,
  pub bug_density: f64,
  pub comment_density: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileScore {
  pub technical_debt_score: f64,
  pub risk: Risk,
  pub language: Language,
  #[serde(flatten)]
  pub metrics: Metrics,
  /// Base64-encoded PNG.
  pub metrics_graph: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScoringResult {
  Scored(FileScore),
  Unsupported {
    technical_debt_score: &'static str,
    message: &'static str,
  },
}

impl ScoringResult {
  pub fn unsupported() -> Self {
    Self::Unsupported {
      technical_debt_score: "N/A",
      message: NO_MODEL_MESSAGE,
    }
  }
}

// ---------------------------------------------------------------------------
// HTTP payloads
// ---------------------------------------------------------------------------

/// `repo` and `commit` are opaque and echoed verbatim. `files` stays raw so an
/// empty/absent value can be told apart from a malformed one.
#[derive(Debug, Default)]
pub struct PredictRequest {
  pub repo: Value,
  pub commit: Value,
  pub files: Value,
}

impl PredictRequest {
  /// Only a JSON object is a request. Missing keys read as `null`, other keys
  /// are ignored.
  pub fn from_body(body: Value) -> Option<Self> {
    let Value::Object(mut map) = body else {
      return None;
    };
    Some(Self {
      repo: map.remove("repo").unwrap_or_default(),
      commit: map.remove("commit").unwrap_or_default(),
      files: map.remove("files").unwrap_or_default(),
    })
  }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
  pub repository: Value,
  pub commit: Value,
  pub analysis: IndexMap<String, ScoringResult>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
  pub supported: Vec<Language>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub error: String,
}
