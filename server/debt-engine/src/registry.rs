//! Per-language model registry, populated once at startup and read-only after.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::EngineError;
use crate::model::Model;
use crate::types::Language;
use crate::vectorizer::Vectorizer;

/// A fitted vectorizer and the predictor trained on its output.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
  pub vectorizer: Vectorizer,
  pub model: Model,
}

impl ModelEntry {
  pub fn from_json(raw: &str) -> Result<Self, EngineError> {
    let entry: ModelEntry = serde_json::from_str(raw)?;
    let (features, weights) = (entry.vectorizer.n_features(), entry.model.n_features());
    if features != weights {
      return Err(EngineError::artifact(format!(
        "vectorizer has {} features but model has {} coefficients",
        features, weights
      )));
    }
    Ok(entry)
  }

  pub fn from_file(path: &Path) -> Result<Self, EngineError> {
    let raw = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&raw)
  }

  /// Vectorize one document and return the unrounded prediction.
  pub fn predict(&self, text: &str) -> Result<f64, EngineError> {
    let row = self.vectorizer.transform(text);
    self.model.predict(&row)
  }
}

#[derive(Debug, Default)]
pub struct ModelRegistry {
  entries: HashMap<Language, ModelEntry>,
}

impl ModelRegistry {
  pub fn empty() -> Self {
    Self::default()
  }

  /// `<dir>/<language>_tech_debt.json`
  pub fn artifact_path(dir: &Path, language: Language) -> PathBuf {
    dir.join(format!("{}_tech_debt.json", language.as_str()))
  }

  /// Best-effort load of every supported language. A missing or invalid bundle
  /// leaves that language unsupported; nothing is retried later.
  pub fn load(dir: &Path) -> Self {
    let mut registry = Self::empty();
    for language in Language::SUPPORTED {
      let path = Self::artifact_path(dir, language);
      if !path.exists() {
        warn!(%language, path = %path.display(), "model not found");
        continue;
      }
      match ModelEntry::from_file(&path) {
        Ok(entry) => {
          info!(
            %language,
            features = entry.vectorizer.n_features(),
            "loaded model"
          );
          registry.entries.insert(language, entry);
        }
        Err(e) => error!(%language, path = %path.display(), error = %e, "invalid model bundle"),
      }
    }
    registry
  }

  /// Register an entry directly. `Language::Unknown` is never registered.
  pub fn with_entry(mut self, language: Language, entry: ModelEntry) -> Self {
    if language != Language::Unknown {
      self.entries.insert(language, entry);
    }
    self
  }

  pub fn lookup(&self, language: Language) -> Option<&ModelEntry> {
    self.entries.get(&language)
  }

  /// Languages with a loaded model, in registry order.
  pub fn supported(&self) -> Vec<Language> {
    Language::SUPPORTED
      .into_iter()
      .filter(|l| self.entries.contains_key(l))
      .collect()
  }
}
