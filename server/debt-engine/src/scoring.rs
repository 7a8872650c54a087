//! Per-file scoring: model lookup, inference, risk bucketing, metrics and chart.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::chart::ChartRenderer;
use crate::error::EngineError;
use crate::metrics::{self, round_to};
use crate::registry::ModelRegistry;
use crate::types::{FileScore, Language, Risk, ScoringResult};

/// Score one file. A language without a model yields the `N/A` stub, not an error.
pub fn score(
  registry: &ModelRegistry,
  chart: &ChartRenderer,
  language: Language,
  text: &str,
) -> Result<ScoringResult, EngineError> {
  let entry = match registry.lookup(language) {
    Some(e) => e,
    None => return Ok(ScoringResult::unsupported()),
  };

  let prediction = entry.predict(text)?;
  // Bucket on the raw value; rounding is for display only.
  let risk = Risk::from_prediction(prediction);
  let metrics = metrics::compute(text);
  let metrics_graph = chart.render(&metrics)?;

  Ok(ScoringResult::Scored(FileScore {
    technical_debt_score: round_to(prediction, 2),
    risk,
    language,
    metrics,
    metrics_graph,
  }))
}

/// Score every submitted file in order. The first failure aborts the batch.
///
/// Content is only read for languages with a loaded model, so a non-string
/// value under an unscored filename still gets the stub.
pub fn score_files(
  registry: &ModelRegistry,
  chart: &ChartRenderer,
  files: &Map<String, Value>,
) -> Result<IndexMap<String, ScoringResult>, EngineError> {
  let mut analysis = IndexMap::with_capacity(files.len());
  for (filename, content) in files {
    let language = Language::from_filename(filename);
    let result = match content.as_str() {
      Some(text) => {
        debug!(%filename, %language, bytes = text.len(), "scoring file");
        score(registry, chart, language, text)?
      }
      None if registry.lookup(language).is_none() => ScoringResult::unsupported(),
      None => return Err(EngineError::Content(filename.clone())),
    };
    analysis.insert(filename.clone(), result);
  }
  Ok(analysis)
}
