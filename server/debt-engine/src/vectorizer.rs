//! Fitted text vectorizer: token counts over a fixed vocabulary with optional
//! idf weighting and row normalisation.

use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;

use crate::error::EngineError;

/// One document as sorted `(column, weight)` pairs; absent columns are zero.
pub type SparseRow = Vec<(usize, f64)>;

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
  L1,
  L2,
}

/// Serialized form inside a model bundle.
#[derive(Debug, Deserialize)]
pub struct VectorizerSpec {
  vocabulary: HashMap<String, usize>,
  #[serde(default)]
  idf: Option<Vec<f64>>,
  #[serde(default = "default_true")]
  lowercase: bool,
  #[serde(default = "default_token_pattern")]
  token_pattern: String,
  #[serde(default = "default_ngram_range")]
  ngram_range: (usize, usize),
  #[serde(default)]
  binary: bool,
  #[serde(default)]
  sublinear_tf: bool,
  #[serde(default = "default_norm")]
  norm: Option<Norm>,
}

fn default_true() -> bool {
  true
}

fn default_token_pattern() -> String {
  DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
  (1, 1)
}

fn default_norm() -> Option<Norm> {
  Some(Norm::L2)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "VectorizerSpec")]
pub struct Vectorizer {
  vocabulary: HashMap<String, usize>,
  idf: Option<Vec<f64>>,
  lowercase: bool,
  pattern: Regex,
  ngram_range: (usize, usize),
  binary: bool,
  sublinear_tf: bool,
  norm: Option<Norm>,
}

impl TryFrom<VectorizerSpec> for Vectorizer {
  type Error = EngineError;

  fn try_from(spec: VectorizerSpec) -> Result<Self, Self::Error> {
    let n_features = spec.vocabulary.len();
    if n_features == 0 {
      return Err(EngineError::artifact("vectorizer vocabulary is empty"));
    }
    if let Some((term, col)) = spec.vocabulary.iter().find(|(_, col)| **col >= n_features) {
      return Err(EngineError::artifact(format!(
        "vocabulary term {:?} maps to column {} but there are {} features",
        term, col, n_features
      )));
    }
    if let Some(idf) = &spec.idf {
      if idf.len() != n_features {
        return Err(EngineError::artifact(format!(
          "idf has {} weights for {} features",
          idf.len(),
          n_features
        )));
      }
    }
    let (lo, hi) = spec.ngram_range;
    if lo == 0 || lo > hi {
      return Err(EngineError::artifact(format!("invalid ngram_range ({}, {})", lo, hi)));
    }

    let pattern = Regex::new(&spec.token_pattern)
      .map_err(|e| EngineError::artifact(format!("token_pattern: {}", e)))?;
    // Whole match, or the single capture group when there is one.
    if pattern.captures_len() > 2 {
      return Err(EngineError::artifact("token_pattern has more than one capture group"));
    }

    Ok(Self {
      vocabulary: spec.vocabulary,
      idf: spec.idf,
      lowercase: spec.lowercase,
      pattern,
      ngram_range: spec.ngram_range,
      binary: spec.binary,
      sublinear_tf: spec.sublinear_tf,
      norm: spec.norm,
    })
  }
}

impl Vectorizer {
  pub fn n_features(&self) -> usize {
    self.vocabulary.len()
  }

  /// Transform a single document into one feature row.
  pub fn transform(&self, text: &str) -> SparseRow {
    let doc = if self.lowercase {
      text.to_lowercase()
    } else {
      text.to_string()
    };
    let tokens = self.tokenize(&doc);

    let mut counts: HashMap<usize, f64> = HashMap::new();
    let (lo, hi) = self.ngram_range;
    for n in lo..=hi.min(tokens.len()) {
      for gram in tokens.windows(n) {
        let term = gram.join(" ");
        if let Some(&col) = self.vocabulary.get(&term) {
          *counts.entry(col).or_insert(0.0) += 1.0;
        }
      }
    }

    let mut row: SparseRow = counts.into_iter().collect();
    row.sort_unstable_by_key(|(col, _)| *col);

    for (col, value) in row.iter_mut() {
      if self.binary {
        *value = 1.0;
      } else if self.sublinear_tf {
        *value = 1.0 + value.ln();
      }
      if let Some(idf) = &self.idf {
        *value *= idf[*col];
      }
    }

    self.normalize(&mut row);
    row
  }

  fn tokenize<'a>(&self, doc: &'a str) -> Vec<&'a str> {
    if self.pattern.captures_len() == 2 {
      self
        .pattern
        .captures_iter(doc)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
    } else {
      self.pattern.find_iter(doc).map(|m| m.as_str()).collect()
    }
  }

  fn normalize(&self, row: &mut SparseRow) {
    let total = match self.norm {
      Some(Norm::L2) => row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
      Some(Norm::L1) => row.iter().map(|(_, v)| v.abs()).sum::<f64>(),
      None => return,
    };
    if total > 0.0 {
      for (_, value) in row.iter_mut() {
        *value /= total;
      }
    }
  }
}
