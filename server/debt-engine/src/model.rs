//! Fitted linear predictors evaluated on a single sparse feature row.

use serde::Deserialize;

use crate::error::EngineError;
use crate::vectorizer::SparseRow;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Model {
  /// Regressor: prediction is the decision value itself.
  Linear {
    coef: Vec<f64>,
    #[serde(default)]
    intercept: f64,
  },
  /// Binary classifier: prediction is `classes[1]` when the decision value is
  /// positive, `classes[0]` otherwise.
  Logistic {
    coef: Vec<f64>,
    #[serde(default)]
    intercept: f64,
    classes: [f64; 2],
  },
}

impl Model {
  pub fn n_features(&self) -> usize {
    match self {
      Self::Linear { coef, .. } | Self::Logistic { coef, .. } => coef.len(),
    }
  }

  pub fn predict(&self, row: &SparseRow) -> Result<f64, EngineError> {
    let prediction = match self {
      Self::Linear { coef, intercept } => decision(coef, *intercept, row)?,
      Self::Logistic {
        coef,
        intercept,
        classes,
      } => {
        let d = decision(coef, *intercept, row)?;
        if d.is_nan() {
          return Err(EngineError::NonFinite);
        }
        if d > 0.0 {
          classes[1]
        } else {
          classes[0]
        }
      }
    };

    if !prediction.is_finite() {
      return Err(EngineError::NonFinite);
    }
    Ok(prediction)
  }
}

fn decision(coef: &[f64], intercept: f64, row: &SparseRow) -> Result<f64, EngineError> {
  let mut sum = intercept;
  for &(index, value) in row {
    let w = coef.get(index).ok_or(EngineError::Dimension {
      index,
      len: coef.len(),
    })?;
    sum += w * value;
  }
  Ok(sum)
}
