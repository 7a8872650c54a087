//! Textual quality metrics: LOC, approximate maintainability index, bug density
//! and comment density. Line-prefix heuristics only, no parsing.

use std::cmp::Ordering;

use crate::types::Metrics;

/// Prefixes that mark a line as a comment once leading whitespace is trimmed.
const COMMENT_PREFIXES: [&str; 5] = ["#", "//", "/*", "*", "--"];

/// Compute all metrics for one file.
///
/// Lines follow `str::lines`: a trailing newline does not add an empty line and
/// empty text has zero lines. LOC and comment counting share that line set.
pub fn compute(text: &str) -> Metrics {
  let mut loc = 0usize;
  let mut comment_lines = 0usize;
  for line in text.lines() {
    loc += 1;
    if is_comment_line(line) {
      comment_lines += 1;
    }
  }

  let denom = loc.max(1) as f64;
  let avg_chars_per_line = text.chars().count() as f64 / denom;

  Metrics {
    lines_of_code: loc,
    maintainability_index: maintainability_index(loc, avg_chars_per_line),
    // Degenerate: 0.05 for any loc >= 1.
    bug_density: round_to(0.05 * loc as f64 / denom, 3),
    comment_density: round_to(comment_lines as f64 / denom, 3),
  }
}

/// `171 - 5.2 ln(1 + loc) - 0.23 * avg_chars_per_line * 100`, clamped to [0, 100].
fn maintainability_index(loc: usize, avg_chars_per_line: f64) -> f64 {
  let raw = 171.0 - 5.2 * (1.0 + loc as f64).ln() - 0.23 * avg_chars_per_line * 100.0;
  raw.clamp(0.0, 100.0)
}

fn is_comment_line(line: &str) -> bool {
  let trimmed = line.trim_start();
  COMMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

/// Round to `places` decimals (at most 15) using the exact binary value of
/// `value`, with ties going to the even neighbour. So `0.125` becomes `0.12`,
/// and `2.675` (stored just below the tie) becomes `2.67`.
pub(crate) fn round_to(value: f64, places: u32) -> f64 {
  if !value.is_finite() || value == 0.0 {
    return value;
  }
  let places = places.min(15);
  let (mantissa, exponent) = decompose(value.abs());
  // Integers carry no fractional digits.
  if exponent >= 0 {
    return value;
  }
  let shift = exponent.unsigned_abs();
  let scale = 10u128.pow(places);
  // |value| * 10^places == numerator / 2^shift, exactly.
  let numerator = mantissa as u128 * scale;
  // numerator < 2^103, so anything shifted further rounds to zero.
  if shift > 104 {
    return 0.0f64.copysign(value);
  }
  let denominator = 1u128 << shift;
  let (quotient, remainder) = (numerator / denominator, numerator % denominator);
  let rounded = match (remainder * 2).cmp(&denominator) {
    Ordering::Less => quotient,
    Ordering::Greater => quotient + 1,
    Ordering::Equal if quotient % 2 == 0 => quotient,
    Ordering::Equal => quotient + 1,
  };
  (rounded as f64 / scale as f64).copysign(value)
}

/// Split a positive finite `f64` into `mantissa * 2^exponent`.
fn decompose(value: f64) -> (u64, i32) {
  let bits = value.to_bits();
  let exp_bits = ((bits >> 52) & 0x7ff) as i32;
  let fraction = bits & ((1u64 << 52) - 1);
  if exp_bits == 0 {
    (fraction, -1074)
  } else {
    (fraction | (1u64 << 52), exp_bits - 1075)
  }
}
