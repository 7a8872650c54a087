//! Line chart of the four quality metrics, rendered to PNG and base64-encoded.
//!
//! All four values share one y-axis, so LOC usually dwarfs the densities.

use std::io::Cursor;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, text_size};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::EngineError;
use crate::types::Metrics;

pub const TITLE: &str = "Code Quality Metrics";
pub const LABELS: [&str; 4] = ["LOC", "Maintainability", "Bug Density", "Comment Density"];

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const LINE: Rgb<u8> = Rgb([31, 119, 180]);

const MARGIN_LEFT: u32 = 70;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_TOP: u32 = 50;
const MARGIN_BOTTOM: u32 = 60;
const GRID_STEPS: u32 = 4;
const MARKER_RADIUS: i32 = 4;

const TITLE_TOP: i32 = 15;
const TITLE_SIZE: f32 = 20.0;
const LABEL_SIZE: f32 = 14.0;
const TICK_SIZE: f32 = 12.0;
/// Built-in glyphs are 8x8 pixels before scaling.
const GLYPH_CELL: u32 = 8;

pub struct ChartRenderer {
  width: u32,
  height: u32,
  font: Option<FontVec>,
}

impl ChartRenderer {
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      width,
      height,
      font: None,
    }
  }

  pub fn with_font(mut self, font: FontVec) -> Self {
    self.font = Some(font);
    self
  }

  /// Size from config. Text uses the configured font when it loads, otherwise
  /// the built-in 8x8 bitmap glyphs.
  pub fn from_config(config: &Config) -> Self {
    let renderer = Self::new(config.chart_width, config.chart_height);
    match &config.chart_font {
      Some(path) => match load_font(path) {
        Ok(font) => {
          info!(path = %path.display(), "chart font loaded");
          renderer.with_font(font)
        }
        Err(e) => {
          warn!(error = %e, "chart font unavailable; using built-in glyphs");
          renderer
        }
      },
      None => renderer,
    }
  }

  /// True when an outline font was loaded (as opposed to the bitmap fallback).
  pub fn has_font(&self) -> bool {
    self.font.is_some()
  }

  /// Render the metrics chart as base64 PNG text.
  pub fn render(&self, metrics: &Metrics) -> Result<String, EngineError> {
    let values = [
      metrics.lines_of_code as f64,
      metrics.maintainability_index,
      metrics.bug_density,
      metrics.comment_density,
    ];
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
      return Err(EngineError::Chart(format!("cannot plot non-finite value {}", v)));
    }

    let img = self.draw(values);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(STANDARD.encode(buf.into_inner()))
  }

  fn draw(&self, values: [f64; 4]) -> RgbImage {
    let mut img = RgbImage::from_pixel(self.width, self.height, WHITE);
    let frame = Frame::new(self.width, self.height, &values);

    for step in 0..=GRID_STEPS {
      let v = frame.lo + (frame.hi - frame.lo) * step as f64 / GRID_STEPS as f64;
      let y = frame.y(v);
      draw_line_segment_mut(&mut img, (frame.left, y), (frame.right, y), GRID);
      let label = tick_label(v);
      let (w, h) = self.text_size(TICK_SIZE, &label);
      let x = frame.left as i32 - w - 6;
      self.draw_text(&mut img, x, y as i32 - h / 2, TICK_SIZE, &label);
    }

    // Axes.
    draw_line_segment_mut(&mut img, (frame.left, frame.top), (frame.left, frame.bottom), BLACK);
    draw_line_segment_mut(&mut img, (frame.left, frame.bottom), (frame.right, frame.bottom), BLACK);

    let points: Vec<(f32, f32)> = values
      .iter()
      .enumerate()
      .map(|(i, &v)| (frame.x(i), frame.y(v)))
      .collect();
    for pair in points.windows(2) {
      let (a, b) = (pair[0], pair[1]);
      draw_line_segment_mut(&mut img, a, b, LINE);
      draw_line_segment_mut(&mut img, (a.0, a.1 + 1.0), (b.0, b.1 + 1.0), LINE);
    }
    for &(x, y) in &points {
      draw_filled_circle_mut(&mut img, (x.round() as i32, y.round() as i32), MARKER_RADIUS, LINE);
    }

    for (i, label) in LABELS.iter().enumerate() {
      let (w, _) = self.text_size(LABEL_SIZE, label);
      let x = frame.x(i) as i32 - w / 2;
      self.draw_text(&mut img, x, frame.bottom as i32 + 10, LABEL_SIZE, label);
    }

    let (w, _) = self.text_size(TITLE_SIZE, TITLE);
    let x = (self.width as i32 - w) / 2;
    self.draw_text(&mut img, x, TITLE_TOP, TITLE_SIZE, TITLE);

    img
  }

  /// Rendered `(width, height)` of `text` at `size` pixels.
  fn text_size(&self, size: f32, text: &str) -> (i32, i32) {
    match &self.font {
      Some(font) => {
        let (w, h) = text_size(PxScale::from(size), font, text);
        (w as i32, h as i32)
      }
      None => {
        let cell = (GLYPH_CELL * bitmap_scale(size)) as i32;
        (cell * text.chars().count() as i32, cell)
      }
    }
  }

  fn draw_text(&self, img: &mut RgbImage, x: i32, y: i32, size: f32, text: &str) {
    match &self.font {
      Some(font) => draw_text_mut(img, BLACK, x, y, PxScale::from(size), font, text),
      None => draw_bitmap_text(img, x, y, bitmap_scale(size), text),
    }
  }
}

/// Plot area in pixels plus the value range mapped onto it.
struct Frame {
  left: f32,
  right: f32,
  top: f32,
  bottom: f32,
  lo: f64,
  hi: f64,
}

impl Frame {
  fn new(width: u32, height: u32, values: &[f64]) -> Self {
    let mut lo = values.iter().copied().fold(0.0, f64::min);
    let mut hi = values.iter().copied().fold(0.0, f64::max);
    if hi - lo < f64::EPSILON {
      hi = lo + 1.0;
    }
    let pad = (hi - lo) * 0.05;
    lo -= pad;
    hi += pad;

    Self {
      left: MARGIN_LEFT as f32,
      right: width.saturating_sub(MARGIN_RIGHT) as f32,
      top: MARGIN_TOP as f32,
      bottom: height.saturating_sub(MARGIN_BOTTOM) as f32,
      lo,
      hi,
    }
  }

  /// Category centre for the i-th label.
  fn x(&self, i: usize) -> f32 {
    let slot = (self.right - self.left) / LABELS.len() as f32;
    self.left + slot * (i as f32 + 0.5)
  }

  fn y(&self, v: f64) -> f32 {
    let frac = (self.hi - v) / (self.hi - self.lo);
    self.top + (self.bottom - self.top) * frac as f32
  }
}

fn tick_label(v: f64) -> String {
  let a = v.abs();
  if a >= 100.0 {
    format!("{:.0}", v)
  } else if a >= 1.0 {
    format!("{:.1}", v)
  } else {
    format!("{:.2}", v)
  }
}

/// Integer upscale for bitmap glyphs: 12-14px text is 1x, a 20px title is 2x.
fn bitmap_scale(size: f32) -> u32 {
  ((size / 10.0).round() as u32).max(1)
}

/// Draw `text` with the built-in 8x8 glyphs, each bit a `scale`-sized block.
/// Characters without a glyph leave a blank cell. Clipped to the image.
fn draw_bitmap_text(img: &mut RgbImage, x: i32, y: i32, scale: u32, text: &str) {
  let (width, height) = (img.width() as i32, img.height() as i32);
  let cell = GLYPH_CELL * scale;
  for (i, c) in text.chars().enumerate() {
    let glyph = BASIC_FONTS.get(c).unwrap_or([0; 8]);
    let left = x + (i as u32 * cell) as i32;
    for (row, bits) in glyph.iter().enumerate() {
      for col in 0..GLYPH_CELL {
        // Bit 0 is the leftmost pixel.
        if bits & (1u8 << col) == 0 {
          continue;
        }
        for dy in 0..scale {
          for dx in 0..scale {
            let px = left + (col * scale + dx) as i32;
            let py = y + (row as u32 * scale + dy) as i32;
            if (0..width).contains(&px) && (0..height).contains(&py) {
              img.put_pixel(px as u32, py as u32, BLACK);
            }
          }
        }
      }
    }
  }
}

fn load_font(path: &Path) -> Result<FontVec, EngineError> {
  let bytes = std::fs::read(path).map_err(|source| EngineError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  FontVec::try_from_vec(bytes)
    .map_err(|e| EngineError::Chart(format!("{}: {}", path.display(), e)))
}
