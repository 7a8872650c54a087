//! Service configuration with sane defaults, overridable from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::EngineError;

const MIN_CHART_WIDTH: u32 = 160;
const MIN_CHART_HEIGHT: u32 = 120;

#[derive(Debug, Clone)]
pub struct Config {
  pub host: IpAddr,
  pub port: u16,
  /// Directory holding `<language>_tech_debt.json` bundles.
  pub models_dir: PathBuf,
  /// TTF/OTF font for chart text. Without one the built-in bitmap glyphs are used.
  pub chart_font: Option<PathBuf>,
  pub chart_width: u32,
  pub chart_height: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
      port: 5001,
      models_dir: PathBuf::from("models"),
      chart_font: None,
      chart_width: 640,
      chart_height: 480,
    }
  }
}

impl Config {
  /// Read `HOST`, `PORT`, `MODELS_DIR`, `CHART_FONT`, `CHART_WIDTH`, `CHART_HEIGHT`.
  pub fn from_env() -> Result<Self, EngineError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, EngineError> {
    let defaults = Self::default();
    let chart_width = parse_or("CHART_WIDTH", get("CHART_WIDTH"), defaults.chart_width)?;
    let chart_height = parse_or("CHART_HEIGHT", get("CHART_HEIGHT"), defaults.chart_height)?;
    if chart_width < MIN_CHART_WIDTH {
      return Err(EngineError::config(
        "CHART_WIDTH",
        format!("{} is below the minimum of {}", chart_width, MIN_CHART_WIDTH),
      ));
    }
    if chart_height < MIN_CHART_HEIGHT {
      return Err(EngineError::config(
        "CHART_HEIGHT",
        format!("{} is below the minimum of {}", chart_height, MIN_CHART_HEIGHT),
      ));
    }

    Ok(Self {
      host: parse_or("HOST", get("HOST"), defaults.host)?,
      port: parse_or("PORT", get("PORT"), defaults.port)?,
      models_dir: get("MODELS_DIR")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or(defaults.models_dir),
      chart_font: get("CHART_FONT").filter(|s| !s.is_empty()).map(PathBuf::from),
      chart_width,
      chart_height,
    })
  }

  pub fn addr(&self) -> SocketAddr {
    SocketAddr::new(self.host, self.port)
  }
}

fn parse_or<T>(field: &str, raw: Option<String>, default: T) -> Result<T, EngineError>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(s) if !s.trim().is_empty() => s
      .trim()
      .parse()
      .map_err(|e: T::Err| EngineError::config(field, format!("{:?}: {}", s, e))),
    _ => Ok(default),
  }
}
