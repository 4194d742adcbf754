//! Engine configuration and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Sampler tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Rating gap at which a question's weight halves.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

/// Rating engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Score expected when student and question ratings are equal.
    #[serde(default = "default_zero_score")]
    pub zero_score: f64,
    /// Rating gap scale of the logistic curve; larger is flatter.
    #[serde(default = "default_span")]
    pub span: f64,
    /// Maximum rating change on a single question.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Decimal digits kept in expected scores.
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            zero_score: default_zero_score(),
            span: default_span(),
            multiplier: default_multiplier(),
            precision: default_precision(),
        }
    }
}

fn default_tolerance() -> f64 {
    300.0
}
fn default_zero_score() -> f64 {
    0.7
}
fn default_span() -> f64 {
    200.0
}
fn default_multiplier() -> f64 {
    50.0
}
fn default_precision() -> u32 {
    6
}

/// Top-level quizrate configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub rating: RatingConfig,
}

pub(crate) const MAX_PRECISION: u32 = 12;

/// Upper bound on `multiplier`; keeps every rounded change well inside `i32`.
pub(crate) const MAX_MULTIPLIER: f64 = 1_000_000.0;

fn positive_finite(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfiguration(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        positive_finite("tolerance", self.tolerance)
    }
}

impl RatingConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.zero_score > 0.0 && self.zero_score < 1.0) {
            return Err(EngineError::InvalidConfiguration(format!(
                "zero_score must lie strictly between 0 and 1, got {}",
                self.zero_score
            )));
        }
        positive_finite("span", self.span)?;
        positive_finite("multiplier", self.multiplier)?;
        if self.multiplier > MAX_MULTIPLIER {
            return Err(EngineError::InvalidConfiguration(format!(
                "multiplier must be at most {MAX_MULTIPLIER}, got {}",
                self.multiplier
            )));
        }
        if self.precision > MAX_PRECISION {
            return Err(EngineError::InvalidConfiguration(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.sampler.validate()?;
        self.rating.validate()
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `quizrate.toml` in the current directory
/// 2. `~/.config/quizrate/config.toml`
///
/// Environment variable overrides: `QUIZRATE_MULTIPLIER`, `QUIZRATE_ZERO_SCORE`.
pub fn load_config_from(path: Option<&Path>) -> Result<EngineConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizrate.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str::<EngineConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Some(value) = env_f64("QUIZRATE_MULTIPLIER")? {
        config.rating.multiplier = value;
    }
    if let Some(value) = env_f64("QUIZRATE_ZERO_SCORE")? {
        config.rating.zero_score = value;
    }

    config.validate()?;
    Ok(config)
}

fn env_f64(name: &str) -> Result<Option<f64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("{name} is not a number: '{raw}'")),
        Err(_) => Ok(None),
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizrate"))
}
