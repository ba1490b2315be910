//! Serializable demo configuration (TOML).
//!
//! ```toml
//! seed = 42
//! initial_rows = 400
//! fill_amplitude = 50.0
//!
//! [[timers]]
//! name = "fill"
//! action = { type = "MUTATE" }
//! cadence = { type = "FIXED", period_ms = 5 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradegen_core::{CatalogError, InstrumentCatalog, DEFAULT_FILL_AMPLITUDE};

use crate::driver::Action;

/// Rows created before the first timer fires.
pub const DEFAULT_INITIAL_ROWS: usize = 400;

/// Period of the default fill ticker.
pub const DEFAULT_MUTATE_PERIOD_MS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("fill_amplitude must be finite and > 0, got {0}")]
    InvalidAmplitude(f64),

    #[error("timer '{0}' is declared more than once")]
    DuplicateTimer(String),

    #[error("timer '{0}': period must be > 0")]
    ZeroPeriod(String),

    #[error("timer '{name}': min_ms {min_ms} exceeds max_ms {max_ms}")]
    InvertedRange { name: String, min_ms: u64, max_ms: u64 },

    #[error("timer '{name}': level {level} outside 0..=100")]
    LevelOutOfRange { name: String, level: u8 },
}

/// How often a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cadence {
    /// Every `period_ms`.
    Fixed { period_ms: u64 },
    /// Period derived from a 0–100 control: `max - (max - min) * level / 100`.
    Variable { min_ms: u64, max_ms: u64, level: u8 },
    /// Once, at `at_ms` after start.
    OneShot { at_ms: u64 },
}

impl Cadence {
    /// Repeat period, or `None` for one-shot timers.
    pub fn period_ms(&self) -> Option<u64> {
        match *self {
            Cadence::Fixed { period_ms } => Some(period_ms),
            Cadence::Variable { min_ms, max_ms, level } => {
                // u128: span * level overflows u64 for spans near u64::MAX.
                let span = u128::from(max_ms.saturating_sub(min_ms));
                let cut = span * u128::from(level.min(100)) / 100;
                Some(max_ms - cut as u64)
            }
            Cadence::OneShot { .. } => None,
        }
    }

    /// Time of the first firing, relative to start.
    pub fn first_due_ms(&self) -> u64 {
        match *self {
            Cadence::OneShot { at_ms } => at_ms,
            _ => self.period_ms().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub name: String,
    pub action: Action,
    pub cadence: Cadence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Master seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_initial_rows")]
    pub initial_rows: usize,

    /// Fill amplitude `K` for mutations.
    #[serde(default = "default_fill_amplitude")]
    pub fill_amplitude: f64,

    /// Optional custom catalog file. Relative paths are resolved against the
    /// config file's directory when loaded with `from_file`.
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    #[serde(default)]
    pub timers: Vec<TimerConfig>,
}

fn default_initial_rows() -> usize {
    DEFAULT_INITIAL_ROWS
}

fn default_fill_amplitude() -> f64 {
    DEFAULT_FILL_AMPLITUDE
}

impl Default for DemoConfig {
    /// The classic blotter: 400 rows and one trade mutated every 5 ms.
    fn default() -> Self {
        Self {
            seed: None,
            initial_rows: DEFAULT_INITIAL_ROWS,
            fill_amplitude: DEFAULT_FILL_AMPLITUDE,
            catalog: None,
            timers: vec![TimerConfig {
                name: "fill".into(),
                action: Action::Mutate,
                cadence: Cadence::Fixed {
                    period_ms: DEFAULT_MUTATE_PERIOD_MS,
                },
            }],
        }
    }
}

impl DemoConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let (Some(catalog), Some(dir)) = (config.catalog.as_mut(), path.parent()) {
            if catalog.is_relative() {
                *catalog = dir.join(&*catalog);
            }
        }
        Ok(config)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fill_amplitude.is_finite() && self.fill_amplitude > 0.0) {
            return Err(ConfigError::InvalidAmplitude(self.fill_amplitude));
        }
        let mut names = HashSet::new();
        for timer in &self.timers {
            if !names.insert(timer.name.as_str()) {
                return Err(ConfigError::DuplicateTimer(timer.name.clone()));
            }
            validate_cadence(&timer.name, &timer.cadence)?;
        }
        Ok(())
    }

    /// The configured catalog, or the standard six instruments.
    pub fn load_catalog(&self) -> Result<InstrumentCatalog, ConfigError> {
        match &self.catalog {
            Some(path) => Ok(InstrumentCatalog::from_file(path)?),
            None => Ok(InstrumentCatalog::standard()),
        }
    }
}

pub(crate) fn validate_cadence(name: &str, cadence: &Cadence) -> Result<(), ConfigError> {
    if let Cadence::Variable { min_ms, max_ms, level } = *cadence {
        if min_ms > max_ms {
            return Err(ConfigError::InvertedRange {
                name: name.to_string(),
                min_ms,
                max_ms,
            });
        }
        if level > 100 {
            return Err(ConfigError::LevelOutOfRange {
                name: name.to_string(),
                level,
            });
        }
    }
    if cadence.period_ms() == Some(0) {
        return Err(ConfigError::ZeroPeriod(name.to_string()));
    }
    Ok(())
}
