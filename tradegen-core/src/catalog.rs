//! Instrument catalog — the fixed reference list trades are drawn from.
//!
//! The catalog is built once and shared read-only. Instruments are handed out
//! as `Arc`s so every trade points at the same catalog entry.

use crate::domain::Instrument;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("instrument catalog must contain at least one instrument")]
    Empty,

    #[error("instrument '{symbol}' has invalid country code '{code}' (expected two letters)")]
    InvalidCountryCode { symbol: String, code: String },

    #[error("read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk form of a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    instruments: Vec<Instrument>,
}

/// Non-empty, immutable list of instruments.
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Arc<[Arc<Instrument>]>,
}

impl InstrumentCatalog {
    /// Build a catalog. Fails on an empty list or a malformed country code.
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, CatalogError> {
        if instruments.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(bad) = instruments.iter().find(|i| !i.has_valid_country_code()) {
            return Err(CatalogError::InvalidCountryCode {
                symbol: bad.symbol.clone(),
                code: bad.country_code.clone(),
            });
        }
        Ok(Self {
            instruments: instruments.into_iter().map(Arc::new).collect(),
        })
    }

    /// The six instruments of the demo blotter.
    pub fn standard() -> Self {
        let instruments: Vec<Arc<Instrument>> = [
            ("VOD LN", "GB"),
            ("IBM US", "US"),
            ("RIO AU", "AU"),
            ("BER DE", "DE"),
            ("PHIL NL", "NL"),
            ("CURR IN", "IN"),
        ]
        .into_iter()
        .map(|(symbol, code)| Arc::new(Instrument::new(symbol, code)))
        .collect();
        Self {
            instruments: instruments.into(),
        }
    }

    /// Load a catalog from a TOML file with `[[instruments]]` entries.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a catalog from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.instruments)
    }

    /// Serialize the catalog to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let file = CatalogFile {
            instruments: self.instruments.iter().map(|i| (**i).clone()).collect(),
        };
        toml::to_string_pretty(&file)
    }

    /// Uniformly random instrument.
    pub fn pick_random(&self, rng: &mut dyn RandomSource) -> Arc<Instrument> {
        let idx = rng.next_index(self.instruments.len());
        Arc::clone(&self.instruments[idx])
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Instrument>> {
        self.instruments.get(index)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Never true for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Instrument>> {
        self.instruments.iter()
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
