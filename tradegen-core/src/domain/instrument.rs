use serde::{Deserialize, Serialize};

/// A tradable reference entity: display symbol plus two-letter country code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Instrument {
    pub symbol: String,
    pub country_code: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            country_code: country_code.into(),
        }
    }

    /// Path of the flag image for this instrument's country.
    ///
    /// Any two-letter code yields a path, whether or not the asset exists.
    pub fn flag_asset(&self) -> String {
        format!("img/flags/{}.png", self.country_code.to_ascii_lowercase())
    }

    /// True when the country code is exactly two ASCII letters.
    pub fn has_valid_country_code(&self) -> bool {
        self.country_code.len() == 2 && self.country_code.bytes().all(|b| b.is_ascii_alphabetic())
    }
}
