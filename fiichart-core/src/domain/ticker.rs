//! Ticker: opaque instrument identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange-qualified symbol (e.g. `HGLG11.SA`).
///
/// The string is never interpreted: it is a lookup key, a chart label and,
/// through [`Ticker::file_stem`], a file-name fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Wrap a symbol. An empty symbol is accepted here but can never be
    /// fetched: providers reject it with `SymbolNotFound` before any request.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-name-safe form of the symbol.
    ///
    /// Characters outside `[A-Za-z0-9._-]` become `_`. A result that is empty
    /// or made only of dots (`.`, `..`) becomes `_` so it can never name a
    /// parent or current directory.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if stem.chars().all(|c| c == '.') {
            "_".to_string()
        } else {
            stem
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
