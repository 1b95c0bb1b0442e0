//! Router configuration.
//!
//! Usually built in code, but it can also live in a TOML file next to the
//! rest of the service's settings:
//!
//! ```toml
//! enable_cache = true
//! cache_size = 4096
//! optimize_priorities = false
//! ambiguity_window = 10
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

fn default_cache_size() -> usize {
    1000
}

fn default_ambiguity_window() -> i64 {
    10
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Cache lookup results, misses included.
    pub enable_cache: bool,
    /// Maximum cached lookups. `0` disables the cache.
    pub cache_size: usize,
    /// List routes most-specific-first in introspection output instead of
    /// in registration order.
    pub optimize_priorities: bool,
    /// Overlapping routes whose priorities differ by less than this are
    /// reported as ambiguous rather than merely overlapping.
    pub ambiguity_window: i64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_size: default_cache_size(),
            optimize_priorities: false,
            ambiguity_window: default_ambiguity_window(),
        }
    }
}

impl RouterConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.enable_cache = false;
        self
    }

    pub fn with_priority_optimization(mut self) -> Self {
        self.optimize_priorities = true;
        self
    }

    pub fn with_ambiguity_window(mut self, window: i64) -> Self {
        self.ambiguity_window = window;
        self
    }

    pub fn cache_enabled(&self) -> bool {
        self.enable_cache && self.cache_size > 0
    }
}
