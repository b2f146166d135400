// src/config.rs

use serde::{Deserialize, Serialize};
use std::{fs, ops::RangeInclusive, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

use crate::load::{DataSource, FetchOptions, DEFAULT_SOURCE_URL};
use crate::period::{Period, Quarter};
use crate::region::Region;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Dashboard settings, read from YAML. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// URL or local path of the population CSV.
    pub source: String,
    /// Selectable years, inclusive.
    pub min_year: u16,
    pub max_year: u16,
    pub default_start: Period,
    pub default_end: Period,
    pub default_target: Region,
    pub fetch_retries: u32,
    pub fetch_backoff_ms: u64,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_URL.to_string(),
            min_year: 1991,
            max_year: 2023,
            default_start: Period::new(Quarter::Q3, 1991),
            default_end: Period::new(Quarter::Q1, 2023),
            default_target: Region::Canada,
            fetch_retries: 3,
            fetch_backoff_ms: 500,
            chart_width: 800,
            chart_height: 480,
        }
    }
}

impl DashboardConfig {
    /// Read `path`, apply environment overrides, then check the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let cfg: Self = serde_yaml::from_str(&text)?;
        debug!(path = %path.display(), "config loaded");
        cfg.with_env().validated()
    }

    /// `POPDASH_SOURCE` and `POPDASH_FETCH_RETRIES` take precedence.
    pub fn with_env(mut self) -> Self {
        if let Some(source) = std::env::var("POPDASH_SOURCE").ok().filter(|s| !s.is_empty()) {
            self.source = source;
        }
        if let Ok(raw) = std::env::var("POPDASH_FETCH_RETRIES") {
            match raw.parse() {
                Ok(n) => self.fetch_retries = n,
                Err(_) => warn!(value = %raw, "ignoring unparsable POPDASH_FETCH_RETRIES"),
            }
        }
        self
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.min_year > self.max_year {
            return Err(ConfigError::Invalid(format!(
                "min_year {} is after max_year {}",
                self.min_year, self.max_year
            )));
        }
        if self.default_start.is_after(&self.default_end) {
            return Err(ConfigError::Invalid(format!(
                "default_start {} is after default_end {}",
                self.default_start, self.default_end
            )));
        }
        let years = self.years();
        for (name, period) in [("default_start", self.default_start), ("default_end", self.default_end)] {
            if !years.contains(&period.year()) {
                return Err(ConfigError::Invalid(format!(
                    "{} {} is outside years {}..={}",
                    name,
                    period,
                    self.min_year,
                    self.max_year
                )));
            }
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigError::Invalid("chart size must be non-zero".into()));
        }
        Ok(self)
    }

    pub fn years(&self) -> RangeInclusive<u16> {
        self.min_year..=self.max_year
    }

    pub fn data_source(&self) -> DataSource {
        match self.source.parse() {
            Ok(source) => source,
            Err(never) => match never {},
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            retries: self.fetch_retries,
            backoff_ms: self.fetch_backoff_ms,
        }
    }

    pub fn chart_size(&self) -> (u32, u32) {
        (self.chart_width, self.chart_height)
    }
}
