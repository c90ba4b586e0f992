use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Canonical header phrasings shipped by the supported logger firmware
/// variants.
static DEFAULT_EXPECTED_HEADERS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "Datum/Uhrzeit",
        "Temperatur[°C]",
        "rel.Luftfeuchte[%rF]",
        "Lufttemperatur[°C]",
        "%Feuchtigkeit[%rF]",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

/// Pseudo-header restatements (spaced unit brackets) that must never be
/// mistaken for the real header row.
static DEFAULT_NOISE_TOKENS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "Temperatur [°C]",
        "rel.Luftfeuchte [%rF]",
        "Lufttemperatur [°C]",
        "%Feuchtigkeit [%rF]",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

static DEFAULT_TEMPERATURE_VARIANTS: Lazy<Vec<String>> =
    Lazy::new(|| vec!["Temperatur".to_string(), "Lufttemperatur".to_string()]);

static DEFAULT_HUMIDITY_VARIANTS: Lazy<Vec<String>> =
    Lazy::new(|| vec!["Feuchtigkeit".to_string(), "Luftfeuchte".to_string()]);

static DEFAULT_TIMESTAMP_VARIANTS: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        "Datum".to_string(),
        "Uhrzeit".to_string(),
        "Zeit".to_string(),
    ]
});

pub const DEFAULT_MATCH_THRESHOLD: u8 = 80;

/// Header-row detection tuning. The threshold is configuration rather than a
/// hard-coded constant since real-world header drift may require tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub expected_headers: Vec<String>,
    pub noise_tokens: Vec<String>,
    pub match_threshold: u8,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            expected_headers: DEFAULT_EXPECTED_HEADERS.clone(),
            noise_tokens: DEFAULT_NOISE_TOKENS.clone(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl HeaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.expected_headers.is_empty() {
            return Err(PipelineError::Config(
                "expected_headers must not be empty".to_string(),
            ));
        }
        if self.match_threshold > 100 {
            return Err(PipelineError::Config(format!(
                "match_threshold must be within 0..=100, got {}",
                self.match_threshold
            )));
        }
        Ok(())
    }
}

/// Column-name substrings recognized for each chart role.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    pub temperature: Vec<String>,
    pub humidity: Vec<String>,
    pub timestamp: Vec<String>,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE_VARIANTS.clone(),
            humidity: DEFAULT_HUMIDITY_VARIANTS.clone(),
            timestamp: DEFAULT_TIMESTAMP_VARIANTS.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// All inputs of a batch on one shared grid image.
    Combined,
    /// One image per input file.
    Individual,
}

/// Rendering configuration for one batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlotSpec {
    pub dpi: u32,
    pub timestamp_count: usize,
    pub temp_range: (f64, f64),
    pub relh_range: (f64, f64),
    pub layout: LayoutMode,
}

impl Default for PlotSpec {
    fn default() -> Self {
        Self {
            dpi: 500,
            timestamp_count: 10,
            temp_range: (5.0, 30.0),
            relh_range: (20.0, 80.0),
            layout: LayoutMode::Combined,
        }
    }
}

impl PlotSpec {
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(PipelineError::Config("dpi must be positive".to_string()));
        }
        if self.timestamp_count == 0 {
            return Err(PipelineError::Config(
                "timestamp_count must be positive".to_string(),
            ));
        }
        for (name, (min, max)) in [
            ("temp_range", self.temp_range),
            ("relh_range", self.relh_range),
        ] {
            if min >= max {
                return Err(PipelineError::Config(format!(
                    "{name} must satisfy min < max, got ({min}, {max})"
                )));
            }
        }
        Ok(())
    }
}

/// Full pipeline configuration, loadable from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub header: HeaderConfig,
    pub variants: VariantConfig,
    pub plot: PlotSpec,
}

impl PipelineConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;
        self.plot.validate()
    }
}
