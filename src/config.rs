use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CASES_CSV, DATA_PATH, DEATHS_CSV, FONT_PATHS, PLOT_COUNTRIES, POP_CSV, PROV_POP_CSV,
    PROVINCE_COUNT, REFERENCE_RATES, ROLLING_WINDOW,
};
use crate::error::DataError;

/// Locations of the input tables; URLs or local paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sources {
    pub cases: String,
    pub deaths: String,
    pub population: String,
    pub province_population: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            cases: format!("{DATA_PATH}/{CASES_CSV}"),
            deaths: format!("{DATA_PATH}/{DEATHS_CSV}"),
            population: POP_CSV.to_string(),
            province_population: PROV_POP_CSV.to_string(),
        }
    }
}

/// What to plot and where the data comes from.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "country_groups": [["Italy", "Spain"], ["Canada", "United States"]],
///   "province_count": 5,
///   "window": 7,
///   "reference_rates": [0.05, 0.2],
///   "sources": { "cases": "cache/confirmed.csv" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub country_groups: Vec<Vec<String>>,
    pub province_count: usize,
    pub window: usize,
    pub reference_rates: Vec<f64>,
    pub sources: Sources,
    pub font_paths: Vec<String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            country_groups: PLOT_COUNTRIES
                .iter()
                .map(|group| group.iter().map(|c| c.to_string()).collect())
                .collect(),
            province_count: PROVINCE_COUNT,
            window: ROLLING_WINDOW,
            reference_rates: REFERENCE_RATES.to_vec(),
            sources: Sources::default(),
            font_paths: FONT_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PlotConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
        let config: PlotConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that cannot produce a chart, before anything is
    /// downloaded.
    pub fn validate(&self) -> std::result::Result<(), DataError> {
        if self.window == 0 {
            return Err(DataError::InvalidWindow);
        }
        if self.province_count == 0 {
            return Err(DataError::InvalidConfig("province_count must be at least 1".to_string()));
        }
        if let Some(rate) = self.reference_rates.iter().find(|r| !(**r > 0.0)) {
            return Err(DataError::InvalidConfig(format!("reference rate {rate} is not positive")));
        }
        Ok(())
    }
}
