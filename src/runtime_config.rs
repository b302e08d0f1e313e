// =============================================================================
// Runtime Configuration: static engine settings
// =============================================================================
//
// Read once at startup. All fields carry `#[serde(default)]` so that a partial
// config file only needs to name what it changes. Structural validation
// (positive spans, non-empty year list, ...) happens in `Engine::build`, not
// here, so that a config error is reported the same way whether it came from
// a file or from code.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_data_path() -> String {
    "btc_hourly_data.csv".to_string()
}

fn default_ema_windows() -> Vec<i64> {
    vec![9, 12, 21, 30, 50, 80, 100, 200]
}

fn default_years() -> Vec<i32> {
    (2017..=2024).collect()
}

fn default_display_cap() -> usize {
    5
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// CSV file with `date, open, high, low, close` columns.
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// EMA spans. Signed so that a negative entry is reported as a
    /// configuration error instead of a parse failure.
    #[serde(default = "default_ema_windows")]
    pub ema_windows: Vec<i64>,

    /// Partition years, in selector order. The first one is the default view.
    #[serde(default = "default_years")]
    pub years: Vec<i32>,

    /// Maximum number of indicators returned per view.
    #[serde(default = "default_display_cap")]
    pub display_cap: usize,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            ema_windows: default_ema_windows(),
            years: default_years(),
            display_cap: default_display_cap(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            windows = ?config.ema_windows,
            years = ?config.years,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `TRENDLINE_DATA_PATH` / `TRENDLINE_BIND_ADDR` style overrides.
    /// `lookup` abstracts the environment so tests stay hermetic.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TRENDLINE_DATA_PATH").filter(|s| !s.trim().is_empty()) {
            self.data_path = path.trim().to_string();
        }
        if let Some(addr) = lookup("TRENDLINE_BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
    }
}
