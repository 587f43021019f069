use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::encoding::TextEncoding;
use crate::data::sample::DEFAULT_SEED;

/// Environment variable pointing at a JSON configuration file.
pub const CONFIG_ENV: &str = "MAST_PLANNER_CONFIG";

/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "mast_planner.json";

// ---------------------------------------------------------------------------
// Fallback policy
// ---------------------------------------------------------------------------

/// What to do when the configured data file cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Show the load error and render nothing.
    #[default]
    Disabled,
    /// Substitute the embedded sample dataset and warn about it.
    SampleData,
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Deployment-specific settings: data location, code tables and limits.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// {
///   "data_path": "masts.csv",
///   "operators": { "30": "MTN Nigeria", "60": "Airtel" },
///   "fallback": "sample_data"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Delimited text file loaded at start-up.
    pub data_path: PathBuf,
    /// Field delimiter of the input and export files.
    pub delimiter: char,
    /// Decoding candidates, tried in order.
    pub encodings: Vec<TextEncoding>,
    /// MNC code → operator display name.
    pub operators: BTreeMap<i64, String>,
    /// Raw header → canonical header (MNC, Cell_ID, Latitude, Longitude, Gen).
    pub header_aliases: BTreeMap<String, String>,
    /// Upper bound on points drawn on the map.
    pub sample_limit: usize,
    /// Seed for the map sample, fixed so redraws pick the same points.
    pub sample_seed: u64,
    /// Seconds a cached dataset stays valid; 0 keeps it until the file changes.
    pub cache_ttl_secs: u64,
    pub fallback: FallbackPolicy,
    /// Rows shown in the table preview.
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let operators = [
            (30, "MTN"),
            (60, "Airtel"),
            (20, "Airtel"),
            (50, "Glo"),
            (2, "9mobile"),
            (1, "9mobile"),
        ]
        .into_iter()
        .map(|(code, name)| (code, name.to_string()))
        .collect();

        let header_aliases = [
            ("60", "MNC"),
            ("50822", "Cell_ID"),
            ("Latitude_abs", "Latitude"),
            ("Longitude_abs", "Longitude"),
            ("Network_Generation", "Gen"),
        ]
        .into_iter()
        .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
        .collect();

        Self {
            data_path: PathBuf::from("621_GIS_ready_2G_3G_4G.csv"),
            delimiter: ',',
            encodings: TextEncoding::DEFAULT_ORDER.to_vec(),
            operators,
            header_aliases,
            sample_limit: 5000,
            sample_seed: DEFAULT_SEED,
            cache_ttl_secs: 600,
            fallback: FallbackPolicy::Disabled,
            preview_rows: 500,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("invalid config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for this process:
    /// `$MAST_PLANNER_CONFIG`, then `./mast_planner.json`, then defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            log::info!("Using config from ${CONFIG_ENV}: {}", path.display());
            return Self::from_file(&path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            log::info!("Using config {}", local.display());
            return Self::from_file(local);
        }
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Delimiter as the single byte the csv crate expects.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees an ASCII delimiter
        self.delimiter as u8
    }

    /// Operator name for an MNC code, `None` when the code is not in the table.
    pub fn operator_name(&self, mnc: i64) -> Option<&str> {
        self.operators.get(&mnc).map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        if self.encodings.is_empty() {
            anyhow::bail!("at least one encoding must be configured");
        }
        Ok(())
    }
}
