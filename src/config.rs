//! TOML configuration shared by the server and the cleanup command.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::BoundingBox;
use crate::olc::{is_valid_length, DEFAULT_CODE_LENGTH};
use crate::pip::{default_excluded_codes, CleanupConfig, MAX_DEDUPE_DECIMALS};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub country: CountryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Code length for /locationcode/generate when none is given
    pub default_code_length: usize,
    /// Upper bound accepted for radius_km on nearby endpoints
    pub max_radius_km: f64,
    /// Upper bound on results per nearby response
    pub max_results: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            default_code_length: DEFAULT_CODE_LENGTH,
            max_radius_km: 500.0,
            max_results: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub regions: PathBuf,
    pub roads: PathBuf,
    pub points: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            regions: PathBuf::from("data/regions.geojson"),
            roads: PathBuf::from("data/roads.geojson"),
            points: PathBuf::from("data/transport.geojson"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CountryConfig {
    pub name: String,
    pub bbox: BoundingBox,
    /// IATA/ICAO codes of neighbouring-country airports to strip
    pub excluded_codes: Vec<String>,
    pub dedupe_decimals: u32,
}

impl Default for CountryConfig {
    fn default() -> Self {
        Self {
            name: "Somalia".to_string(),
            bbox: BoundingBox::somalia(),
            excluded_codes: default_excluded_codes(),
            dedupe_decimals: 4,
        }
    }
}

impl CountryConfig {
    pub fn cleanup(&self) -> CleanupConfig {
        CleanupConfig {
            country_bbox: self.bbox,
            excluded_codes: self.excluded_codes.clone(),
            dedupe_decimals: self.dedupe_decimals,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if !is_valid_length(self.server.default_code_length) {
            anyhow::bail!(
                "server.default_code_length {} is not a valid code length",
                self.server.default_code_length
            );
        }
        if self.server.max_radius_km.is_nan() || self.server.max_radius_km <= 0.0 {
            anyhow::bail!("server.max_radius_km must be positive");
        }
        if self.country.dedupe_decimals > MAX_DEDUPE_DECIMALS {
            anyhow::bail!(
                "country.dedupe_decimals {} exceeds the maximum of {}",
                self.country.dedupe_decimals,
                MAX_DEDUPE_DECIMALS
            );
        }
        let b = &self.country.bbox;
        if b.min_lat > b.max_lat || b.min_lon > b.max_lon {
            anyhow::bail!("country.bbox minimums must not exceed maximums");
        }
        Ok(())
    }
}
