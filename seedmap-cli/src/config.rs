//! Configuration handling for the SeedMap CLI
//!
//! Supports loading configuration from seedmap.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use seedmap_core::{ScanParams, ScoringParams};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "seedmap.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Seeding and triggering parameters
    #[serde(default)]
    pub seed: ScanParams,

    /// Smith-Waterman scoring and hit threshold
    #[serde(default)]
    pub scoring: ScoringParams,

    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Worker threads for the scan
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Show a scan progress bar
    #[serde(default)]
    pub progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Print full alignments instead of one line per hit
    #[serde(default)]
    pub pretty: bool,

    /// Bases of reference context shown around pretty alignments
    #[serde(default = "default_flank")]
    pub flank: usize,
}

// Default value functions
fn default_threads() -> usize { num_cpus::get() }
fn default_flank() -> usize { seedmap_core::report::FLANK_LEN }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            progress: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            flank: default_flank(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }

    /// Reject settings the mapper cannot run with
    pub fn validate(&self) -> Result<()> {
        self.seed.validate()?;
        self.scoring.validate()?;
        anyhow::ensure!(self.general.threads > 0, "thread count must be positive");
        Ok(())
    }
}
