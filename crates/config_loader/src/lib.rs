//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce `SimulationConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Rig: {}", config.rig.name);
//! ```

mod parser;
mod validator;

pub use contracts::SimulationConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::warn;

/// A validated configuration plus the non-fatal findings
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SimulationConfig,
    pub warnings: Vec<String>,
}

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    /// Validation warnings are logged.
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SimulationConfig, ContractError> {
        let loaded = Self::load_with_warnings(path)?;
        Ok(Self::log_warnings(loaded))
    }

    /// Load configuration from file path, returning warnings to the caller
    pub fn load_with_warnings(path: &Path) -> Result<LoadedConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::parse_and_validate(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SimulationConfig, ContractError> {
        let loaded = Self::parse_and_validate(content, format)?;
        Ok(Self::log_warnings(loaded))
    }

    /// Serialize SimulationConfig to TOML string
    pub fn to_toml(config: &SimulationConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize SimulationConfig to JSON string
    pub fn to_json(config: &SimulationConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<LoadedConfig, ContractError> {
        let config = parser::parse(content, format)?;
        let warnings = validator::validate(&config)?;
        Ok(LoadedConfig { config, warnings })
    }

    fn log_warnings(loaded: LoadedConfig) -> SimulationConfig {
        for warning in &loaded.warnings {
            warn!(rig = %loaded.config.rig.name, "{}", warning);
        }
        loaded.config
    }
}
