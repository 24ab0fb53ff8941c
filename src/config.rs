/// Service configuration loaded from a TOML file.
///
/// Names the forecast point, which models to compare, logging options and
/// optional overrides of the scoring table. Everything except `[location]`
/// has a default, so the smallest valid file is just the location block.
///
/// ```toml
/// [location]
/// name = "Peoria, IL"
/// latitude = 40.69
/// longitude = -89.59
///
/// [models]
/// weather = ["gfs", "ecmwf", "hrrr", "nam"]
/// wave = []
///
/// [scoring]
/// wind_speed = { threshold = 8.0 }
/// ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;

use crate::confidence::{AgreementKind, ScoringConfig};
use crate::logging::LogLevel;
use crate::model::{Location, ModelId, Parameter, WaveModel, WeatherModel};

/// Config file used when neither an argument nor `CONSENSUS_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "consensus.toml";

/// Open-Meteo serves at most 16 forecast days.
pub const MAX_FORECAST_DAYS: u32 = 16;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The file could not be read.
    Io(String),
    /// The file is not valid TOML or does not match the expected shape.
    Parse(String),
    /// The file parsed but a value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    location: Location,
    #[serde(default)]
    models: ModelsSection,
    #[serde(default)]
    logging: LoggingSection,
    #[serde(default)]
    scoring: HashMap<Parameter, RuleOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ModelsSection {
    weather: Vec<WeatherModel>,
    wave: Vec<WaveModel>,
    forecast_days: u32,
    timeout_secs: u64,
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            weather: WeatherModel::ALL.to_vec(),
            wave: WaveModel::ALL.to_vec(),
            forecast_days: 7,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LoggingSection {
    level: String,
    file: Option<String>,
    timestamps: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleOverride {
    threshold: Option<f64>,
    weight: Option<f64>,
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Fully validated runtime configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub location: Location,
    pub weather_models: Vec<WeatherModel>,
    pub wave_models: Vec<WaveModel>,
    pub forecast_days: u32,
    pub timeout_secs: u64,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
    pub console_timestamps: bool,
    pub scoring: ScoringConfig,
}

/// Path of the config file: `CONSENSUS_CONFIG` if set, else the default.
pub fn config_path_from_env() -> String {
    std::env::var("CONSENSUS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Reads and validates a config file.
pub fn load_config(path: &str) -> Result<EngineConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?;
    parse_config(&text)
}

/// Parses and validates config text.
pub fn parse_config(text: &str) -> Result<EngineConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;

    validate_location(&file.location)?;
    let models = file.models;
    if !(1..=MAX_FORECAST_DAYS).contains(&models.forecast_days) {
        return Err(ConfigError::Invalid(format!(
            "forecast_days must be between 1 and {}, got {}",
            MAX_FORECAST_DAYS, models.forecast_days
        )));
    }
    if models.timeout_secs == 0 {
        return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
    }
    reject_duplicates(&models.weather)?;
    reject_duplicates(&models.wave)?;

    let log_level = file
        .logging
        .level
        .parse::<LogLevel>()
        .map_err(ConfigError::Invalid)?;

    let scoring = apply_overrides(ScoringConfig::default(), &file.scoring)?;

    Ok(EngineConfig {
        location: file.location,
        weather_models: models.weather,
        wave_models: models.wave,
        forecast_days: models.forecast_days,
        timeout_secs: models.timeout_secs,
        log_level,
        log_file: file.logging.file,
        console_timestamps: file.logging.timestamps,
        scoring,
    })
}

fn validate_location(location: &Location) -> Result<(), ConfigError> {
    if !(-90.0..=90.0).contains(&location.latitude) {
        return Err(ConfigError::Invalid(format!(
            "latitude must be between -90 and 90, got {}",
            location.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&location.longitude) {
        return Err(ConfigError::Invalid(format!(
            "longitude must be between -180 and 180, got {}",
            location.longitude
        )));
    }
    Ok(())
}

fn reject_duplicates<K: ModelId>(models: &[K]) -> Result<(), ConfigError> {
    for (i, model) in models.iter().enumerate() {
        if models[..i].contains(model) {
            return Err(ConfigError::Invalid(format!("model '{}' is listed twice", model.id())));
        }
    }
    Ok(())
}

/// Applies `[scoring]` overrides to a table and re-validates it.
fn apply_overrides(
    mut scoring: ScoringConfig,
    overrides: &HashMap<Parameter, RuleOverride>,
) -> Result<ScoringConfig, ConfigError> {
    for (parameter, change) in overrides {
        let rule = scoring
            .rule_mut(*parameter)
            .ok_or_else(|| ConfigError::Invalid(format!("{} is not a scored parameter", parameter)))?;

        if let Some(threshold) = change.threshold {
            rule.base_threshold = threshold;
            if let AgreementKind::Binary { decision_threshold } = &mut rule.kind {
                *decision_threshold = threshold;
            }
        }
        if let Some(weight) = change.weight {
            rule.weight = weight;
        }
    }

    scoring.validate().map_err(ConfigError::Invalid)?;
    Ok(scoring)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
