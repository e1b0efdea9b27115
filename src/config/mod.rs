pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::time::Duration;

#[cfg(feature = "cli")]
use crate::core::emitter::OUTPUT_FILENAME;
#[cfg(feature = "cli")]
use crate::domain::model::Units;
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use clap::Parser;

pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_PAUSE_SECONDS: f64 = 0.1;

/// Everything the Lookup Client needs, resolved once at startup.
#[derive(Clone)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// Reads the API key from the process environment. Binaries load `.env` first.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_ENV).ok();
        let key = validation::validate_api_key(API_KEY_ENV, key.as_deref())?;
        Ok(Self::new(key))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// API key 不輸出到日誌
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Validate for ProviderSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_api_key(API_KEY_ENV, Some(&self.api_key))?;
        if self.timeout.is_zero() {
            return Err(crate::utils::error::EtlError::InvalidConfigValueError {
                field: "timeout".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Converts a validated pause in seconds; out-of-range input falls back to no pause.
pub fn pause_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "drivetime-etl")]
#[command(about = "Add driving distance and duration to a CSV of origin/destination pairs")]
pub struct CliConfig {
    /// Input CSV with `origin` and `destination` columns
    #[arg(short, long)]
    pub input: String,

    /// Directory that receives address_with_distances.csv
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_enum, default_value_t = Units::Imperial)]
    pub units: Units,

    /// Seconds to wait after each lookup (0 to 2)
    #[arg(long, default_value_t = DEFAULT_PAUSE_SECONDS)]
    pub pause: f64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// Input field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    #[arg(long, default_value = DEFAULT_ENDPOINT, hide = true)]
    pub endpoint: String,

    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn provider_settings(&self) -> Result<ProviderSettings> {
        let key = validation::validate_api_key(API_KEY_ENV, self.api_key.as_deref())?;
        Ok(ProviderSettings::new(key)
            .with_endpoint(self.endpoint.clone())
            .with_timeout(Duration::from_secs(self.timeout_seconds)))
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_filename(&self) -> &str {
        OUTPUT_FILENAME
    }

    fn units(&self) -> Units {
        self.units
    }

    fn pause(&self) -> Duration {
        pause_duration(self.pause)
    }

    fn delimiter(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_pause("pause", self.pause)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validation::validate_delimiter("delimiter", self.delimiter)?;
        self.provider_settings()?.validate()
    }
}
