use crate::config::{
    pause_duration, ProviderSettings, API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_PAUSE_SECONDS,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::emitter::OUTPUT_FILENAME;
use crate::domain::model::Units;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: String,
    pub delimiter: Option<char>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupConfig {
    pub units: Option<Units>,
    pub pause_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn env_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，先替換 ${VAR}
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 未設定的變數保留原樣，之後由驗證步驟回報
    fn substitute_env_vars(content: &str) -> String {
        env_placeholder()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// API key from `[provider] api_key`, falling back to the environment.
    /// An unresolved `${VAR}` placeholder counts as missing.
    pub fn api_key(&self) -> Option<String> {
        match self.provider.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && !env_placeholder().is_match(key) => {
                Some(key.to_string())
            }
            Some(_) => None,
            None => std::env::var(API_KEY_ENV).ok(),
        }
    }

    pub fn provider_settings(&self) -> Result<ProviderSettings> {
        let key = self.api_key();
        let key = validation::validate_api_key("provider.api_key", key.as_deref())?;
        Ok(ProviderSettings::new(key)
            .with_endpoint(self.endpoint())
            .with_timeout(Duration::from_secs(self.timeout_seconds())))
    }

    pub fn endpoint(&self) -> &str {
        self.provider.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.provider.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn pause_seconds(&self) -> f64 {
        self.lookup.pause_seconds.unwrap_or(DEFAULT_PAUSE_SECONDS)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("source.input_path", &self.source.input_path)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        if let Some(filename) = &self.load.filename {
            validation::validate_non_empty_string("load.filename", filename)?;
        }
        if let Some(delimiter) = self.source.delimiter {
            validation::validate_delimiter("source.delimiter", delimiter)?;
        }
        validation::validate_pause("lookup.pause_seconds", self.pause_seconds())?;
        validation::validate_range("provider.timeout_seconds", self.timeout_seconds(), 1, 600)?;
        self.provider_settings()?.validate()
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_filename(&self) -> &str {
        self.load.filename.as_deref().unwrap_or(OUTPUT_FILENAME)
    }

    fn units(&self) -> Units {
        self.lookup.units.unwrap_or_default()
    }

    fn pause(&self) -> Duration {
        pause_duration(self.pause_seconds())
    }

    fn delimiter(&self) -> u8 {
        self.source
            .delimiter
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or(b',')
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_CONFIG: &str = r#"
[source]
input_path = "addresses.csv"
delimiter = ";"

[provider]
endpoint = "https://proxy.example.com/distancematrix/json"
api_key = "literal-key"
timeout_seconds = 10

[lookup]
units = "metric"
pause_seconds = 0.5

[load]
output_path = "./results"
filename = "out.csv"

[monitoring]
enabled = true
"#;

    #[test]
    fn test_parse_full_toml_config() {
        let config = TomlConfig::from_toml_str(FULL_CONFIG).unwrap();

        assert_eq!(config.input_path(), "addresses.csv");
        assert_eq!(config.delimiter(), b';');
        assert_eq!(config.units(), Units::Metric);
        assert_eq!(config.pause(), Duration::from_millis(500));
        assert_eq!(config.output_filename(), "out.csv");
        assert!(config.monitoring_enabled());

        let settings = config.provider_settings().unwrap();
        assert_eq!(settings.endpoint, "https://proxy.example.com/distancematrix/json");
        assert_eq!(settings.api_key, "literal-key");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
[source]
input_path = "in.csv"

[provider]
api_key = "k"

[load]
output_path = "./output"
"#,
        )
        .unwrap();

        assert_eq!(config.units(), Units::Imperial);
        assert_eq!(config.pause(), Duration::from_millis(100));
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_seconds(), 30);
        assert_eq!(config.output_filename(), "address_with_distances.csv");
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DRIVETIME_TEST_KEY", "from-env");

        let config = TomlConfig::from_toml_str(
            r#"
[source]
input_path = "in.csv"

[provider]
api_key = "${DRIVETIME_TEST_KEY}"

[load]
output_path = "./output"
"#,
        )
        .unwrap();
        assert_eq!(config.api_key().as_deref(), Some("from-env"));

        std::env::remove_var("DRIVETIME_TEST_KEY");
    }

    #[test]
    fn test_unresolved_placeholder_is_missing_key() {
        let config = TomlConfig::from_toml_str(
            r#"
[source]
input_path = "in.csv"

[provider]
api_key = "${DRIVETIME_TEST_UNSET_VARIABLE}"

[load]
output_path = "./output"
"#,
        )
        .unwrap();

        assert!(config.api_key().is_none());
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let bad_pause = FULL_CONFIG.replace("pause_seconds = 0.5", "pause_seconds = 3.0");
        let config = TomlConfig::from_toml_str(&bad_pause).unwrap();
        assert!(config.validate().is_err());

        let bad_endpoint = FULL_CONFIG.replace("https://proxy.example.com", "ftp://proxy.example.com");
        let config = TomlConfig::from_toml_str(&bad_endpoint).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_units_is_parse_error() {
        let bad = FULL_CONFIG.replace("units = \"metric\"", "units = \"nautical\"");
        assert!(matches!(
            TomlConfig::from_toml_str(&bad),
            Err(EtlError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();

        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.load.output_path, "./results");
    }
}
