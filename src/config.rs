use crate::error::{Result, WeatherAlertsError};
use crate::models::Condition;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_STATE_FILE: &str = ".weather_alerts_state.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub location: LocationConfig,
    pub email: Option<EmailConfig>,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default)]
    pub alert_rules: Vec<AlertRule>,
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ForecastProvider {
    #[default]
    Nws,
    OpenWeather,
    Unknown(String),
}

impl ForecastProvider {
    pub fn as_str(&self) -> &str {
        match self {
            ForecastProvider::Nws => "nws",
            ForecastProvider::OpenWeather => "openweather",
            ForecastProvider::Unknown(s) => s,
        }
    }
}

impl From<String> for ForecastProvider {
    fn from(s: String) -> Self {
        match s.as_str() {
            "nws" => ForecastProvider::Nws,
            "openweather" => ForecastProvider::OpenWeather,
            other => ForecastProvider::Unknown(other.to_string()),
        }
    }
}

impl From<ForecastProvider> for String {
    fn from(p: ForecastProvider) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for ForecastProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub provider: ForecastProvider,
    pub api_key: Option<String>,
    /// How many days of forecast to fetch
    #[serde(default = "default_forecast_days")]
    pub days: usize,
}

fn default_forecast_days() -> usize {
    7
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider: ForecastProvider::default(),
            api_key: None,
            days: default_forecast_days(),
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("days", &self.days)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zip_code: Option<String>,
}

impl LocationConfig {
    /// Latitude and longitude; a zip code alone is not enough
    pub fn coordinates(&self) -> Result<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            return Ok((lat, lon));
        }

        if self.zip_code.is_some() {
            return Err(WeatherAlertsError::Config(
                "Please provide latitude and longitude in config \
                 (coordinates can be looked up at https://www.latlong.net/)"
                    .into(),
            ));
        }

        Err(WeatherAlertsError::Config(
            "No valid location configured".into(),
        ))
    }
}

#[derive(Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub smtp_port: u16,
    #[serde(default = "default_use_ssl")]
    pub use_ssl: bool,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub to_addresses: Vec<String>,
}

fn default_use_ssl() -> bool {
    true
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(value) => value.trim().parse::<u16>().map_err(|_| {
            D::Error::custom(format!(
                "invalid port '{}' - ensure SMTP_PORT environment variable is set",
                value
            ))
        }),
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("use_ssl", &self.use_ssl)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("to_addresses", &self.to_addresses)
            .finish()
    }
}

/// A named pairing of one condition and one action
#[derive(Debug, Clone, Deserialize)]
pub struct AlertRule {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub condition: Condition,
    pub action: ActionConfig,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawAction")]
pub enum ActionConfig {
    Email { subject: String, body: String },
    Unknown(String),
}

#[derive(Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    subject: Option<String>,
    body: Option<String>,
}

impl TryFrom<RawAction> for ActionConfig {
    type Error = String;

    fn try_from(raw: RawAction) -> std::result::Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "email" => Ok(ActionConfig::Email {
                subject: raw
                    .subject
                    .ok_or_else(|| "email action requires `subject`".to_string())?,
                body: raw
                    .body
                    .ok_or_else(|| "email action requires `body`".to_string())?,
            }),
            other => Ok(ActionConfig::Unknown(other.to_string())),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(WeatherAlertsError::Config(format!(
                "Config file not found at {:?}",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| WeatherAlertsError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::from_yaml(&config_str)?;
        tracing::debug!(
            "Loaded {} alert rule(s) from {:?}",
            config.alert_rules.len(),
            config_path
        );
        Ok(config)
    }

    /// Parse YAML after substituting `${VAR}` references from the environment
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;
        serde_yaml::from_str(&content)
            .map_err(|e| WeatherAlertsError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Search for config.yaml in standard locations.
    /// Returns the first path found, or the XDG default path if none exists.
    fn find_config_path() -> Result<PathBuf> {
        for local in ["config.yaml", "config/config.yaml"] {
            let local_config = PathBuf::from(local);
            if local_config.exists() {
                return Ok(local_config);
            }
        }

        Self::default_config_path()
    }

    /// Default path (~/.config/weather-alerts/config.yaml)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| WeatherAlertsError::Config("Cannot determine config directory".into()))?
            .join("weather-alerts");
        Ok(config_dir.join("config.yaml"))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| WeatherAlertsError::Config(format!("Bad env pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }

    pub fn enabled_rules(&self) -> impl Iterator<Item = &AlertRule> {
        self.alert_rules.iter().filter(|r| r.enabled)
    }
}
