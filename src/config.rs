use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CartographConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub presenter: PresenterConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresenterConfig {
    pub host: String,
    pub port: u16,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7400,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    pub path: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            path: "state/layout.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RefreshConfig {
    #[serde(default)]
    pub interval_secs: Option<u64>,
}

impl CartographConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name("config/local").required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("CARTOGRAPH").separator("__"))
            .build()?
            .try_deserialize()
    }
}
