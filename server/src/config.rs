use std::env;

use config::{Config, ConfigError, File};
use relay_state::RelayStateConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RpcEndpointConfig {
    pub server: ServerConfig,
    pub redis: RelayStateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9000,
            host: "0.0.0.0".into(),
            log_format: LogFormat::Pretty,
        }
    }
}

pub fn get_config() -> Result<RpcEndpointConfig, ConfigError> {
    let base_path = env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {e}")))?;
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment
    let environment: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    let environment_filename = format!("server_{}.yaml", environment.as_str());

    Config::builder()
        .add_source(File::from(configuration_directory.join("server_base.yaml")))
        .add_source(File::from(configuration_directory.join(environment_filename)).required(false))
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?
        .try_deserialize::<RpcEndpointConfig>()
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local`, `development`, or `production`.",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::try_from("Production".to_string()).unwrap().as_str(),
            "production"
        );
        assert!(Environment::try_from("staging".to_string()).is_err());
    }

    #[test]
    fn test_yaml_config_with_defaults() {
        let config = Config::builder()
            .add_source(File::from_str(
                "redis:\n  url: redis://cache:6379/\nserver:\n  log_format: json\n",
                FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<RpcEndpointConfig>()
            .unwrap();

        assert_eq!(config.redis.url, "redis://cache:6379/");
        assert_eq!(config.redis.key_prefix, "rpc-endpoint");
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.server.port, 9000);
    }
}
