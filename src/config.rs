use crate::log::LogConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use onebot_v11::connect::ws::WsConfig;

const JSON_CONFIG_FILE_NAME: &str = "config.json";
const TOML_CONFIG_FILE_NAME: &str = "config.toml";
const YAML_CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Deserialize, Serialize, Debug)]
pub struct CoreConfig {
    pub log: Vec<LogConfig>,
    pub bot_ws: WsConfig,
    pub relay: RelayConfig,
    pub processor: ProcessorConfig,
    pub command: CommandConfig,
    pub context: ContextConfig,
}

/// Where the relay HTTP receiver listens.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
}

/// External service the extracted records are posted to.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProcessorConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommandConfig {
    pub trigger: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ContextConfig {
    pub retention_secs: i64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            log: vec![LogConfig::default()],
            bot_ws: WsConfig::default(),
            relay: RelayConfig::default(),
            processor: ProcessorConfig::default(),
            command: CommandConfig::default(),
            context: ContextConfig::default(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            url: "http://localhost:5000/process-data".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        CommandConfig {
            trigger: "ap kara".to_string(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig {
            retention_secs: 60 * 60,
        }
    }
}

impl ProcessorConfig {
    pub fn endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&self.url)?)
    }
}

impl CoreConfig {
    pub fn init() -> Result<Self> {
        let defaults = Figment::from(Serialized::defaults(CoreConfig::default()));
        let figment = if Path::try_exists(TOML_CONFIG_FILE_NAME.as_ref())? {
            defaults.merge(Toml::file(TOML_CONFIG_FILE_NAME))
        } else if Path::try_exists(YAML_CONFIG_FILE_NAME.as_ref())? {
            defaults.merge(Yaml::file(YAML_CONFIG_FILE_NAME))
        } else if Path::try_exists(JSON_CONFIG_FILE_NAME.as_ref())? {
            defaults.merge(Json::file(JSON_CONFIG_FILE_NAME))
        } else {
            let mut config_file: File = File::create(JSON_CONFIG_FILE_NAME)?;
            config_file.write_all(serde_json::to_string_pretty(&CoreConfig::default())?.as_bytes())?;
            config_file.flush()?;
            defaults
        };
        let config = Self::with_env(figment).extract::<CoreConfig>()?;
        config.processor.endpoint()?;
        Ok(config)
    }

    /// `PORT` in the environment overrides the relay port.
    fn with_env(figment: Figment) -> Figment {
        figment.merge(Env::raw().only(&["PORT"]).map(|_| "relay.port".into()))
    }
}
