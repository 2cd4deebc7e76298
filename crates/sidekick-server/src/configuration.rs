use config::{Config, Environment};
use serde::Deserialize;
use sidekick::providers::configs::OpenAiProviderConfig;
use std::env;
use std::net::SocketAddr;

use crate::error::{to_env_var, ConfigError};

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Failed to parse socket address")
    }
}

#[derive(Debug, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_assistant_name")]
    pub name: String,
    #[serde(default = "default_assistant_instructions")]
    pub instructions: String,
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl ProviderSettings {
    pub fn into_config(self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_filename")]
    pub filename: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub assistant: AssistantSettings,
    pub provider: ProviderSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Settings come from `SIDEKICK_*` environment variables (`__` separates
    /// the section from the field) layered over documented defaults. The
    /// provider api key is the only required value; plain `OPENAI_API_KEY`
    /// also works as its source.
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("assistant.name", default_assistant_name())?
            .set_default("assistant.instructions", default_assistant_instructions())?
            .set_default("provider.host", default_provider_host())?
            .set_default("provider.model", default_model())?
            .set_default("log.filename", default_log_filename())?
            .set_default("log.level", default_log_level())?;

        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            builder = builder.set_default("provider.api_key", api_key)?;
        }

        let config = builder
            .add_source(
                Environment::with_prefix("SIDEKICK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // Surface missing required fields as the env var to set
                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_assistant_name() -> String {
    "Bob".to_string()
}

fn default_assistant_instructions() -> String {
    "You are a helpful AI assistant.".to_string()
}

fn default_provider_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_log_filename() -> String {
    "sidekick.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
