use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: set the {env_var} environment variable")]
    MissingEnvVar { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a missing config field to the environment variable that supplies it.
/// The only required fields live in the provider section.
pub fn to_env_var(field: &str) -> String {
    format!(
        "SIDEKICK_PROVIDER__{}",
        field.replace('.', "__").to_uppercase()
    )
}
