use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read analyzer settings (file or ANALYZER__* environment): {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid analyzer settings: {0}")]
    ValidationError(String),
}
