use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
#[cfg(feature = "clap")]
pub mod overrides;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use overrides::OverrideArgs;
pub use settings::{AnalysisSettings, Config, DEFAULT_CAPITAL, PortfolioSettings};

/// Environment variables with this prefix override file values,
/// e.g. `ANALYZER__ANALYSIS__DATE_ORDER=day_first`.
const ENV_PREFIX: &str = "ANALYZER";

/// Loads the run configuration.
///
/// With `path` the file must exist. Without it, a `config.toml` in the working directory is
/// used when present and defaults otherwise. Environment variables are layered on top.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_layered(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

fn load_layered(path: Option<&Path>, env: config::Environment) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        portfolios = config.portfolios.len(),
        date_order = %config.analysis.date_order,
        "Configuration loaded"
    );
    Ok(config)
}
