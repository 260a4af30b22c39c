use crate::error::ConfigError;
use config::builder::{ConfigBuilder, DefaultState};
use std::env;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{Backend, DatabaseSettings, LoggingSettings, Settings};
pub use telemetry::{LogGuard, init_tracing};

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `pulse.toml` in the working directory, `PULSE__SECTION__KEY` environment
/// variables, and finally `DATABASE_URL` (read from `.env` when present).
pub fn load_settings() -> Result<Settings, ConfigError> {
    // A missing .env file is fine, the variables may come from the real environment.
    dotenvy::dotenv().ok();

    let builder = base_builder()?
        .add_source(config::File::with_name("pulse").required(false))
        .add_source(
            config::Environment::with_prefix("PULSE")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", env::var("DATABASE_URL").ok())?;

    finish(builder)
}

/// Loads the configuration from a single TOML file on top of the defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let builder = base_builder()?.add_source(config::File::from(path));
    finish(builder)
}

fn base_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    // An empty URL survives deserialization so `validate` can report it clearly.
    Ok(config::Config::builder().set_default("database.url", "")?)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
