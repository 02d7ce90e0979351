use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Demo server settings: `config.yaml` (optional) then `CAR_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: String,
    pub tick_ms: u64,
    /// YAML file layered over the preset, if any.
    pub vehicle_config: Option<String>,
    /// Built-in preset name (`gt86`, `hatchback`).
    pub vehicle_preset: String,
    /// Seed for the hill phases; same seed, same terrain.
    pub terrain_seed: u64,
}

impl Settings {
    pub fn new() -> Result<Settings, ConfigError> {
        Self::from_file("config.yaml")
    }

    pub fn from_file(path: &str) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("bind_address", "0.0.0.0:9001")?
            .set_default("tick_ms", 16)?
            .set_default("vehicle_preset", "gt86")?
            .set_default("terrain_seed", 1)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("CAR"))
            .build()?;

        config.try_deserialize()
    }
}
