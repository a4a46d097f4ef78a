use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Number of concurrent fingerprinting workers.
    pub workers: usize,
    /// Descend into symlinked directories and fingerprint symlinked files.
    pub follow_symlinks: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            follow_symlinks: false,
        }
    }
}

impl AppConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Message(
                "workers must be a positive integer".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Load `Config.toml` from the working directory (if present) layered
/// under `SIFT_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_from(ConfigFile::with_name("Config").required(false))
}

/// Load configuration from an explicit TOML file, still honoring `SIFT_*` overrides.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    load_from(ConfigFile::from(path).required(true))
}

fn load_from<S>(file: S) -> Result<AppConfig, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("workers", defaults.workers as u64)?
        .set_default("follow_symlinks", defaults.follow_symlinks)?
        .add_source(file)
        .add_source(Environment::with_prefix("SIFT"))
        .build()?;
    builder.try_deserialize::<AppConfig>()?.validate()
}
