use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "DIGESTER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/digester.toml";
const ENV_PREFIX: &str = "DIGESTER";
const ENV_SEPARATOR: &str = "__";
const DOTENV_PATH: &str = ".env";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    load_with_dotenv(config_path, Path::new(DOTENV_PATH))
}

/// Load configuration with an explicit .env location
pub fn load_with_dotenv(config_path: PathBuf, dotenv_path: &Path) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // DIGESTER__RUN__PARALLEL -> run.parallel
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(Some(environment_vars(dotenv_path))),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

/// .env entries overlaid by the process environment.
/// A missing or unreadable .env contributes nothing.
fn environment_vars(dotenv_path: &Path) -> config::Map<String, String> {
    let mut vars = config::Map::new();

    match dotenvy::from_path_iter(dotenv_path) {
        Ok(entries) => {
            for (key, value) in entries.flatten() {
                vars.insert(key, value);
            }
        }
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(path = %dotenv_path.display(), error = %e, "Ignoring unreadable .env file"),
    }

    vars.extend(env::vars());
    vars
}
