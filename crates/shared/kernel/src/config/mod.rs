use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_PREFIX: &str = "HOSTBRIDGE";
const DEFAULT_CONFIG_FILE: &str = "hostbridge";

/// Custom error type for config loading.
#[hb_derive::hb_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// Layers, lowest priority first:
/// 1. **Base File**: settings from `path` (TOML, JSON or YAML, picked by extension). An explicit
///    path must exist. Without one, an optional `hostbridge.*` file in the working directory is
///    used when present.
/// 2. **Environment Overrides**: variables prefixed with `HOSTBRIDGE__`, nested with double
///    underscores (e.g. `HOSTBRIDGE__BRIDGE__DEFAULT_TIMEOUT_MS` maps to
///    `bridge.default_timeout_ms`).
///
/// # Errors
/// Fails if an explicit file is missing, a value cannot be parsed, or the merged tree does not
/// match `T`.
///
/// # Example
/// ```rust
/// use hb_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
