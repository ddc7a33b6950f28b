//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatekeeperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatekeeperConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the optional config file, overlay the environment, then validate.
pub fn load(path: Option<&Path>) -> Result<GatekeeperConfig, ConfigError> {
    let config = match path {
        Some(path) => read_file(path)?,
        None => GatekeeperConfig::default(),
    };
    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<GatekeeperConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment-style variables on top of a loaded config.
///
/// `ALLOWED_ORIGINS` is appended to the file's list rather than replacing it.
pub fn apply_env_overrides<F>(mut config: GatekeeperConfig, lookup: F) -> GatekeeperConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(site_url) = non_empty("SITE_URL") {
        config.site.site_url = Some(site_url.trim().to_string());
    }
    if let Some(admin_domain) = non_empty("ADMIN_DOMAIN") {
        config.site.admin_domain = Some(admin_domain.trim().to_string());
    }
    if let Some(origins) = non_empty("ALLOWED_ORIGINS") {
        config.site.allowed_origins.extend(
            origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string),
        );
    }
    if let Some(env) = lookup("APP_ENV") {
        config.site.development = env.trim().eq_ignore_ascii_case("development");
    }
    if let Some(bind) = non_empty("GATEKEEPER_BIND") {
        config.listener.bind_address = bind.trim().to_string();
    }
    if let Some(upstream) = non_empty("GATEKEEPER_UPSTREAM") {
        config.upstream.address = upstream.trim().to_string();
    }

    config
}
