//! Config loading helpers (file + env overrides).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{BackendConfig, BackendEnv, ValidatedBackendConfig, apply_env_overrides};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the backend config from sources using a deterministic precedence order.
///
/// Precedence (highest wins): env overrides (`BackendEnv`), then `config_json`,
/// then defaults (`BackendConfig::default()`).
pub fn load_backend_config_from_sources(
    config_json: Option<&str>,
    env: &BackendEnv,
) -> Result<ValidatedBackendConfig, ErrorEnvelope> {
    let config = match config_json {
        None => BackendConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };
    apply_env_overrides(config, env)
}

/// Load the backend config from an optional file path.
pub fn load_backend_config_from_path(
    config_path: Option<&Path>,
    env: &BackendEnv,
) -> Result<ValidatedBackendConfig, ErrorEnvelope> {
    let config = match config_path {
        None => BackendConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&config_text, format)?
        },
    };
    apply_env_overrides(config, env)
}

/// Load the backend config from std env and an optional file path.
pub fn load_backend_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedBackendConfig, ErrorEnvelope> {
    let env = BackendEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_backend_config_from_path(config_path, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &BackendConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("core", "internal"),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &BackendConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<BackendConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_when_nothing_provided() {
        let env = BackendEnv::default();
        let loaded = load_backend_config_from_sources(None, &env).unwrap();
        assert_eq!(loaded.into_inner(), BackendConfig::default());
    }

    #[test]
    fn file_extension_selects_format() {
        assert_eq!(
            detect_config_format(Path::new("config.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            detect_config_format(Path::new("config.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(detect_config_format(Path::new("config.yaml")).is_err());
    }

    #[test]
    fn missing_config_file_surfaces_not_found() {
        let env = BackendEnv::default();
        let error =
            load_backend_config_from_path(Some(Path::new("/nonexistent/config.json")), &env)
                .unwrap_err();
        assert_eq!(error.code, ErrorCode::new("config", "config_file_not_found"));
    }
}
