//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use trellis::{TrellisError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for TrellisError {
    fn from(err: ConfigError) -> Self {
        TrellisError::Io(io::Error::other(err.to_string()))
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (trellis/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TrellisError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("trellis/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "trellis", "trellis") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, TrellisError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse TOML configuration text.
fn parse_config(content: &str) -> Result<AppConfig, TrellisError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use trellis::config::{Background, TextMetricsKind};

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.layout.text_metrics, TextMetricsKind::FontSystem);
        assert_approx_eq!(f32, config.routing.curve_step, 16.0);
        assert_approx_eq!(f32, config.routing.corner_radius, 8.0);
        assert_approx_eq!(f32, config.style.padding, 20.0);
        assert_eq!(config.style.background, Background::None);
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r##"
            [layout]
            text_metrics = "fixed"

            [routing]
            curve_step = 24.0
            side_stub = 6.0

            [style]
            background = "grid"
            background_color = "#fafafa"
            grid_size = 10.0
            "##,
        )
        .unwrap();

        assert_eq!(config.layout.text_metrics, TextMetricsKind::Fixed);
        assert_approx_eq!(f32, config.routing.curve_step, 24.0);
        assert_approx_eq!(f32, config.routing.side_stub, 6.0);
        assert_approx_eq!(f32, config.routing.label_gap, 4.0);
        assert_eq!(config.style.background, Background::Grid);
        assert!(config.style.background_color().unwrap().is_some());
        assert_approx_eq!(f32, config.style.grid_size, 10.0);
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[style]\nbackground = \"stripes\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"), "{err}");
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some("does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"), "{err}");
    }
}
