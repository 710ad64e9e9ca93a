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

use steplogic::{StepLogicError, config::AppConfig};

/// Configuration file errors for CLI
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigFileError> for StepLogicError {
    fn from(err: ConfigFileError) -> Self {
        StepLogicError::Io(io::Error::other(err.to_string()))
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (steplogic/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path to config file
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, StepLogicError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("steplogic/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "steplogic", "steplogic") {
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
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, StepLogicError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigFileError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[syntax]\nstep_keywords = [\"TAKT\"]\n\n[validation]\nrequire_description = false\n",
        )
        .expect("Failed to write config");

        let config = load_config(Some(&path)).expect("Failed to load config");

        assert_eq!(config.syntax().step_keywords(), &["TAKT"]);
        assert!(!config.validation().require_description());
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");

        let err = load_config(Some(dir.path().join("absent.toml"))).expect_err("missing file");

        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_malformed_config_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[syntax\nstep_keywords = 3").expect("Failed to write config");

        let err = load_config(Some(&path)).expect_err("malformed file");

        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }
}
