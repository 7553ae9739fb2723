//! User configuration.
//!
//! Settings live in `~/.geotask/config.json`. Every key is optional; command
//! line flags override whatever the file says.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geolocation::{CommandGeolocator, FixedGeolocator, Geolocator};
use crate::parse::{parse_coordinates, CoordinateBounds, CoordinateError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("invalid position '{value}': {source}")]
    Position { value: String, source: CoordinateError },
}

/// How the current location is obtained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Static `"latitude, longitude"` reported as the current position.
    pub position: Option<String>,
    /// Locator program and its arguments.
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geolocation: GeolocationConfig,
    /// Reject coordinates outside Earth's latitude/longitude ranges.
    pub strict_coordinates: bool,
    pub log_file: Option<PathBuf>,
}

fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".geotask")
}

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// Log file used by the form when none is configured.
    pub fn default_log_path() -> PathBuf {
        data_dir().join("geotask.log")
    }

    /// Where logs are written. The full-screen form owns the terminal, so it
    /// falls back to [`default_log_path`](Self::default_log_path); other
    /// commands log to stderr (`None`) unless a file is configured.
    pub fn log_path(&self, interactive: bool) -> Option<PathBuf> {
        match &self.log_file {
            Some(path) => Some(path.clone()),
            None if interactive => Some(Self::default_log_path()),
            None => None,
        }
    }

    /// Replace the locator command from the command line.
    ///
    /// `argv` holds one entry per `--locate-cmd` flag and is used verbatim.
    /// Without flags, `env_line` (`GEOTASK_LOCATE_CMD`) is split on
    /// whitespace.
    pub fn override_command(&mut self, argv: &[String], env_line: Option<&str>) {
        if !argv.is_empty() {
            self.geolocation.command = Some(argv.to_vec());
        } else if let Some(line) = env_line.filter(|l| !l.trim().is_empty()) {
            self.geolocation.command = Some(line.split_whitespace().map(str::to_string).collect());
        }
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn bounds(&self) -> CoordinateBounds {
        if self.strict_coordinates {
            CoordinateBounds::Earth
        } else {
            CoordinateBounds::Permissive
        }
    }

    /// Build the geolocation provider. A fixed position wins over a command;
    /// with neither configured the capability is unavailable.
    pub fn geolocator(&self) -> Result<Option<Arc<dyn Geolocator>>, ConfigError> {
        if let Some(value) = &self.geolocation.position {
            let loc = parse_coordinates(value, CoordinateBounds::Permissive)
                .map_err(|source| ConfigError::Position { value: value.clone(), source })?;
            return Ok(Some(Arc::new(FixedGeolocator::new(loc.latitude, loc.longitude))));
        }
        let command = self
            .geolocation
            .command
            .as_deref()
            .and_then(CommandGeolocator::from_argv)
            .map(|c| Arc::new(c) as Arc<dyn Geolocator>);
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::PositionOptions;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bounds(), CoordinateBounds::Permissive);
        assert!(config.geolocator().unwrap().is_none());
    }

    #[test]
    fn loads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "strict_coordinates": true, "geolocation": { "command": ["whereami", "-f", "csv"] } }"#)
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.strict_coordinates);
        assert_eq!(config.bounds(), CoordinateBounds::Earth);
        assert_eq!(
            config.geolocation.command,
            Some(vec!["whereami".to_string(), "-f".to_string(), "csv".to_string()])
        );
        assert!(config.geolocator().unwrap().is_some());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn fixed_position_wins_over_command() {
        let config = Config {
            geolocation: GeolocationConfig {
                position: Some("52.52, 13.405".to_string()),
                command: Some(vec!["/nonexistent".to_string()]),
            },
            ..Config::default()
        };
        let geo = config.geolocator().unwrap().unwrap();
        let pos = geo.current_position(&PositionOptions::default()).unwrap();
        assert_eq!((pos.latitude, pos.longitude), (52.52, 13.405));
    }

    #[test]
    fn invalid_position_is_reported() {
        let config = Config {
            geolocation: GeolocationConfig { position: Some("home".to_string()), command: None },
            ..Config::default()
        };
        assert!(matches!(config.geolocator(), Err(ConfigError::Position { .. })));
    }

    #[test]
    fn locate_cmd_flags_are_kept_verbatim() {
        let mut config = Config::default();
        let argv = vec!["whereami".to_string(), "--label".to_string(), "my office".to_string()];
        config.override_command(&argv, Some("ignored --x"));
        assert_eq!(config.geolocation.command, Some(argv));
    }

    #[test]
    fn locate_cmd_env_is_split_on_whitespace() {
        let mut config = Config::default();
        config.override_command(&[], Some("  whereami   --csv "));
        assert_eq!(config.geolocation.command, Some(vec!["whereami".to_string(), "--csv".to_string()]));

        let mut config = Config {
            geolocation: GeolocationConfig { position: None, command: Some(vec!["gpsctl".to_string()]) },
            ..Config::default()
        };
        config.override_command(&[], Some("   "));
        assert_eq!(config.geolocation.command, Some(vec!["gpsctl".to_string()]));
    }

    #[test]
    fn form_logs_to_file_by_default() {
        let config = Config::default();
        assert_eq!(config.log_path(true), Some(Config::default_log_path()));
        assert!(Config::default_log_path().ends_with(".geotask/geotask.log"));
        assert_eq!(config.log_path(false), None);

        let config = Config { log_file: Some(PathBuf::from("/tmp/geotask-test.log")), ..Config::default() };
        assert_eq!(config.log_path(false), Some(PathBuf::from("/tmp/geotask-test.log")));
        assert_eq!(config.log_path(true), Some(PathBuf::from("/tmp/geotask-test.log")));
    }

    #[test]
    fn empty_command_means_unavailable() {
        let config = Config {
            geolocation: GeolocationConfig { position: None, command: Some(vec![]) },
            ..Config::default()
        };
        assert!(config.geolocator().unwrap().is_none());
    }
}
