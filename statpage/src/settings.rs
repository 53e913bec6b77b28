//! Runtime settings.
//!
//! Layered from built-in defaults, an optional TOML file and `STATPAGE_*`
//! environment variables. The binary applies command-line overrides last.

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix for environment overrides, e.g. `STATPAGE_LISTEN_ADDR`.
pub const ENV_PREFIX: &str = "STATPAGE";

/// Errors from loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid listen address {addr:?}: {source}")]
    ListenAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("Unknown timezone: {0}")]
    Timezone(String),

    #[error("CPU sample window must be greater than zero")]
    SampleWindow,
}

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Any path on the filesystem whose usage is shown in the disk section.
    pub disk_path: PathBuf,
    /// Status log written by the monitored cron job.
    pub cron_log: PathBuf,
    /// IANA timezone name for the clock.
    pub timezone: String,
    /// CPU utilisation is measured over this many milliseconds.
    pub cpu_sample_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            disk_path: PathBuf::from("/"),
            cron_log: PathBuf::from("/var/log/cron_last_status.log"),
            timezone: "US/Eastern".to_string(),
            cpu_sample_ms: 1000,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file, and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Check every field that can be wrong at startup.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.socket_addr()?;
        self.tz()?;
        if self.cpu_sample_ms == 0 {
            return Err(SettingsError::SampleWindow);
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.listen_addr
            .parse()
            .map_err(|source| SettingsError::ListenAddr {
                addr: self.listen_addr.clone(),
                source,
            })
    }

    pub fn tz(&self) -> Result<Tz, SettingsError> {
        self.timezone
            .parse()
            .map_err(|_| SettingsError::Timezone(self.timezone.clone()))
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.listen_addr, "0.0.0.0:5000");
        assert_eq!(settings.disk_path, PathBuf::from("/"));
        assert_eq!(settings.timezone, "US/Eastern");
        assert_eq!(settings.cpu_sample_window(), Duration::from_secs(1));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_keeps_unset_defaults() {
        let file = toml_file(
            r#"
            listen_addr = "127.0.0.1:8080"
            cron_log = "/tmp/dns_update_status.log"
            cpu_sample_ms = 250
            "#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.listen_addr, "127.0.0.1:8080");
        assert_eq!(settings.cron_log, PathBuf::from("/tmp/dns_update_status.log"));
        assert_eq!(settings.cpu_sample_ms, 250);
        assert_eq!(settings.timezone, "US/Eastern");
        assert_eq!(settings.disk_path, PathBuf::from("/"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Settings::load(Some(Path::new("/nonexistent/statpage.toml")));
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }

    #[test]
    fn test_invalid_listen_addr() {
        let settings = Settings {
            listen_addr: "localhost".to_string(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, SettingsError::ListenAddr { .. }));
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn test_unknown_timezone() {
        let settings = Settings {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Timezone(tz)) if tz == "Mars/Olympus_Mons"
        ));
    }

    #[test]
    fn test_zero_sample_window() {
        let settings = Settings {
            cpu_sample_ms: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::SampleWindow)));
    }

    #[test]
    fn test_timezone_parses() {
        let settings = Settings {
            timezone: "Europe/Berlin".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.tz().unwrap(), Tz::Europe__Berlin);
    }
}
