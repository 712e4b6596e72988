//! Planner configuration file support.
//!
//! Settings are read from a TOML file (`campus.toml` by default). Every field
//! has a default, so an empty file or a missing section is valid.
//!
//! ```toml
//! [scheduler]
//! session_share_percent = 60
//! utc_offset_minutes = 120
//! orientation_activity = "Orientation"
//! dashboard_padding_days = 7
//!
//! [campus]
//! id = "north"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{Calendar, CampusId};
use crate::scheduling::{DEFAULT_SESSION_SHARE_PERCENT, DEFAULT_WINDOW_PADDING_DAYS, ORIENTATION_ACTIVITY};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "CAMPUS_CONFIG";

const MAX_OFFSET_MINUTES: i32 = 24 * 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub campus: CampusSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Share of the day's students one session may hold, in percent.
    #[serde(default = "default_session_share_percent")]
    pub session_share_percent: u32,
    /// Offset from UTC used to turn arrival/departure instants into days.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_orientation_activity")]
    pub orientation_activity: String,
    #[serde(default = "default_dashboard_padding_days")]
    pub dashboard_padding_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampusSettings {
    #[serde(default = "default_campus_id")]
    pub id: CampusId,
}

fn default_session_share_percent() -> u32 {
    DEFAULT_SESSION_SHARE_PERCENT
}

fn default_orientation_activity() -> String {
    ORIENTATION_ACTIVITY.to_string()
}

fn default_dashboard_padding_days() -> u32 {
    DEFAULT_WINDOW_PADDING_DAYS
}

fn default_campus_id() -> CampusId {
    CampusId::from("main")
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            session_share_percent: default_session_share_percent(),
            utc_offset_minutes: 0,
            orientation_activity: default_orientation_activity(),
            dashboard_padding_days: default_dashboard_padding_days(),
        }
    }
}

impl Default for CampusSettings {
    fn default() -> Self {
        Self {
            id: default_campus_id(),
        }
    }
}

impl SchedulerSettings {
    pub fn validate(&self) -> RepositoryResult<()> {
        if !(1..=100).contains(&self.session_share_percent) {
            return Err(RepositoryError::configuration(format!(
                "scheduler.session_share_percent must be between 1 and 100, got {}",
                self.session_share_percent
            )));
        }
        if self.utc_offset_minutes.abs() >= MAX_OFFSET_MINUTES {
            return Err(RepositoryError::configuration(format!(
                "scheduler.utc_offset_minutes must be within ±{} minutes, got {}",
                MAX_OFFSET_MINUTES, self.utc_offset_minutes
            )));
        }
        if self.orientation_activity.trim().is_empty() {
            return Err(RepositoryError::configuration(
                "scheduler.orientation_activity must not be empty",
            ));
        }
        Ok(())
    }

    pub fn calendar(&self) -> RepositoryResult<Calendar> {
        Calendar::with_offset_minutes(self.utc_offset_minutes).ok_or_else(|| {
            RepositoryError::configuration(format!(
                "Invalid UTC offset: {} minutes",
                self.utc_offset_minutes
            ))
        })
    }
}

impl AppConfig {
    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> RepositoryResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.scheduler.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Load `campus.toml` from the first standard location that has one.
    ///
    /// Searches the current directory, `backend/` and the parent directory.
    pub fn from_default_location() -> RepositoryResult<Self> {
        match default_location() {
            Some(path) => Self::from_file(path),
            None => Err(RepositoryError::configuration(
                "No campus.toml found in standard locations",
            )),
        }
    }

    /// `$CAMPUS_CONFIG` if set, then the standard locations, then built-in defaults.
    pub fn from_env_or_default() -> RepositoryResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(path);
        }
        match default_location() {
            Some(path) => Self::from_file(path),
            None => {
                log::info!("No campus.toml found, using default settings");
                Ok(Self::default())
            }
        }
    }
}

fn default_location() -> Option<PathBuf> {
    [
        PathBuf::from("campus.toml"),
        PathBuf::from("backend/campus.toml"),
        PathBuf::from("../campus.toml"),
    ]
    .into_iter()
    .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.scheduler.session_share_percent, 60);
        assert_eq!(config.scheduler.orientation_activity, "Orientation");
        assert_eq!(config.scheduler.dashboard_padding_days, 7);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[scheduler]
session_share_percent = 55
utc_offset_minutes = -300
orientation_activity = "Welcome Day"
dashboard_padding_days = 3

[campus]
id = "north"
"#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.scheduler.session_share_percent, 55);
        assert_eq!(config.scheduler.utc_offset_minutes, -300);
        assert_eq!(config.scheduler.orientation_activity, "Welcome Day");
        assert_eq!(config.scheduler.dashboard_padding_days, 3);
        assert_eq!(config.campus.id.as_str(), "north");
        assert_eq!(
            config.scheduler.calendar().unwrap().offset().local_minus_utc(),
            -300 * 60
        );
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = AppConfig::parse("[scheduler]\nutc_offset_minutes = 60\n").unwrap();
        assert_eq!(config.scheduler.session_share_percent, 60);
        assert_eq!(config.campus.id.as_str(), "main");
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        for toml in [
            "[scheduler]\nsession_share_percent = 0\n",
            "[scheduler]\nsession_share_percent = 101\n",
            "[scheduler]\nutc_offset_minutes = 1440\n",
            "[scheduler]\norientation_activity = \"  \"\n",
            "[scheduler]\nsession_share_percent = \"sixty\"\n",
        ] {
            let err = AppConfig::parse(toml).unwrap_err();
            assert!(
                matches!(err, RepositoryError::ConfigurationError { .. }),
                "{toml}: {err}"
            );
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[campus]\nid = \"south\"").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.campus.id.as_str(), "south");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
