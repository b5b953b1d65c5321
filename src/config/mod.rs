//! User settings
//!
//! Settings are read once at startup and handed to the dispatcher; nothing
//! changes them afterwards.
//!
//! ```toml
//! [launcher]
//! prefix = ["nice", "-n19", "--"]
//!
//! [ninja]
//! status = "[%u/%r/%f] "
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::error::BuildError;

/// Default niceness wrappers placed before every build command
pub const DEFAULT_LAUNCHER_PREFIX: &[&str] = &[
    "nice", "-n19", "--", "ionice", "-c3", "--", "choom", "-n1000", "--",
];

/// Default `NINJA_STATUS`: running/ready/failed task counts
pub const DEFAULT_NINJA_STATUS: &str = "[%u/%r/%f] ";

/// Name of the settings file inside the user config directory
const SETTINGS_FILE: &str = "config.toml";

/// Resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Words prepended to every throttled command
    pub launcher_prefix: Vec<String>,
    /// Value of `NINJA_STATUS` for Ninja builds
    pub ninja_status: String,
    /// File the settings came from, if any
    pub source: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            launcher_prefix: DEFAULT_LAUNCHER_PREFIX
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ninja_status: DEFAULT_NINJA_STATUS.to_string(),
            source: None,
        }
    }
}

/// On-disk shape of the settings file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default)]
    launcher: LauncherSection,
    #[serde(default)]
    ninja: NinjaSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LauncherSection {
    prefix: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NinjaSection {
    status: Option<String>,
}

impl Settings {
    /// Load settings from an explicit file, or the user config directory
    ///
    /// An explicit path must exist. The default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => match default_settings_path() {
                Some(path) if path.is_file() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load settings from a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildError::config_error_with_hint(
                format!("Failed to read settings file {}", path.display()),
                Some(e.into()),
                "Check the --config argument or the T_CONFIG environment variable.",
            )
        })?;
        let mut settings = Self::parse(&content).map_err(|e| {
            BuildError::config_error_with_hint(
                format!("Invalid settings file {}", path.display()),
                Some(e),
                "Known keys are launcher.prefix (array of strings) and ninja.status (string).",
            )
        })?;
        settings.source = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Parse settings from TOML text, filling unset keys with defaults
    pub fn parse(content: &str) -> Result<Self> {
        let file: SettingsFile = toml::from_str(content)?;
        let defaults = Self::default();
        Ok(Self {
            launcher_prefix: file.launcher.prefix.unwrap_or(defaults.launcher_prefix),
            ninja_status: file.ninja.status.unwrap_or(defaults.ninja_status),
            source: None,
        })
    }
}

/// `<config dir>/t/config.toml`
fn default_settings_path() -> Option<PathBuf> {
    let base_dirs = directories::BaseDirs::new()?;
    Some(base_dirs.config_dir().join("t").join(SETTINGS_FILE))
}
