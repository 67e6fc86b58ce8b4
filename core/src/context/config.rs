//! Application configuration
//!
//! The shared types live in kztracker-types; this module adds the platform
//! default log folder and confy persistence.

use std::path::PathBuf;

pub use kztracker_types::{AppConfig, OverlaySettings, TailerSettings};

use super::ConfigError;

const APP_NAME: &str = "kztracker";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Where a default Steam install of Age of Conan writes its combat logs.
pub fn default_log_directory() -> String {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("ProgramFiles(x86)")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("C:/Program Files (x86)"))
            .join("Steam/steamapps/common/Age of Conan")
            .to_str()
            .map(String::from)
            .unwrap_or_default()
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        dirs::home_dir()
            .map(|p| p.join(".local/share/Steam/steamapps/common/Age of Conan"))
            .and_then(|p| p.to_str().map(String::from))
            .unwrap_or_default()
    }
    #[cfg(target_os = "macos")]
    {
        String::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    /// Load the stored config, falling back to defaults if it is missing or
    /// unreadable.
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    /// Defaults with the platform log folder filled in
    fn load_with_defaults() -> Self;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
    /// Fill an empty `log_directory` with the platform default.
    fn with_default_directory(self) -> Self;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Using default configuration");
            Self::load_with_defaults()
        })
    }

    fn try_load() -> Result<Self, ConfigError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        Ok(config.with_default_directory().validated())
    }

    fn load_with_defaults() -> Self {
        AppConfig::with_log_directory(default_log_directory())
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(dir) = Self::config_path()?.parent() {
            std::fs::create_dir_all(dir).map_err(ConfigError::CreateDir)?;
        }
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)?;
        tracing::info!("Configuration saved");
        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
    }

    fn with_default_directory(mut self) -> Self {
        if self.log_directory.trim().is_empty() {
            self.log_directory = default_log_directory();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_takes_platform_default() {
        let config = AppConfig::default().with_default_directory();
        assert_eq!(config.log_directory, default_log_directory());
    }

    #[test]
    fn configured_directory_is_kept() {
        let config = AppConfig::with_log_directory("/games/aoc".to_string()).with_default_directory();
        assert_eq!(config.log_directory, "/games/aoc");
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn linux_default_points_at_steam_install() {
        assert!(default_log_directory().ends_with("steamapps/common/Age of Conan"));
    }

    #[test]
    fn defaults_keep_display_interval() {
        let config = AppConfig::load_with_defaults();
        assert_eq!(config.display_interval_ms, 50);
        assert_eq!(config.tailer, TailerSettings::default());
    }
}
