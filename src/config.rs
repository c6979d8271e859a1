use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::{self, Profile};

pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable that points the journal at another home directory.
pub const HOME_ENV_VAR: &str = "DOT_HOME";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the database, config and logs. Not stored in the
    /// file; it is wherever the file was read from.
    #[serde(skip)]
    pub home: PathBuf,
    #[serde(default = "default_database_file")]
    pub database_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_to_file: bool,
    #[serde(default)]
    pub show_cancelled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home: default_home(Profile::Prod),
            database_file: default_database_file(),
            log_level: default_log_level(),
            log_to_file: false,
            show_cancelled: false,
        }
    }
}

fn default_database_file() -> String {
    "dot.db".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Platform data directory for the profile, falling back to `~/.dot`.
pub fn default_home(profile: Profile) -> PathBuf {
    utils::get_data_dir(profile).unwrap_or_else(|| match profile {
        Profile::Dev => utils::expand_path("~/.dot-dev"),
        Profile::Prod => utils::expand_path("~/.dot"),
    })
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to create home directory: {0}")]
    HomeDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Settings {
    /// Picks the home directory: `--home`, then `DOT_HOME`, then the
    /// profile's data directory.
    pub fn resolve_home(cli_home: Option<&Path>, profile: Profile) -> PathBuf {
        if let Some(home) = cli_home {
            return utils::expand_path(&home.to_string_lossy());
        }
        match std::env::var(HOME_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => utils::expand_path(value.trim()),
            _ => default_home(profile),
        }
    }

    /// Load settings for a profile, honouring `--home` and `DOT_HOME`.
    pub fn load(cli_home: Option<&Path>, profile: Profile) -> Result<Self, ConfigError> {
        Self::load_from(&Self::resolve_home(cli_home, profile))
    }

    /// Load `<home>/config.toml`, writing the defaults there when it does
    /// not exist yet.
    pub fn load_from(home: &Path) -> Result<Self, ConfigError> {
        let config_path = home.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let mut settings: Settings = toml::from_str(&contents)?;
            settings.home = home.to_path_buf();
            Ok(settings)
        } else {
            let settings = Settings {
                home: home.to_path_buf(),
                ..Settings::default()
            };
            settings.save()?;
            Ok(settings)
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.ensure_home_exists()?;
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;
        fs::write(self.config_path(), toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        Ok(())
    }

    pub fn ensure_home_exists(&self) -> Result<(), ConfigError> {
        if !self.home.exists() {
            fs::create_dir_all(&self.home).map_err(|e| ConfigError::HomeDirError(e.to_string()))?;
        }
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(CONFIG_FILE_NAME)
    }

    pub fn database_path(&self) -> PathBuf {
        self.home.join(utils::expand_path(&self.database_file))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join("logs")
    }
}
