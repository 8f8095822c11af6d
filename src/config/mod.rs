use crate::errors::{AppError, AppResult};
use crate::utils::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_auto_commit")]
    pub auto_commit: bool,
    #[serde(default = "default_separator_char")]
    pub separator_char: String,
}

fn default_auto_commit() -> bool {
    true
}
fn default_separator_char() -> String {
    "-".to_string()
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            output_format: OutputFormat::default(),
            auto_commit: default_auto_commit(),
            separator_char: default_separator_char(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("sqliteplus")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".sqliteplus")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("sqliteplus.conf")
    }

    /// Default SQLite database used when neither the config nor `--db` names one
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("sqliteplus.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("cannot parse configuration: {e}")))
    }

    /// Write this configuration to the config file, creating its directory.
    pub fn save(&self) -> AppResult<PathBuf> {
        fs::create_dir_all(Self::config_dir())?;
        let yaml = self.to_yaml()?;
        let path = Self::config_file();
        fs::write(&path, yaml)?;
        Ok(path)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// First character of `separator_char`, `-` when it is empty.
    pub fn separator(&self) -> char {
        self.separator_char.chars().next().unwrap_or('-')
    }
}
