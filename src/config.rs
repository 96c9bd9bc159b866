use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde::Deserialize;

use crate::theme::{Theme, ThemeConfig};

const APP_NAME: &str = "verticalendar";

const DEFAULT_DAYS_BEFORE: u32 = 30;
const DEFAULT_DAYS_AFTER: u32 = 180;
const DEFAULT_LOG_LEVEL: &str = "info";
/// Upper bound for `days_before` and `days_after`.
const MAX_WINDOW_DAYS: u32 = 3650;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
    /// Days loaded before today when the app starts.
    pub days_before: u32,
    /// Days loaded after today when the app starts.
    pub days_after: u32,
    pub theme: Theme,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            database: data_dir.join(format!("{APP_NAME}.db")),
            log_file: data_dir.join(format!("{APP_NAME}.log")),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            days_before: DEFAULT_DAYS_BEFORE,
            days_after: DEFAULT_DAYS_AFTER,
            theme: Theme::default(),
        }
    }
}

impl AppConfig {
    /// Read `config.toml` from the user config directory. A missing file gives
    /// the defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).wrap_err_with(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        file.into_config()
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml"))
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ── TOML config types ──

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
    days_before: Option<u32>,
    days_after: Option<u32>,
    theme: Option<ThemeConfig>,
}

impl ConfigFile {
    fn into_config(self) -> Result<AppConfig> {
        let defaults = AppConfig::default();
        let days_before = window_days("days_before", self.days_before, defaults.days_before)?;
        let days_after = window_days("days_after", self.days_after, defaults.days_after)?;
        Ok(AppConfig {
            database: self.database.unwrap_or(defaults.database),
            log_file: self.log_file.unwrap_or(defaults.log_file),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            days_before,
            days_after,
            theme: self
                .theme
                .map(ThemeConfig::into_theme)
                .unwrap_or(defaults.theme),
        })
    }
}

fn window_days(key: &str, value: Option<u32>, default: u32) -> Result<u32> {
    match value {
        Some(days) if days > MAX_WINDOW_DAYS => Err(eyre!(
            "{key} = {days} is too large (at most {MAX_WINDOW_DAYS})"
        )),
        Some(days) => Ok(days),
        None => Ok(default),
    }
}
