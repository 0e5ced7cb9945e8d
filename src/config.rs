use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "jukebox";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "jukebox.log";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub folders: Vec<PathBuf>,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_seek_step_seconds")]
    pub seek_step_seconds: u16,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_volume() -> f32 {
    1.0
}

fn default_seek_step_seconds() -> u16 {
    5
}

fn default_log_filter() -> String {
    String::from("jukebox=info")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: None,
            folders: Vec::new(),
            volume: default_volume(),
            seek_step_seconds: default_seek_step_seconds(),
            log_filter: default_log_filter(),
        }
    }
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("JUKEBOX_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = if cfg!(windows) {
        env::var("USERPROFILE").context("USERPROFILE is not set")?
    } else {
        env::var("HOME").context("HOME is not set")?
    };
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(config_root()?.join(LOG_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf> {
    ensure_config_dir()?;
    let path = settings_path()?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
