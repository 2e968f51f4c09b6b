//! Environment-driven settings and persisted display preferences.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DIR_ENV: &str = "GROVE_DIR";
pub const HEADLESS_ENV: &str = "GROVE_HEADLESS";
pub const LOG_ENV: &str = "GROVE_LOG";

pub fn grove_dir() -> io::Result<PathBuf> {
    if let Ok(dir) = std::env::var(DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME")
        .map_err(|_| io::Error::other("HOME not set; set GROVE_DIR explicitly"))?;
    Ok(PathBuf::from(home).join(".prompt_grove"))
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

pub fn color_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// When set, never spawn clipboard or browser helpers.
pub fn headless() -> bool {
    std::env::var(HEADLESS_ENV).is_ok_and(|v| !v.is_empty() && v != "0")
}

/// Display preferences stored alongside the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub show_summaries: bool,
    pub compact: bool,
    pub dark: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            show_summaries: true,
            compact: false,
            dark: true,
        }
    }
}

/// Parse `on|off|true|false|1|0|yes|no` switches used by `grove prefs`.
pub fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
