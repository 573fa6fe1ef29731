use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::rules::RuleUpdate;

/// User agent reported in records when the host does not supply one.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Global configuration loaded from `~/.config/reqwatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// User agent copied into every emitted record.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Whether the watcher's diagnostic logger forwards messages.
    #[serde(default = "default_logging_enabled")]
    pub logging_enabled: bool,
    /// Initial rule set; applied as a partial update on startup.
    #[serde(default)]
    pub rules: RuleUpdate,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_logging_enabled() -> bool {
    true
}

fn strings(v: &[&str]) -> Option<Vec<String>> {
    Some(v.iter().map(|s| s.to_string()).collect())
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            logging_enabled: true,
            rules: RuleUpdate {
                blocked_hosts: strings(&["update.microsoft.com", "windowsupdate.com"]),
                media_exts: strings(&[
                    ".MP4", ".M4V", ".M4A", ".WEBM", ".MKV", ".FLV", ".MOV", ".MP3", ".OGG",
                    ".M3U8", ".MPD",
                ]),
                file_exts: strings(&[
                    "ZIP", "RAR", "7Z", "GZ", "TAR", "XZ", "ISO", "EXE", "MSI", "DMG", "DEB",
                    "RPM", "APK", "PDF",
                ]),
                matching_hosts: Some(Vec::new()),
                media_types: strings(&["audio/", "video/"]),
                url_patterns: Some(Vec::new()),
                request_file_exts: Some(Vec::new()),
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("reqwatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WatcherConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WatcherConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<WatcherConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: WatcherConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
