use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding captured images. If `None`, a `screenshot-hub`
    /// folder in the system temp directory is used.
    #[serde(default)]
    pub storage_dir: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving log output in addition to stderr.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Right-clicks arriving this many milliseconds after a menu closed are
    /// ignored.
    #[serde(default = "default_menu_suppression_ms")]
    pub menu_suppression_ms: u64,
    /// Delay between placing an image on the clipboard and re-listing the
    /// store.
    #[serde(default = "default_copy_settle_ms")]
    pub copy_settle_ms: u64,
    #[serde(default = "default_menu_width")]
    pub menu_width: f32,
    /// Clipboard polling interval of the capture watcher.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Minimum spacing between two stored captures.
    #[serde(default = "default_capture_cooldown_ms")]
    pub capture_cooldown_ms: u64,
    /// Delete captures older than this many hours on start-up.
    #[serde(default)]
    pub retention_hours: Option<i64>,
    /// Edge length of grid thumbnails.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: f32,
    /// Initial window size. If absent, a default size is used.
    #[serde(default = "default_window_size")]
    pub window_size: Option<(i32, i32)>,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
}

fn default_menu_suppression_ms() -> u64 {
    300
}

fn default_copy_settle_ms() -> u64 {
    300
}

fn default_menu_width() -> f32 {
    192.0
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_capture_cooldown_ms() -> u64 {
    2000
}

fn default_thumbnail_size() -> f32 {
    160.0
}

fn default_window_size() -> Option<(i32, i32)> {
    Some((960, 640))
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: None,
            debug_logging: false,
            log_file: None,
            menu_suppression_ms: default_menu_suppression_ms(),
            copy_settle_ms: default_copy_settle_ms(),
            menu_width: default_menu_width(),
            poll_interval_ms: default_poll_interval_ms(),
            capture_cooldown_ms: default_capture_cooldown_ms(),
            retention_hours: None,
            thumbnail_size: default_thumbnail_size(),
            window_size: default_window_size(),
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("parsing {path}"))
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {path}"))?;
        Ok(())
    }

    pub fn storage_dir(&self) -> PathBuf {
        match &self.storage_dir {
            Some(dir) => PathBuf::from(dir),
            None => std::env::temp_dir().join("screenshot-hub"),
        }
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.as_ref().map(PathBuf::from)
    }
}
