//! Configuration file support.
//!
//! Editor preferences, keybindings and label classes are stored together in
//! one JSON file, by default `<config dir>/figedit/figedit-config.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HISTORY_CAPACITY, hit};
use crate::controller::EditorSettings;
use crate::keybindings::KeyBindings;
use crate::model::{FigureType, KeypointTemplate, LabelClass, LabelSet, default_labels};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Editor preferences
    #[serde(default)]
    pub preferences: EditorPreferences,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,

    /// Label class definitions, in hotkey and picker order
    #[serde(default = "default_label_configs")]
    pub labels: Vec<LabelConfig>,
}

fn default_app_name() -> String {
    "figedit".to_string()
}

fn default_label_configs() -> Vec<LabelConfig> {
    default_labels().iter().map(LabelConfig::from).collect()
}

/// Editor preferences section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorPreferences {
    /// Number of undo snapshots kept per item
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Screen-pixel radius for grabbing box corners and keypoints
    #[serde(default = "default_handle_radius")]
    pub handle_radius: f32,

    /// Screen-pixel radius for grabbing review markers
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,

    /// Screen-pixel distance to the first vertex that closes a mask polygon
    #[serde(default = "default_lock_distance")]
    pub lock_distance: f32,

    /// Directory holding item documents
    #[serde(default)]
    pub data_dir: String,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_handle_radius() -> f32 {
    hit::HANDLE_RADIUS
}

fn default_marker_radius() -> f32 {
    hit::MARKER_RADIUS
}

fn default_lock_distance() -> f32 {
    hit::POLYGON_LOCK_DISTANCE
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            handle_radius: default_handle_radius(),
            marker_radius: default_marker_radius(),
            lock_distance: default_lock_distance(),
            data_dir: String::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl From<&EditorPreferences> for EditorSettings {
    fn from(prefs: &EditorPreferences) -> Self {
        Self {
            handle_radius: prefs.handle_radius,
            marker_radius: prefs.marker_radius,
            lock_distance: prefs.lock_distance,
            history_capacity: prefs.history_capacity,
        }
    }
}

/// Label class configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Unique label name
    pub name: String,
    /// Figure type created under this label
    pub figure_type: FigureType,
    /// RGB color for the label
    pub color: [u8; 3],
    /// Skeleton template for keypoint labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keypoints: Vec<KeypointTemplate>,
}

impl From<&LabelClass> for LabelConfig {
    fn from(class: &LabelClass) -> Self {
        Self {
            name: class.name.clone(),
            figure_type: class.figure_type,
            color: class.color,
            keypoints: class.keypoints.clone(),
        }
    }
}

impl From<LabelConfig> for LabelClass {
    fn from(config: LabelConfig) -> Self {
        let class = LabelClass::new(&config.name, config.figure_type, config.color);
        if config.keypoints.is_empty() {
            class
        } else {
            class.with_keypoints(config.keypoints)
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: EditorPreferences::default(),
            keybindings: KeyBindings::default(),
            labels: default_label_configs(),
        }
    }

    /// Label set built from the configured classes.
    pub fn label_set(&self) -> LabelSet {
        LabelSet::new(self.labels.iter().cloned().map(LabelClass::from).collect())
    }

    /// Controller thresholds from the preferences.
    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings::from(&self.preferences)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let prefs = &self.preferences;
        if prefs.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                message: "history_capacity must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("handle_radius", prefs.handle_radius),
            ("marker_radius", prefs.marker_radius),
            ("lock_distance", prefs.lock_distance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be a positive number, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Load configuration from a file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "figedit-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("figedit").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("figedit")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from `path` if the file exists.
    ///
    /// A missing file is `Ok(None)`; an unreadable or invalid one is an error.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Ok(None);
        }
        Self::load_from_path(path).map(Some)
    }

    /// Load configuration from the default path, if there is one.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn try_load_from_default_path() -> Result<Option<Self>, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_if_exists(&path),
            None => Ok(None),
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting is out of range
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
