//! Configuration management (config.toml in the platform config directory)
//!
//! Handles loading, saving, and providing defaults for player settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the configuration inside [`config_dir`]
pub const CONFIG_FILE: &str = "config.toml";

/// Player configuration.
///
/// Contains all user-configurable settings organized into sections.
/// Serialized to/from TOML format for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Window/presentation settings
    #[serde(default)]
    pub video: VideoConfig,
    /// Compute kernel selection
    #[serde(default)]
    pub kernel: KernelConfig,
}

/// Window and presentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Whether to start in borderless fullscreen (default: false)
    #[serde(default)]
    pub fullscreen: bool,
    /// Whether to enable vertical sync (default: true)
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Initial window width in logical pixels (default: 1280)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Initial window height in logical pixels (default: 720)
    #[serde(default = "default_height")]
    pub height: u32,
}

/// Compute kernel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KernelConfig {
    /// WGSL file to load instead of the bundled kernel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Compute entry point to dispatch (default: the first one declared)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

fn default_true() -> bool {
    true
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fullscreen: false,
            vsync: default_true(),
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Errors raised when persisting configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine the platform config directory")]
    NoConfigDir,

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Raytrace\config`
/// On macOS: `~/Library/Application Support/io.raytrace.Raytrace`
/// On Linux: `~/.config/Raytrace`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.raytrace", "", "Raytrace")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    match config_dir() {
        Some(dir) => load_from(&dir.join(CONFIG_FILE)),
        None => Config::default(),
    }
}

/// Loads the configuration from a specific file.
///
/// A missing file yields defaults silently; a malformed one yields defaults
/// with a warning.
pub fn load_from(path: &Path) -> Config {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory and
/// returns the path written.
///
/// # Errors
///
/// Returns an error if the directory cannot be determined or created, or
/// the file cannot be written.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join(CONFIG_FILE);
    save_to(config, &path)?;
    Ok(path)
}

/// Saves the configuration to a specific file, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================
    // Default value tests
    // =============================================================

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.video.fullscreen);
        assert!(config.video.vsync);
        assert_eq!(config.video.width, 1280);
        assert_eq!(config.video.height, 720);
        assert!(config.kernel.path.is_none());
        assert!(config.kernel.entry_point.is_none());
    }

    // =============================================================
    // TOML serialization tests
    // =============================================================

    #[test]
    fn test_config_serialize_roundtrip() {
        let config = Config {
            video: VideoConfig {
                fullscreen: true,
                vsync: false,
                width: 800,
                height: 600,
            },
            kernel: KernelConfig {
                path: Some(PathBuf::from("kernels/tracer.wgsl")),
                entry_point: Some("shade".to_string()),
            },
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_deserialize_empty() {
        // Empty TOML should produce defaults
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial_video() {
        // Only set fullscreen, rest should default
        let toml_str = r#"
[video]
fullscreen = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.video.fullscreen);
        assert!(config.video.vsync); // default
        assert_eq!(config.video.width, 1280); // default
    }

    #[test]
    fn test_config_deserialize_kernel_section() {
        let toml_str = r#"
[kernel]
path = "my_kernel.wgsl"
entry_point = "main"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.kernel.path, Some(PathBuf::from("my_kernel.wgsl")));
        assert_eq!(config.kernel.entry_point.as_deref(), Some("main"));
        assert_eq!(config.video, VideoConfig::default());
    }

    #[test]
    fn test_unset_kernel_fields_are_not_serialized() {
        let toml_str = toml::to_string(&Config::default()).unwrap();
        assert!(!toml_str.contains("path"));
        assert!(!toml_str.contains("entry_point"));
    }

    // =============================================================
    // File I/O tests
    // =============================================================

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("missing.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[video\nfullscreen = ").unwrap();
        assert_eq!(load_from(&path), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = Config::default();
        config.video.vsync = false;
        config.kernel.entry_point = Some("main".to_string());

        save_to(&config, &path).unwrap();
        assert_eq!(load_from(&path), config);
    }
}
