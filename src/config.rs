//! Runtime configuration
//!
//! Window and presentation settings stored as RON. A missing or broken file
//! is not fatal: the binary falls back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::rasterizer::{HEIGHT, WIDTH};

/// Error type for config loading and saving
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Logical resolution of the software frame buffers
    pub screen_width: usize,
    pub screen_height: usize,
    pub res_scale: u32,
    pub target_fps: u32,
    /// Vertical tile atlas; the demo generates one when unset
    pub texture_file: Option<String>,
    /// Four-strip panorama; no background when unset
    pub background_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "tilecaster".to_string(),
            // Both views side by side at the default resolution scale
            window_width: WIDTH as u32 * 2 * 2,
            window_height: HEIGHT as u32 * 2,
            screen_width: WIDTH,
            screen_height: HEIGHT,
            res_scale: 2,
            target_fps: 60,
            texture_file: None,
            background_file: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let config: Config = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, logging and falling back to defaults on any failure
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::info!("Using default config ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().indentor("  ".to_string());
        let ron_string = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, ron_string)?;
        Ok(())
    }

    /// Fixed interval between simulation ticks
    pub fn frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::Validation(format!(
                "screen size {}x{} must be non-zero",
                self.screen_width, self.screen_height
            )));
        }
        if self.screen_height % 2 != 0 {
            return Err(ConfigError::Validation(format!(
                "screen height {} must be even",
                self.screen_height
            )));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Validation(format!(
                "window size {}x{} must be non-zero",
                self.window_width, self.window_height
            )));
        }
        if self.res_scale == 0 || self.target_fps == 0 {
            return Err(ConfigError::Validation(
                "res_scale and target_fps must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_logical_screen() {
        let config = Config::default();
        assert_eq!(config.screen_width, 320);
        assert_eq!(config.screen_height, 240);
        assert_eq!(config.res_scale, 2);
        let frame = config.frame_time().as_secs_f64();
        assert!((frame - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_window_fits_both_views() {
        let config = Config::default();
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.window_height, 480);
        assert!(matches!(
            Config::from_ron("(window_width: 0)"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tilecaster.ron");

        let config = Config {
            title: "test".to_string(),
            target_fps: 30,
            texture_file: Some("tiles.png".to_string()),
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let config = Config::from_ron("(target_fps: 30)").unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.screen_width, 320);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.ron"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_rejects_zero_fps() {
        assert!(matches!(
            Config::from_ron("(target_fps: 0)"),
            Err(ConfigError::Validation(_))
        ));
    }
}
