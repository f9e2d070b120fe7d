//! Configuration management for photobooth.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::device::{FacingMode, StreamConstraints};
use crate::encoder::default_preferences;
use crate::error::{Error, Result};
use crate::filter::FilterKind;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name used under the config and pictures directories.
const APP_DIR_NAME: &str = "photobooth";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PHOTOBOOTH_`)
/// 2. TOML config file at `~/.config/photobooth/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera stream configuration.
    pub camera: CameraConfig,
    /// Recording configuration.
    pub recording: RecordingConfig,
    /// Filter configuration.
    pub filter: FilterConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Camera-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera opened at startup.
    pub facing_mode: FacingMode,
    /// Request an audio track with the video.
    pub audio_enabled: bool,
    /// Preferred frame width.
    pub ideal_width: u32,
    /// Preferred frame height.
    pub ideal_height: u32,
    /// Ask for echo cancellation on the audio track.
    pub echo_cancellation: bool,
}

/// Recording-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// MIME types to try, most preferred first.
    pub codec_preferences: Vec<String>,
    /// How often the encoder emits a chunk, in milliseconds.
    pub timeslice_ms: u64,
    /// Interval of the elapsed-time tick, in milliseconds.
    pub tick_interval_ms: u64,
}

/// Filter-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter selected at startup.
    pub default: FilterKind,
}

/// Export-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory artifacts are saved to.
    /// Defaults to `~/Pictures/photobooth`
    pub output_dir: Option<PathBuf>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            audio_enabled: true,
            ideal_width: 1280,
            ideal_height: 720,
            echo_cancellation: true,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            codec_preferences: default_preferences(),
            timeslice_ms: 100,
            tick_interval_ms: 1000,
        }
    }
}

impl CameraConfig {
    /// Stream constraints for `facing_mode`, with audio when `audio` is set.
    #[must_use]
    pub fn constraints(&self, facing_mode: FacingMode, audio: bool) -> StreamConstraints {
        let constraints = StreamConstraints::video(facing_mode, self.ideal_width, self.ideal_height);
        if audio {
            constraints.with_audio(self.echo_cancellation)
        } else {
            constraints
        }
    }
}

impl RecordingConfig {
    /// Encoder timeslice as a Duration.
    #[must_use]
    pub fn timeslice(&self) -> Duration {
        Duration::from_millis(self.timeslice_ms)
    }

    /// Timer tick interval as a Duration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PHOTOBOOTH_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default output directory.
    #[must_use]
    pub fn default_output_dir() -> PathBuf {
        dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.camera.ideal_width == 0 || self.camera.ideal_height == 0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "ideal resolution must be non-zero, got {}x{}",
                    self.camera.ideal_width, self.camera.ideal_height
                ),
            });
        }

        if self.recording.codec_preferences.is_empty() {
            return Err(Error::ConfigValidation {
                message: "codec_preferences must list at least one format".to_string(),
            });
        }

        if let Some(blank) = self
            .recording
            .codec_preferences
            .iter()
            .find(|mime| mime.trim().is_empty())
        {
            return Err(Error::ConfigValidation {
                message: format!("codec_preferences contains a blank entry: {blank:?}"),
            });
        }

        if self.recording.timeslice_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "timeslice_ms must be greater than 0".to_string(),
            });
        }

        if self.recording.tick_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "tick_interval_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the output directory, resolving defaults if not set.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(Self::default_output_dir)
    }
}
