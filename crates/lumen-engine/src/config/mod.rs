//! Engine configuration.
//!
//! Loaded once at startup from TOML. Every field has a default so an empty file
//! (or no file) is a valid configuration.
//!
//! ```toml
//! cadence_hz = 30.0
//! texture_size = 256
//!
//! [window]
//! title = "lumen"
//! width = 1280
//! height = 720
//!
//! [streamer]
//! backoff_us = 1000
//!
//! [overlay]
//! logical_height = 720.0
//! max_layout_passes = 16
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,

    /// Rate of the cadence-driven texture refresh, independent of the display rate.
    pub cadence_hz: f64,

    /// Edge length of the cadence-driven procedural texture.
    pub texture_size: u32,

    pub streamer: StreamerConfig,
    pub overlay: OverlayConfig,

    /// Stop cleanly after this many presented frames.
    pub max_frames: Option<u64>,

    /// `env_logger` filter; `RUST_LOG` is used when absent.
    pub log_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            cadence_hz: 30.0,
            texture_size: 256,
            streamer: StreamerConfig::default(),
            overlay: OverlayConfig::default(),
            max_frames: None,
            log_filter: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    /// Idle sleep between processing attempts, in microseconds.
    pub backoff_us: u64,
    pub thread_name: String,
}

impl StreamerConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_micros(self.backoff_us)
    }
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            backoff_us: 1000,
            thread_name: "lumen-streamer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Height of the UI coordinate space; width follows the window aspect.
    pub logical_height: f32,
    /// Upper bound on layout passes per frame.
    pub max_layout_passes: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            logical_height: 720.0,
            max_layout_passes: 16,
        }
    }
}

impl EngineConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text).context("failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Seconds between two cadence firings.
    pub fn cadence_step(&self) -> f64 {
        1.0 / self.cadence_hz
    }

    pub fn validate(&self) -> std::result::Result<(), SetupError> {
        if !(self.cadence_hz.is_finite() && self.cadence_hz > 0.0) {
            return Err(SetupError::Config(format!(
                "cadence_hz must be positive, got {}",
                self.cadence_hz
            )));
        }
        if self.texture_size == 0 {
            return Err(SetupError::Config("texture_size must be non-zero".into()));
        }
        if !(self.overlay.logical_height.is_finite() && self.overlay.logical_height > 0.0) {
            return Err(SetupError::Config(format!(
                "overlay.logical_height must be positive, got {}",
                self.overlay.logical_height
            )));
        }
        if self.overlay.max_layout_passes == 0 {
            return Err(SetupError::Config(
                "overlay.max_layout_passes must be at least 1".into(),
            ));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(SetupError::Config("window size must be non-zero".into()));
        }
        Ok(())
    }
}
