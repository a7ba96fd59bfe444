#![forbid(unsafe_code)]

//! Controller and page configuration.

use core::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default trailing debounce window for control clicks.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
/// Upper bound accepted for the debounce window.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Configuration parse/validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Options shared by every controller of a page.
///
/// Every field has a default, so `{}` is a valid JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameStageConfig {
    /// Prefix of generated controller ids.
    pub id_prefix: String,
    /// Trailing debounce window for control clicks, in milliseconds.
    pub debounce_ms: u64,
    /// Header title used when the frame has no usable `title` attribute.
    pub fallback_title: String,
    /// Accessible label of the theater control.
    pub theater_label: String,
    /// Accessible label of the fullscreen control.
    pub fullscreen_label: String,
    /// Selector used by hosts that discover frames themselves.
    pub frame_selector: String,
    /// Stacking base for the injected stylesheet.
    pub z_index_base: u32,
    /// Header height in CSS pixels.
    pub header_height_px: u32,
    /// Header/overlay fade duration in milliseconds.
    pub animation_ms: u32,
}

impl Default for FrameStageConfig {
    fn default() -> Self {
        Self {
            id_prefix: "iframe-fullscreen-".to_owned(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            fallback_title: "Embedded content".to_owned(),
            theater_label: "Theater mode".to_owned(),
            fullscreen_label: "Fullscreen mode".to_owned(),
            frame_selector: "article iframe".to_owned(),
            z_index_base: 9990,
            header_height_px: 50,
            animation_ms: 300,
        }
    }
}

impl FrameStageConfig {
    /// Parse and validate a JSON config object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_prefix.is_empty() || self.id_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "id_prefix",
                message: format!("{:?} is not a usable element id prefix", self.id_prefix),
            });
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Invalid {
                field: "debounce_ms",
                message: format!("{} exceeds {MAX_DEBOUNCE_MS}", self.debounce_ms),
            });
        }
        if self.frame_selector.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "frame_selector",
                message: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
