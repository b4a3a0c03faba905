// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline tunables.
//!
//! Every constant the editor uses lives here so hosts can override them from
//! a RON file:
//! - Zoom bounds, wheel ratios and button step
//! - Gesture hit zones and the minimum clip duration
//! - Playback sync tolerance
//! - Default overlap policy per track kind

use crate::error::ConfigError;
use crate::track::{EditPolicy, TrackKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "timeline.ron";

/// Timeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Smallest zoom (pixels per second)
    pub min_zoom: f64,
    /// Largest zoom (pixels per second)
    pub max_zoom: f64,
    /// Zoom of a fresh session
    pub initial_zoom: f64,
    /// Wheel multiplier when zooming in
    pub wheel_zoom_in: f64,
    /// Wheel multiplier when zooming out
    pub wheel_zoom_out: f64,
    /// Zoom change of the toolbar buttons
    pub zoom_button_step: f64,
    /// Width of the trim handles at each clip edge, in pixels
    pub edge_hit_px: f64,
    /// Shortest duration a trim can leave (seconds)
    pub min_clip_duration: f64,
    /// Duration for dropped media that does not report one
    pub default_clip_duration: f64,
    /// Max disagreement between timeline and player before seeking (seconds)
    pub sync_tolerance: f64,
    /// Share of the viewport the first dropped clip should fill
    pub first_clip_viewport_fraction: f64,
    /// Head-room factor applied by fit-to-content
    pub fit_padding: f64,
    /// Shortest content span fit-to-content will zoom to (seconds)
    pub fit_min_span: f64,
    /// Policy for video tracks
    pub video_policy: EditPolicy,
    /// Policy for audio tracks
    pub audio_policy: EditPolicy,
    /// Policy for text tracks
    pub text_policy: EditPolicy,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_zoom: 2.0,
            max_zoom: 300.0,
            initial_zoom: 30.0,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            zoom_button_step: 10.0,
            edge_hit_px: 12.0,
            min_clip_duration: 0.2,
            default_clip_duration: 10.0,
            sync_tolerance: 0.25,
            first_clip_viewport_fraction: 1.0 / 3.0,
            fit_padding: 1.2,
            fit_min_span: 10.0,
            video_policy: EditPolicy::Ripple,
            audio_policy: EditPolicy::FreeMove,
            text_policy: EditPolicy::FreeMove,
        }
    }
}

impl TimelineConfig {
    /// Policy new tracks of `kind` start with
    pub fn policy_for(&self, kind: TrackKind) -> EditPolicy {
        match kind {
            TrackKind::Video => self.video_policy,
            TrackKind::Audio => self.audio_policy,
            TrackKind::Text => self.text_policy,
        }
    }

    /// Check that the values describe a usable editor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range [{}, {}] is empty or non-positive",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.min_clip_duration <= 0.0 {
            return Err(ConfigError::Invalid(
                "min_clip_duration must be positive".to_string(),
            ));
        }
        if self.default_clip_duration < self.min_clip_duration {
            return Err(ConfigError::Invalid(
                "default_clip_duration is shorter than min_clip_duration".to_string(),
            ));
        }
        if self.sync_tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "sync_tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::debug!("Loaded timeline config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a RON string
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: TimelineConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
