// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pixel/second conversion under a zoom factor, plus ruler ticks.

use crate::config::TimelineConfig;

/// Ruler spacing keyed by upper zoom bound (exclusive), in seconds
const TICK_TABLE: [(f64, f64); 3] = [(10.0, 30.0), (30.0, 10.0), (80.0, 5.0)];

/// Spacing used above the last table entry
const FINEST_TICK: f64 = 1.0;

/// Converts between timeline seconds and horizontal pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapper {
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl TimeMapper {
    /// Create a mapper at the configured initial zoom
    pub fn new(config: &TimelineConfig) -> Self {
        let mut mapper = Self {
            zoom: config.initial_zoom,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        };
        mapper.set_zoom(config.initial_zoom);
        mapper
    }

    /// Pixels per second
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set zoom, clamped to the configured range
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    /// Convert a horizontal distance to seconds
    pub fn pixels_to_seconds(&self, px: f64) -> f64 {
        px / self.zoom
    }

    /// Convert seconds to a horizontal distance
    pub fn seconds_to_pixels(&self, seconds: f64) -> f64 {
        seconds * self.zoom
    }

    /// Timeline time of a drop at `local_x` within a lane scrolled by `scroll_left`
    pub fn drop_time(&self, local_x: f64, scroll_left: f64) -> f64 {
        self.pixels_to_seconds(local_x + scroll_left).max(0.0)
    }

    /// Apply one wheel notch; positive delta zooms out
    pub fn zoom_by_wheel(&mut self, delta_y: f64, config: &TimelineConfig) {
        let ratio = if delta_y > 0.0 {
            config.wheel_zoom_out
        } else {
            config.wheel_zoom_in
        };
        self.set_zoom(self.zoom * ratio);
    }

    /// Toolbar zoom-in button
    pub fn zoom_in(&mut self, config: &TimelineConfig) {
        self.set_zoom(self.zoom + config.zoom_button_step);
    }

    /// Toolbar zoom-out button
    pub fn zoom_out(&mut self, config: &TimelineConfig) {
        self.set_zoom(self.zoom - config.zoom_button_step);
    }

    /// Zoom so the whole content (with padding) fits the viewport
    pub fn fit_to_content(&mut self, viewport_width: f64, content_end: f64, config: &TimelineConfig) {
        let span = content_end.max(config.fit_min_span) * config.fit_padding;
        self.set_zoom(viewport_width / span);
    }

    /// Zoom so a first clip of `duration` fills the configured share of the viewport
    pub fn zoom_for_first_clip(&mut self, viewport_width: f64, duration: f64, config: &TimelineConfig) {
        if duration > 0.0 {
            self.set_zoom(viewport_width * config.first_clip_viewport_fraction / duration);
        }
    }

    /// Ruler spacing for the current zoom
    pub fn tick_step(&self) -> f64 {
        tick_step(self.zoom)
    }

    /// Tick times covering `[visible_start, visible_end]`
    pub fn ruler_ticks(&self, visible_start: f64, visible_end: f64) -> Vec<f64> {
        let step = self.tick_step();
        let first = (visible_start.max(0.0) / step).floor() as u64;
        let last = (visible_end.max(0.0) / step).ceil() as u64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Ruler spacing for a zoom level, in seconds
pub fn tick_step(zoom: f64) -> f64 {
    TICK_TABLE
        .iter()
        .find(|(bound, _)| zoom < *bound)
        .map_or(FINEST_TICK, |(_, step)| *step)
}

/// Ruler label, `m:ss` past a minute and `s` below
pub fn format_tick(time: f64) -> String {
    let whole = time.max(0.0) as u64;
    if whole < 60 {
        format!("{whole}s")
    } else {
        format!("{}:{:02}", whole / 60, whole % 60)
    }
}

/// Playhead timecode `HH:MM:SS.cc`
pub fn format_timecode(time: f64) -> String {
    let centis = (time.max(0.0) * 100.0).floor() as u64;
    let (secs, cs) = (centis / 100, centis % 100);
    format!("{:02}:{:02}:{:02}.{:02}", secs / 3600, (secs / 60) % 60, secs % 60, cs)
}
