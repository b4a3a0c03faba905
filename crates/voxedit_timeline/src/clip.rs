// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip definitions for the timeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of media a clip plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    /// Video file
    Video,
    /// Still image shown for a fixed duration
    Image,
    /// Audio file
    Audio,
    /// Text overlay, has no source media
    Text,
}

impl ClipKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Image => "Image",
            Self::Audio => "Audio",
            Self::Text => "Text",
        }
    }

    /// Whether clips of this kind must reference source media
    pub fn requires_source(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Position and source window of a clip, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipGeometry {
    /// Start on the timeline
    pub start: f64,
    /// Length on the timeline
    pub duration: f64,
    /// Point within the source media where the clip begins
    pub source_offset: f64,
}

impl ClipGeometry {
    /// End on the timeline
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A media or text segment placed on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Display name
    pub name: String,
    /// Start time on the timeline (>= 0)
    pub start: f64,
    /// Duration on the timeline (> 0)
    pub duration: f64,
    /// Offset into the source media (>= 0)
    pub source_offset: f64,
    /// Opaque reference to the source media
    pub source_url: Option<String>,
    /// Media kind
    pub kind: ClipKind,
}

impl Clip {
    /// Create a new clip at `start` playing its source from the beginning
    pub fn new(name: impl Into<String>, kind: ClipKind, start: f64, duration: f64) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            start: start.max(0.0),
            duration,
            source_offset: 0.0,
            source_url: None,
            kind,
        }
    }

    /// Set the source media reference
    pub fn with_source(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Set the source offset
    pub fn with_source_offset(mut self, offset: f64) -> Self {
        self.source_offset = offset.max(0.0);
        self
    }

    /// End time on the timeline
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether `time` falls inside `[start, end)`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end()
    }

    /// Whether `time` falls strictly inside `(start, end)`
    pub fn contains_strictly(&self, time: f64) -> bool {
        time > self.start && time < self.end()
    }

    /// Timeline placement and source window
    pub fn geometry(&self) -> ClipGeometry {
        ClipGeometry {
            start: self.start,
            duration: self.duration,
            source_offset: self.source_offset,
        }
    }

    /// Source interval `[source_offset, source_offset + duration)` this clip plays
    pub fn source_range(&self) -> (f64, f64) {
        (self.source_offset, self.source_offset + self.duration)
    }

    /// Last path segment of the source url, as the render service expects it
    pub fn source_filename(&self) -> String {
        self.source_url
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .unwrap_or_default()
            .to_string()
    }
}

/// Partial update merged into a clip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipPatch {
    /// New start
    pub start: Option<f64>,
    /// New duration
    pub duration: Option<f64>,
    /// New source offset
    pub source_offset: Option<f64>,
    /// New source url
    pub source_url: Option<String>,
    /// New name
    pub name: Option<String>,
}

impl ClipPatch {
    /// Patch that only moves the clip
    pub fn start(start: f64) -> Self {
        Self {
            start: Some(start),
            ..Default::default()
        }
    }

    /// Patch that replaces the whole timeline geometry
    pub fn geometry(geometry: ClipGeometry) -> Self {
        Self {
            start: Some(geometry.start),
            duration: Some(geometry.duration),
            source_offset: Some(geometry.source_offset),
            ..Default::default()
        }
    }

    /// Merge into a clip
    pub fn apply_to(&self, clip: &mut Clip) {
        if let Some(start) = self.start {
            clip.start = start;
        }
        if let Some(duration) = self.duration {
            clip.duration = duration;
        }
        if let Some(offset) = self.source_offset {
            clip.source_offset = offset;
        }
        if let Some(url) = &self.source_url {
            clip.source_url = Some(url.clone());
        }
        if let Some(name) = &self.name {
            clip.name = name.clone();
        }
    }
}
