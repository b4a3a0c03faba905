// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for the timeline.

use crate::clip::{Clip, ClipId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Video lane, drives the main player
    Video,
    /// Audio lane, drives the secondary audio player
    Audio,
    /// Text overlays
    Text,
}

impl TrackKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Text => "Text",
        }
    }

    /// Get the track color
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Video => [96, 165, 250],
            Self::Audio => [52, 211, 153],
            Self::Text => [230, 230, 230],
        }
    }
}

/// How a track reacts to overlapping clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditPolicy {
    /// Clips may overlap freely
    #[default]
    FreeMove,
    /// Later clips are pushed right so no two clips overlap
    Ripple,
}

/// An ordered lane of clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Track kind
    pub kind: TrackKind,
    /// Overlap policy
    pub policy: EditPolicy,
    /// Clips in this track, in insertion order unless rippled
    pub clips: Vec<Clip>,
}

impl Track {
    /// Create a new empty free-move track
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            kind,
            policy: EditPolicy::FreeMove,
            clips: Vec::new(),
        }
    }

    /// Set the overlap policy
    pub fn with_policy(mut self, policy: EditPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether this track ripples
    pub fn is_ripple(&self) -> bool {
        self.policy == EditPolicy::Ripple
    }

    /// Get clip by ID
    pub fn clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    /// Get mutable clip by ID
    pub fn clip_mut(&mut self, clip_id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }

    /// Index of a clip in insertion order
    pub fn position(&self, clip_id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id == clip_id)
    }

    /// Whether the track holds the clip
    pub fn contains(&self, clip_id: ClipId) -> bool {
        self.position(clip_id).is_some()
    }

    /// Remove a clip, returning it
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Option<Clip> {
        let idx = self.position(clip_id)?;
        Some(self.clips.remove(idx))
    }

    /// End of the last clip
    pub fn end(&self) -> f64 {
        self.clips.iter().map(Clip::end).fold(0.0, f64::max)
    }

    /// Clips ordered by start; ties keep insertion order
    pub fn sorted_clips(&self) -> Vec<&Clip> {
        let mut clips: Vec<&Clip> = self.clips.iter().collect();
        clips.sort_by(|a, b| a.start.total_cmp(&b.start));
        clips
    }

    /// Get the clip count
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Get the effective color for this track
    pub fn color(&self) -> [u8; 3] {
        self.kind.color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipKind;

    #[test]
    fn test_sorted_clips_is_stable() {
        let mut track = Track::new("V1", TrackKind::Video);
        let a = Clip::new("a", ClipKind::Video, 5.0, 1.0);
        let b = Clip::new("b", ClipKind::Video, 2.0, 1.0);
        let c = Clip::new("c", ClipKind::Video, 5.0, 1.0);
        let (a_id, c_id) = (a.id, c.id);
        track.clips = vec![a, b, c];

        let sorted = track.sorted_clips();
        assert_eq!(sorted[0].name, "b");
        assert_eq!(sorted[1].id, a_id);
        assert_eq!(sorted[2].id, c_id);
    }

    #[test]
    fn test_remove_and_end() {
        let mut track = Track::new("A1", TrackKind::Audio);
        let clip = Clip::new("a", ClipKind::Audio, 3.0, 4.0);
        let id = clip.id;
        track.clips.push(clip);
        assert_eq!(track.end(), 7.0);

        assert!(track.remove_clip(id).is_some());
        assert!(track.remove_clip(id).is_none());
        assert_eq!(track.end(), 0.0);
    }
}
