// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track collection and the model operations that edit it.
//!
//! Every edit borrows the current [`Timeline`] and returns a new one, so a
//! snapshot handed to rendering or playback never changes underneath it.
//! Failed edits return an [`EditError`] and leave the caller's snapshot as is.

use crate::clip::{Clip, ClipId, ClipPatch};
use crate::error::{EditError, Result};
use crate::external::MediaDescriptor;
use crate::track::{EditPolicy, Track, TrackId, TrackKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Suffix appended to clips replaced by an AI edit
const AI_EDIT_SUFFIX: &str = " (AI)";

/// An ordered collection of tracks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    tracks: IndexMap<TrackId, Track>,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timeline from tracks, keeping their order
    pub fn with_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        Self {
            tracks: tracks.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Add a track
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Get all tracks in display order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Total number of clips across all tracks
    pub fn clip_count(&self) -> usize {
        self.tracks.values().map(Track::clip_count).sum()
    }

    /// End of the last clip on any track
    pub fn content_end(&self) -> f64 {
        self.tracks.values().map(Track::end).fold(0.0, f64::max)
    }

    /// First track of the given kind
    pub fn first_track_of_kind(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.values().find(|t| t.kind == kind)
    }

    /// Find a clip and the track holding it
    pub fn find_clip(&self, clip_id: ClipId) -> Option<(&Track, &Clip)> {
        self.tracks
            .values()
            .find_map(|t| t.clip(clip_id).map(|c| (t, c)))
    }

    /// Track holding a clip
    pub fn track_of(&self, clip_id: ClipId) -> Option<TrackId> {
        self.find_clip(clip_id).map(|(t, _)| t.id)
    }

    fn track_mut(&mut self, track_id: TrackId) -> Result<&mut Track> {
        self.tracks
            .get_mut(&track_id)
            .ok_or(EditError::TrackNotFound(track_id))
    }

    /// Build a clip from a dropped descriptor and append it to a track.
    ///
    /// Duration falls back to `default_duration` when the descriptor has none.
    pub fn add_clip(
        &self,
        track_id: TrackId,
        descriptor: &MediaDescriptor,
        start: f64,
        default_duration: f64,
    ) -> Result<(Timeline, ClipId)> {
        let mut next = self.clone();
        let track = next.track_mut(track_id)?;

        let mut clip = Clip::new(
            descriptor.name.clone(),
            descriptor.kind,
            start,
            descriptor.duration_or(default_duration),
        );
        clip.source_url = descriptor.url.clone();
        let id = clip.id;
        track.clips.push(clip);

        Ok((next, id))
    }

    /// Merge a partial update into a clip.
    ///
    /// No clamping happens here; gestures hand over legal geometry.
    pub fn update_clip(&self, track_id: TrackId, clip_id: ClipId, patch: &ClipPatch) -> Result<Timeline> {
        let mut next = self.clone();
        let clip = next
            .track_mut(track_id)?
            .clip_mut(clip_id)
            .ok_or(EditError::ClipNotFound(clip_id))?;
        patch.apply_to(clip);
        Ok(next)
    }

    /// Move a clip to another track at a new start.
    ///
    /// Both tracks are resolved before anything changes, so the clip is never
    /// in both tracks or in neither.
    pub fn move_clip_to_track(
        &self,
        clip_id: ClipId,
        from: TrackId,
        to: TrackId,
        new_start: f64,
    ) -> Result<Timeline> {
        if !self.tracks.contains_key(&to) {
            return Err(EditError::TrackNotFound(to));
        }

        let mut next = self.clone();
        let mut clip = next
            .track_mut(from)?
            .remove_clip(clip_id)
            .ok_or(EditError::ClipNotFound(clip_id))?;
        clip.start = new_start.max(0.0);
        next.track_mut(to)?.clips.push(clip);

        Ok(next)
    }

    /// Cut a clip in two at `split_time`.
    ///
    /// The left half keeps the id; the right half gets a fresh one and
    /// continues the source where the left half stops.
    pub fn split_clip(&self, track_id: TrackId, clip_id: ClipId, split_time: f64) -> Result<(Timeline, ClipId)> {
        let mut next = self.clone();
        let track = next.track_mut(track_id)?;
        let idx = track
            .position(clip_id)
            .ok_or(EditError::ClipNotFound(clip_id))?;

        let original = &track.clips[idx];
        let cut = split_time - original.start;
        if !(cut > 0.0 && cut < original.duration) {
            return Err(EditError::SplitOutOfRange {
                split_time,
                start: original.start,
                end: original.end(),
            });
        }

        let mut right = original.clone();
        right.id = ClipId::new();
        right.start = split_time;
        right.duration = original.duration - cut;
        right.source_offset = original.source_offset + cut;
        let right_id = right.id;

        track.clips[idx].duration = cut;
        track.clips.insert(idx + 1, right);

        Ok((next, right_id))
    }

    /// Remove a clip
    pub fn delete_clip(&self, track_id: TrackId, clip_id: ClipId) -> Result<Timeline> {
        let mut next = self.clone();
        next.track_mut(track_id)?
            .remove_clip(clip_id)
            .ok_or(EditError::ClipNotFound(clip_id))?;
        Ok(next)
    }

    /// Point a clip at newly processed media that starts at offset zero.
    ///
    /// The new duration must be a positive, finite number of seconds.
    pub fn replace_source(&self, clip_id: ClipId, url: impl Into<String>, duration: f64) -> Result<Timeline> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(EditError::InvalidDuration(duration));
        }
        let track_id = self.track_of(clip_id).ok_or(EditError::ClipNotFound(clip_id))?;
        let mut next = self.clone();
        let clip = next
            .track_mut(track_id)?
            .clip_mut(clip_id)
            .ok_or(EditError::ClipNotFound(clip_id))?;

        clip.source_url = Some(url.into());
        clip.source_offset = 0.0;
        clip.duration = duration;
        if !clip.name.ends_with(AI_EDIT_SUFFIX) {
            clip.name.push_str(AI_EDIT_SUFFIX);
        }
        Ok(next)
    }

    /// Replace one track wholesale (used after a ripple sweep)
    pub(crate) fn with_track(&self, track: Track) -> Result<Timeline> {
        let id = track.id;
        let mut next = self.clone();
        *next.track_mut(id)? = track;
        Ok(next)
    }

    /// Default track layout: one video, one text and one audio lane
    pub fn default_layout(policy_for: impl Fn(TrackKind) -> EditPolicy) -> Self {
        Self::with_tracks([
            Track::new("Main Video", TrackKind::Video).with_policy(policy_for(TrackKind::Video)),
            Track::new("Text Overlay", TrackKind::Text).with_policy(policy_for(TrackKind::Text)),
            Track::new("Audio Track", TrackKind::Audio).with_policy(policy_for(TrackKind::Audio)),
        ])
    }
}
