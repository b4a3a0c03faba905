// SPDX-License-Identifier: MIT OR Apache-2.0
//! Overlap resolution for ripple tracks.
//!
//! After an edit lands on a [`EditPolicy::Ripple`](crate::track::EditPolicy)
//! track, clips are ordered by start and every clip that begins before its
//! predecessor ends is pushed right to that end. Clips that already sit past a
//! gap keep their position.

use crate::error::{EditError, Result};
use crate::timeline::Timeline;
use crate::track::{Track, TrackId};

/// Sort a track's clips by start and push overlapping clips right.
///
/// Ties keep their previous relative order. Free-move tracks are returned
/// unchanged.
pub fn ripple(track: &Track) -> Track {
    let mut next = track.clone();
    if !track.is_ripple() {
        return next;
    }

    // Vec::sort_by is stable
    next.clips.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut cursor = f64::NEG_INFINITY;
    let mut pushed = 0usize;
    for clip in &mut next.clips {
        if clip.start < cursor {
            clip.start = cursor;
            pushed += 1;
        }
        cursor = clip.end();
    }

    if pushed > 0 {
        tracing::debug!(track = %track.name, pushed, "Rippled track");
    }
    next
}

/// Ripple one track of a timeline, if it uses the ripple policy
pub fn apply_ripple(timeline: &Timeline, track_id: TrackId) -> Result<Timeline> {
    match timeline.track(track_id) {
        Some(track) if track.is_ripple() => timeline.with_track(ripple(track)),
        Some(_) => Ok(timeline.clone()),
        None => Err(EditError::TrackNotFound(track_id)),
    }
}

/// Whether no two clips on the track overlap
pub fn is_non_overlapping(track: &Track) -> bool {
    track
        .sorted_clips()
        .windows(2)
        .all(|pair| pair[0].end() <= pair[1].start + 1e-9)
}
