// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer-driven clip editing.
//!
//! A gesture starts on pointer-down over a clip, produces live geometry on
//! every pointer-move without touching the committed timeline, and turns into
//! a single [`Commit`] on release. Only one gesture is active at a time.
//!
//! ## Gestures
//!
//! - Move: slide the clip, optionally onto another track
//! - Trim left: move the head, dropping (never stretching) source media
//! - Trim right: move the tail

use crate::clip::{Clip, ClipGeometry, ClipId, ClipPatch};
use crate::coords::TimeMapper;
use crate::error::{EditError, Result};
use crate::timeline::Timeline;
use crate::track::{Track, TrackId};

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// No gesture
    #[default]
    None,
    /// Dragging a clip body
    Move,
    /// Dragging a clip's left edge
    TrimLeft,
    /// Dragging a clip's right edge
    TrimRight,
}

/// Which part of a clip a pointer-down landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Clip body
    Move,
    /// Left trim handle
    TrimLeft,
    /// Right trim handle
    TrimRight,
}

impl From<GestureKind> for InteractionMode {
    fn from(kind: GestureKind) -> Self {
        match kind {
            GestureKind::Move => Self::Move,
            GestureKind::TrimLeft => Self::TrimLeft,
            GestureKind::TrimRight => Self::TrimRight,
        }
    }
}

/// Classify a pointer-down by its distance to the clip edges.
///
/// Clips too narrow for two full handles keep their middle third as body.
pub fn hit_zone(pointer_x: f64, clip_left: f64, clip_width: f64, edge_hit_px: f64) -> GestureKind {
    let edge = edge_hit_px.min(clip_width / 3.0).max(0.0);
    let local = pointer_x - clip_left;
    if local < edge {
        GestureKind::TrimLeft
    } else if local > clip_width - edge {
        GestureKind::TrimRight
    } else {
        GestureKind::Move
    }
}

/// Live geometry of the clip being dragged, for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveClip {
    /// Clip being edited
    pub clip_id: ClipId,
    /// Track the gesture started on
    pub track_id: TrackId,
    /// Candidate geometry
    pub geometry: ClipGeometry,
}

/// State captured for the lifetime of one gesture
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    kind: GestureKind,
    clip_id: ClipId,
    origin_track: TrackId,
    original: ClipGeometry,
    start_pointer_x: f64,
    head_floor: f64,
    live: ClipGeometry,
}

impl Gesture {
    fn capture(kind: GestureKind, track: &Track, clip: &Clip, pointer_x: f64) -> Self {
        Self {
            kind,
            clip_id: clip.id,
            origin_track: track.id,
            original: clip.geometry(),
            start_pointer_x: pointer_x,
            head_floor: head_floor(track, clip),
            live: clip.geometry(),
        }
    }

    /// Gesture kind
    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    /// Clip being edited
    pub fn clip_id(&self) -> ClipId {
        self.clip_id
    }

    /// Track the gesture started on
    pub fn origin_track(&self) -> TrackId {
        self.origin_track
    }

    /// Geometry when the gesture started
    pub fn original(&self) -> ClipGeometry {
        self.original
    }

    /// Candidate geometry for a pointer at `pointer_x`
    pub fn candidate(&self, pointer_x: f64, mapper: &TimeMapper, min_duration: f64) -> ClipGeometry {
        let delta = mapper.pixels_to_seconds(pointer_x - self.start_pointer_x);
        let o = self.original;

        match self.kind {
            GestureKind::Move => ClipGeometry {
                start: (o.start + delta).max(0.0),
                ..o
            },
            GestureKind::TrimLeft => {
                // The head can only be pulled back as far as the source has media
                let earliest = (o.start - o.source_offset).max(self.head_floor);
                let latest = (o.end() - min_duration).max(earliest);
                let start = (o.start + delta).clamp(earliest, latest);
                let change = start - o.start;
                ClipGeometry {
                    start,
                    duration: o.duration - change,
                    source_offset: (o.source_offset + change).max(0.0),
                }
            }
            GestureKind::TrimRight => ClipGeometry {
                duration: (o.duration + delta).max(min_duration),
                ..o
            },
        }
    }
}

/// Earliest start a trimmed head may reach.
///
/// On ripple tracks this is the end of the preceding clip, so a trim never
/// overlaps its neighbour and the sweep leaves the clip where it was dropped.
fn head_floor(track: &Track, clip: &Clip) -> f64 {
    if !track.is_ripple() {
        return 0.0;
    }
    track
        .clips
        .iter()
        .filter(|c| c.id != clip.id && c.start <= clip.start)
        .map(Clip::end)
        .fold(0.0, f64::max)
        .min(clip.start)
}

/// Edit produced by releasing a gesture
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    /// Same-track move
    Reposition {
        /// Track holding the clip
        track_id: TrackId,
        /// Clip moved
        clip_id: ClipId,
        /// New start
        start: f64,
    },
    /// Move onto another track
    Transfer {
        /// Clip moved
        clip_id: ClipId,
        /// Track the clip leaves
        from: TrackId,
        /// Track the clip joins
        to: TrackId,
        /// New start
        start: f64,
    },
    /// Trim on either edge
    Trim {
        /// Track holding the clip
        track_id: TrackId,
        /// Clip trimmed
        clip_id: ClipId,
        /// Final geometry
        geometry: ClipGeometry,
    },
}

impl Commit {
    /// Clip the commit edits
    pub fn clip_id(&self) -> ClipId {
        match self {
            Self::Reposition { clip_id, .. }
            | Self::Transfer { clip_id, .. }
            | Self::Trim { clip_id, .. } => *clip_id,
        }
    }

    /// Track the clip ends up on
    pub fn target_track(&self) -> TrackId {
        match self {
            Self::Reposition { track_id, .. } | Self::Trim { track_id, .. } => *track_id,
            Self::Transfer { to, .. } => *to,
        }
    }

    /// Reject trims that would leave the clip shorter than `min_duration`
    pub fn validate(&self, min_duration: f64) -> Result<()> {
        match self {
            Self::Trim { geometry, .. } if geometry.duration < min_duration - 1e-9 => {
                Err(EditError::BelowMinimumDuration {
                    duration: geometry.duration,
                    minimum: min_duration,
                })
            }
            _ => Ok(()),
        }
    }

    /// Apply to a timeline snapshot
    pub fn apply(&self, timeline: &Timeline) -> Result<Timeline> {
        match *self {
            Self::Reposition { track_id, clip_id, start } => {
                timeline.update_clip(track_id, clip_id, &ClipPatch::start(start))
            }
            Self::Transfer { clip_id, from, to, start } => {
                timeline.move_clip_to_track(clip_id, from, to, start)
            }
            Self::Trim { track_id, clip_id, geometry } => {
                timeline.update_clip(track_id, clip_id, &ClipPatch::geometry(geometry))
            }
        }
    }
}

/// Single-pointer gesture state machine
#[derive(Debug, Clone, Default)]
pub struct InteractionEngine {
    gesture: Option<Gesture>,
    min_duration: f64,
}

impl InteractionEngine {
    /// Create an idle engine with the given trim floor
    pub fn new(min_duration: f64) -> Self {
        Self {
            gesture: None,
            min_duration,
        }
    }

    /// Current mode
    pub fn mode(&self) -> InteractionMode {
        self.gesture
            .as_ref()
            .map_or(InteractionMode::None, |g| g.kind.into())
    }

    /// Active gesture, if any
    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Whether a gesture is in progress
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Live geometry of the dragged clip
    pub fn live(&self) -> Option<LiveClip> {
        self.gesture.as_ref().map(|g| LiveClip {
            clip_id: g.clip_id,
            track_id: g.origin_track,
            geometry: g.live,
        })
    }

    /// Start a gesture on a clip.
    ///
    /// Ignored while another gesture runs; fails if the clip is gone.
    pub fn pointer_down(
        &mut self,
        timeline: &Timeline,
        track_id: TrackId,
        clip_id: ClipId,
        kind: GestureKind,
        pointer_x: f64,
    ) -> Result<Option<LiveClip>> {
        if self.gesture.is_some() {
            tracing::debug!("Pointer down ignored, gesture already active");
            return Ok(None);
        }

        let track = timeline
            .track(track_id)
            .ok_or(EditError::TrackNotFound(track_id))?;
        let clip = track.clip(clip_id).ok_or(EditError::ClipNotFound(clip_id))?;

        tracing::debug!(?kind, clip = %clip.name, "Gesture started");
        self.gesture = Some(Gesture::capture(kind, track, clip, pointer_x));
        Ok(self.live())
    }

    /// Update the live geometry for a pointer at `pointer_x`
    pub fn pointer_move(&mut self, pointer_x: f64, mapper: &TimeMapper) -> Option<LiveClip> {
        let min_duration = self.min_duration;
        let gesture = self.gesture.as_mut()?;
        gesture.live = gesture.candidate(pointer_x, mapper, min_duration);
        self.live()
    }

    /// Finish the gesture and produce the edit to commit.
    ///
    /// `drop_track` is the track under the pointer, if any. A move released
    /// over no track, or over its own track, stays on the origin track. A trim
    /// released where it started commits nothing.
    pub fn pointer_up(
        &mut self,
        pointer_x: f64,
        drop_track: Option<TrackId>,
        mapper: &TimeMapper,
    ) -> Option<Commit> {
        let gesture = self.gesture.take()?;
        if gesture.kind != GestureKind::Move && pointer_x == gesture.start_pointer_x {
            tracing::debug!(kind = ?gesture.kind, "Trim released without movement");
            return None;
        }
        let geometry = gesture.candidate(pointer_x, mapper, self.min_duration);

        let commit = match gesture.kind {
            GestureKind::Move => match drop_track {
                Some(to) if to != gesture.origin_track => Commit::Transfer {
                    clip_id: gesture.clip_id,
                    from: gesture.origin_track,
                    to,
                    start: geometry.start,
                },
                _ => Commit::Reposition {
                    track_id: gesture.origin_track,
                    clip_id: gesture.clip_id,
                    start: geometry.start,
                },
            },
            GestureKind::TrimLeft | GestureKind::TrimRight => Commit::Trim {
                track_id: gesture.origin_track,
                clip_id: gesture.clip_id,
                geometry,
            },
        };

        tracing::debug!(?commit, "Gesture released");
        Some(commit)
    }

    /// Abandon the gesture without committing
    pub fn cancel(&mut self) {
        if self.gesture.take().is_some() {
            tracing::debug!("Gesture cancelled");
        }
    }
}
