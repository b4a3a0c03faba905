// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback: the transport, clip-to-player synchronization and the gap clock.
//!
//! The timeline owns the global time. While a clip with media sits under the
//! playhead, the media player is authoritative and its progress is mapped back
//! into timeline time. Over a gap there is nothing to play, so a wall-clock
//! [`GapClock`] advances the time instead.
//!
//! Time mapping for a clip starting at `clip_start` that plays its source from
//! `source_offset`:
//!
//! ```text
//! local  = max(0, global - clip_start + source_offset)
//! global = local - source_offset + clip_start
//! ```

use crate::clip::{Clip, ClipId};
use crate::track::Track;
use std::time::Instant;

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    /// Global playhead time in seconds
    pub current_time: f64,
    /// Whether playback is running
    pub is_playing: bool,
}

impl PlaybackState {
    /// Create a stopped transport at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playback
    pub fn play(&mut self) {
        self.is_playing = true;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Toggle play/pause
    pub fn toggle(&mut self) {
        self.is_playing = !self.is_playing;
    }

    /// Move the playhead; negative times clamp to zero
    pub fn seek(&mut self, time: f64) {
        if time.is_finite() {
            self.current_time = time.max(0.0);
        }
    }

    /// Advance the playhead by a measured delta
    pub fn advance(&mut self, delta: f64) {
        self.seek(self.current_time + delta);
    }
}

/// The media clip under the playhead
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveClip {
    /// Clip being played
    pub clip_id: ClipId,
    /// Source media reference
    pub source_url: String,
    /// Clip start on the timeline
    pub clip_start: f64,
    /// Offset into the source
    pub source_offset: f64,
}

impl ActiveClip {
    fn from_clip(clip: &Clip) -> Option<Self> {
        Some(Self {
            clip_id: clip.id,
            source_url: clip.source_url.clone()?,
            clip_start: clip.start,
            source_offset: clip.source_offset,
        })
    }

    /// Clip with media covering `time` on a track.
    ///
    /// On overlapping free-move tracks the clip added last wins, matching the
    /// one drawn on top.
    pub fn resolve(track: &Track, time: f64) -> Option<Self> {
        track
            .clips
            .iter()
            .rev()
            .find(|c| c.contains(time) && c.source_url.is_some())
            .and_then(Self::from_clip)
    }

    /// Player-local time for a global time
    pub fn local_time(&self, global: f64) -> f64 {
        (global - self.clip_start + self.source_offset).max(0.0)
    }

    /// Global time for a player-local time
    pub fn global_time(&self, local: f64) -> f64 {
        local - self.source_offset + self.clip_start
    }
}

/// Result of evaluating which source a player should show
#[derive(Debug, Clone, PartialEq)]
pub struct SyncTarget {
    /// Source to play; `None` renders black/silence
    pub active: Option<ActiveClip>,
    /// Whether the source differs from the previous evaluation
    pub changed: bool,
}

impl SyncTarget {
    /// Url to load, if any
    pub fn source_url(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.source_url.as_str())
    }
}

/// Media element seam driven by [`PlaybackSync`]
pub trait MediaPlayer {
    /// Load a new source, or unload with `None`
    fn load(&mut self, url: Option<&str>);
    /// Current position within the loaded source
    fn position(&self) -> f64;
    /// Jump to a source-local position
    fn seek(&mut self, local: f64);
    /// Start playing
    fn play(&mut self);
    /// Pause
    fn pause(&mut self);
    /// Whether the element is paused
    fn is_paused(&self) -> bool;
}

/// Keeps one media player in step with the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSync {
    tolerance: f64,
    active: Option<ActiveClip>,
}

impl PlaybackSync {
    /// Create a synchronizer that seeks once drift exceeds `tolerance` seconds
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            active: None,
        }
    }

    /// Source currently bound to the player
    pub fn active(&self) -> Option<&ActiveClip> {
        self.active.as_ref()
    }

    /// Whether a source is bound
    pub fn has_source(&self) -> bool {
        self.active.is_some()
    }

    /// Resolve the source for `time` on `track` and record it.
    ///
    /// A change means a different clip, url, start or offset, so edits to the
    /// active clip also rebind the player.
    pub fn evaluate(&mut self, track: Option<&Track>, time: f64) -> SyncTarget {
        let active = track.and_then(|t| ActiveClip::resolve(t, time));
        let changed = active != self.active;
        if changed {
            tracing::debug!(
                source = ?active.as_ref().map(|a| a.source_url.as_str()),
                time,
                "Player source changed"
            );
            self.active = active.clone();
        }
        SyncTarget { active, changed }
    }

    /// Forget the bound source so the next evaluation reloads it
    pub fn repoint(&mut self) {
        self.active = None;
    }

    /// Seek position if the player drifted more than the tolerance
    pub fn seek_target(&self, time: f64, player_local: f64) -> Option<f64> {
        let active = self.active.as_ref()?;
        let local = active.local_time(time);
        ((local - player_local).abs() > self.tolerance).then_some(local)
    }

    /// Timeline time reported by a playing player
    pub fn progress(&self, player_local: f64, is_playing: bool) -> Option<f64> {
        if !is_playing {
            return None;
        }
        self.active.as_ref().map(|a| a.global_time(player_local))
    }

    /// Bring `player` in line with the timeline at `time`
    pub fn drive<P: MediaPlayer + ?Sized>(
        &mut self,
        player: &mut P,
        track: Option<&Track>,
        time: f64,
        is_playing: bool,
    ) -> SyncTarget {
        let target = self.evaluate(track, time);
        if target.changed {
            player.load(target.source_url());
        }

        if target.active.is_none() {
            if !player.is_paused() {
                player.pause();
            }
            return target;
        }

        if let Some(local) = self.seek_target(time, player.position()) {
            tracing::debug!(local, "Seeking player");
            player.seek(local);
        }

        if is_playing && player.is_paused() {
            player.play();
        } else if !is_playing && !player.is_paused() {
            player.pause();
        }
        target
    }
}

/// Wall-clock ticker that advances the playhead across gaps.
///
/// Runs only while playing with no active source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapClock {
    last: Option<Instant>,
}

impl GapClock {
    /// Create a stopped clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or stop the clock for the current transport state
    pub fn sync(&mut self, is_playing: bool, has_source: bool, now: Instant) {
        let should_run = is_playing && !has_source;
        match (should_run, self.last.is_some()) {
            (true, false) => {
                tracing::debug!("Gap clock started");
                self.last = Some(now);
            }
            (false, true) => self.cancel(),
            _ => {}
        }
    }

    /// Seconds elapsed since the previous tick, while running
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        let last = self.last?;
        self.last = Some(now);
        Some(now.saturating_duration_since(last).as_secs_f64())
    }

    /// Whether the clock is running
    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }

    /// Stop the clock
    pub fn cancel(&mut self) {
        if self.last.take().is_some() {
            tracing::debug!("Gap clock stopped");
        }
    }
}
