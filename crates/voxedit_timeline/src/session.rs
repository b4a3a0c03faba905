// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor session: the single owner of timeline state.
//!
//! Every user or player event enters through one `&mut self` handler. A
//! handler computes the next [`Timeline`] with the pure model operations and
//! swaps it in whole, so renderers and synchronizers always see a consistent
//! snapshot. Rejected edits are logged and leave the current snapshot alone.

use crate::clip::ClipId;
use crate::config::TimelineConfig;
use crate::coords::TimeMapper;
use crate::error::{Result, ServiceError};
use crate::external::{EditCommand, EditRequest, EditResponse, ExportRequest, ExportResponse, MediaDescriptor};
use crate::interaction::{hit_zone, InteractionEngine, LiveClip};
use crate::keyboard::{KeyCommand, KeyInput};
use crate::playback::{ActiveClip, GapClock, MediaPlayer, PlaybackState, PlaybackSync};
use crate::ripple::apply_ripple;
use crate::selection::Selection;
use crate::timeline::Timeline;
use crate::track::{Track, TrackId, TrackKind};
use std::time::Instant;

/// State of one editing session
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: TimelineConfig,
    timeline: Timeline,
    mapper: TimeMapper,
    selection: Selection,
    interaction: InteractionEngine,
    playback: PlaybackState,
    video_sync: PlaybackSync,
    audio_sync: PlaybackSync,
    gap_clock: GapClock,
}

impl EditorSession {
    /// Create a session with the default track layout
    pub fn new(config: TimelineConfig) -> Self {
        let timeline = Timeline::default_layout(|kind| config.policy_for(kind));
        Self::with_timeline(config, timeline)
    }

    /// Create a session around an existing timeline
    pub fn with_timeline(config: TimelineConfig, timeline: Timeline) -> Self {
        tracing::info!(
            tracks = timeline.track_count(),
            clips = timeline.clip_count(),
            "Editor session started"
        );
        Self {
            mapper: TimeMapper::new(&config),
            interaction: InteractionEngine::new(config.min_clip_duration),
            video_sync: PlaybackSync::new(config.sync_tolerance),
            audio_sync: PlaybackSync::new(config.sync_tolerance),
            selection: Selection::new(),
            playback: PlaybackState::new(),
            gap_clock: GapClock::new(),
            timeline,
            config,
        }
    }

    /// Configuration
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Current timeline snapshot
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Coordinate mapper
    pub fn mapper(&self) -> &TimeMapper {
        &self.mapper
    }

    /// Selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Gesture engine
    pub fn interaction(&self) -> &InteractionEngine {
        &self.interaction
    }

    /// Transport
    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    /// Playhead time
    pub fn current_time(&self) -> f64 {
        self.playback.current_time
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing
    }

    /// Synchronizer of the main video player
    pub fn video_sync(&self) -> &PlaybackSync {
        &self.video_sync
    }

    /// Synchronizer of the audio player
    pub fn audio_sync(&self) -> &PlaybackSync {
        &self.audio_sync
    }

    /// Whether the gap clock is advancing the playhead
    pub fn gap_clock_running(&self) -> bool {
        self.gap_clock.is_running()
    }

    /// Track driving the main player
    pub fn video_track(&self) -> Option<&Track> {
        self.timeline.first_track_of_kind(TrackKind::Video)
    }

    /// Track driving the audio player
    pub fn audio_track(&self) -> Option<&Track> {
        self.timeline.first_track_of_kind(TrackKind::Audio)
    }

    /// Swap in an edited timeline, rippling `track_id` when it asks for it.
    ///
    /// Returns whether the edit took effect.
    fn commit(&mut self, edit: &str, result: Result<Timeline>, track_id: Option<TrackId>) -> bool {
        let next = result.and_then(|timeline| match track_id {
            Some(id) => apply_ripple(&timeline, id),
            None => Ok(timeline),
        });

        match next {
            Ok(timeline) => {
                self.timeline = timeline;
                self.selection.retain_existing(&self.timeline);
                true
            }
            Err(err) => {
                tracing::debug!(edit, %err, "Edit rejected");
                false
            }
        }
    }

    // --- Zoom ---

    /// Toolbar zoom in
    pub fn zoom_in(&mut self) {
        self.mapper.zoom_in(&self.config);
    }

    /// Toolbar zoom out
    pub fn zoom_out(&mut self) {
        self.mapper.zoom_out(&self.config);
    }

    /// Wheel zoom; positive delta zooms out
    pub fn wheel_zoom(&mut self, delta_y: f64) {
        self.mapper.zoom_by_wheel(delta_y, &self.config);
    }

    /// Zoom so every clip fits in `viewport_width`
    pub fn fit_to_content(&mut self, viewport_width: f64) {
        self.mapper
            .fit_to_content(viewport_width, self.timeline.content_end(), &self.config);
    }

    // --- Media drop ---

    /// Place dropped library media on a track.
    ///
    /// `local_x` is relative to the lane's visible left edge. The first clip
    /// dropped on an empty timeline also sets the zoom so it fills a third of
    /// the viewport. The new clip becomes the selection and the playhead
    /// moves to it.
    pub fn drop_media(
        &mut self,
        track_id: TrackId,
        payload: &str,
        local_x: f64,
        scroll_left: f64,
        viewport_width: f64,
    ) -> Option<ClipId> {
        let descriptor = match MediaDescriptor::from_json(payload) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::warn!(%err, "Ignoring media drop");
                return None;
            }
        };

        let time = self.mapper.drop_time(local_x, scroll_left);
        let was_empty = self.timeline.clip_count() == 0;

        let (next, clip_id) = match self.timeline.add_clip(
            track_id,
            &descriptor,
            time,
            self.config.default_clip_duration,
        ) {
            Ok(added) => added,
            Err(err) => {
                tracing::debug!(%err, "Media drop rejected");
                return None;
            }
        };
        if !self.commit("add", Ok(next), Some(track_id)) {
            return None;
        }

        if was_empty {
            let duration = descriptor.duration_or(self.config.default_clip_duration);
            self.mapper
                .zoom_for_first_clip(viewport_width, duration, &self.config);
        }

        tracing::info!(name = %descriptor.name, time, "Clip added");
        self.selection.select(Some(clip_id));
        self.playback.seek(time);
        Some(clip_id)
    }

    // --- Gestures ---

    /// Press on a clip at content-space `pointer_x`.
    ///
    /// Selects the clip and starts a move or trim depending on where the
    /// press landed.
    pub fn pointer_down(&mut self, track_id: TrackId, clip_id: ClipId, pointer_x: f64) -> Option<LiveClip> {
        let Some(clip) = self.timeline.track(track_id).and_then(|t| t.clip(clip_id)) else {
            tracing::debug!(?clip_id, "Pointer down on a missing clip");
            return None;
        };

        let left = self.mapper.seconds_to_pixels(clip.start);
        let width = self.mapper.seconds_to_pixels(clip.duration);
        let kind = hit_zone(pointer_x, left, width, self.config.edge_hit_px);

        self.selection.select(Some(clip_id));
        match self
            .interaction
            .pointer_down(&self.timeline, track_id, clip_id, kind, pointer_x)
        {
            Ok(live) => live,
            Err(err) => {
                tracing::debug!(%err, "Gesture not started");
                None
            }
        }
    }

    /// Pointer moved while a gesture may be active
    pub fn pointer_move(&mut self, pointer_x: f64) -> Option<LiveClip> {
        self.interaction.pointer_move(pointer_x, &self.mapper)
    }

    /// Release the pointer over `drop_track` (if any) and commit the gesture
    pub fn pointer_up(&mut self, pointer_x: f64, drop_track: Option<TrackId>) -> bool {
        let Some(commit) = self.interaction.pointer_up(pointer_x, drop_track, &self.mapper) else {
            return false;
        };

        let result = commit
            .validate(self.config.min_clip_duration)
            .and_then(|()| commit.apply(&self.timeline));
        self.commit("gesture", result, Some(commit.target_track()))
    }

    /// Abandon the active gesture
    pub fn cancel_gesture(&mut self) {
        self.interaction.cancel();
    }

    // --- Selection and commands ---

    /// Select a clip, or clear with `None`
    pub fn select(&mut self, clip_id: Option<ClipId>) {
        self.selection.select(clip_id);
    }

    /// Click on empty lane space: deselect and move the playhead there
    pub fn click_empty(&mut self, pointer_x: f64) {
        self.selection.clear();
        self.seek(self.mapper.pixels_to_seconds(pointer_x));
    }

    /// Handle a key press, returning the command it ran
    pub fn key(&mut self, input: KeyInput) -> Option<KeyCommand> {
        let command = input.command()?;
        match command {
            KeyCommand::DeleteSelected => {
                self.delete_selected();
            }
            KeyCommand::SplitAtPlayhead => {
                self.split_at_playhead();
            }
            KeyCommand::TogglePlayback => self.toggle_playback(),
            KeyCommand::SeekStart => self.seek(0.0),
        }
        Some(command)
    }

    /// Delete the selected clip
    pub fn delete_selected(&mut self) -> bool {
        let Some(clip_id) = self.selection.clip() else {
            return false;
        };
        let Some(track_id) = self.timeline.track_of(clip_id) else {
            self.selection.clear();
            return false;
        };

        let result = self.timeline.delete_clip(track_id, clip_id);
        let deleted = self.commit("delete", result, None);
        if deleted {
            tracing::info!(?clip_id, "Clip deleted");
            self.selection.clear();
        }
        deleted
    }

    /// Split the selected clip at the playhead, returning the new right half
    pub fn split_at_playhead(&mut self) -> Option<ClipId> {
        let clip_id = self.selection.clip()?;
        let track_id = self.timeline.track_of(clip_id)?;
        let time = self.playback.current_time;

        let (next, right) = match self.timeline.split_clip(track_id, clip_id, time) {
            Ok(split) => split,
            Err(err) => {
                tracing::debug!(%err, "Split skipped");
                return None;
            }
        };
        if !self.commit("split", Ok(next), None) {
            return None;
        }

        tracing::info!(?clip_id, time, "Clip split");
        self.selection.clear();
        Some(right)
    }

    // --- Transport ---

    /// Move the playhead
    pub fn seek(&mut self, time: f64) {
        self.playback.seek(time);
    }

    /// Start or stop playback
    pub fn set_playing(&mut self, playing: bool) {
        if playing {
            self.playback.play();
        } else {
            self.playback.pause();
            self.gap_clock.cancel();
        }
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self) {
        self.set_playing(!self.playback.is_playing);
    }

    /// Frame tick: run the gap clock when nothing is under the playhead.
    ///
    /// Returns the playhead time after the tick.
    pub fn tick(&mut self, now: Instant) -> f64 {
        let has_source = self
            .video_track()
            .and_then(|t| ActiveClip::resolve(t, self.playback.current_time))
            .is_some();

        self.gap_clock.sync(self.playback.is_playing, has_source, now);
        if let Some(delta) = self.gap_clock.tick(now) {
            self.playback.advance(delta);
        }
        self.playback.current_time
    }

    /// Progress reported by the video player while playing
    pub fn player_progress(&mut self, player_local: f64) {
        if let Some(time) = self
            .video_sync
            .progress(player_local, self.playback.is_playing)
        {
            self.playback.seek(time);
        }
    }

    /// Bring both players in line with the playhead
    pub fn drive_players(&mut self, video: &mut dyn MediaPlayer, audio: &mut dyn MediaPlayer) {
        let time = self.playback.current_time;
        let playing = self.playback.is_playing;

        let video_track = self.timeline.first_track_of_kind(TrackKind::Video);
        self.video_sync.drive(video, video_track, time, playing);

        let audio_track = self.timeline.first_track_of_kind(TrackKind::Audio);
        self.audio_sync.drive(audio, audio_track, time, playing);
    }

    // --- External services ---

    /// Build an AI edit request for the selected clip
    pub fn edit_request(&self, command: EditCommand) -> std::result::Result<EditRequest, ServiceError> {
        let (_, clip) = self
            .selection
            .clip()
            .and_then(|id| self.timeline.find_clip(id))
            .ok_or(ServiceError::NoEditableSelection)?;
        EditRequest::for_clip(clip, command)
    }

    /// Apply the AI edit collaborator's answer to the selected clip.
    ///
    /// Returns the collaborator's reply text, if any.
    pub fn apply_edit_result(
        &mut self,
        result: std::result::Result<EditResponse, ServiceError>,
    ) -> std::result::Result<Option<String>, ServiceError> {
        let response = result.map_err(|err| {
            tracing::warn!(%err, "AI edit failed");
            err
        })?;

        let (track_id, clip_id) = self
            .selection
            .clip()
            .and_then(|id| self.timeline.find_clip(id))
            .filter(|(_, clip)| clip.kind.requires_source())
            .map(|(track, clip)| (track.id, clip.id))
            .ok_or(ServiceError::NoEditableSelection)?;

        let replaced = self
            .timeline
            .replace_source(clip_id, response.processed_url.as_str(), response.new_duration)
            .map_err(|err| {
                tracing::warn!(%err, "AI edit returned unusable media");
                ServiceError::failure("edit", err.to_string())
            })?;
        if !self.commit("replace source", Ok(replaced), Some(track_id)) {
            return Err(ServiceError::NoEditableSelection);
        }

        tracing::info!(url = %response.processed_url, "Clip replaced by AI edit");
        self.video_sync.repoint();
        Ok(response.reply)
    }

    /// Project the video track for the render service
    pub fn export_request(&self) -> std::result::Result<ExportRequest, ServiceError> {
        let request = ExportRequest::from_timeline(&self.timeline)?;
        tracing::info!(clips = request.clips.len(), "Export requested");
        Ok(request)
    }

    /// Interpret the render service's answer
    pub fn apply_export_result(
        &self,
        response: std::result::Result<ExportResponse, ServiceError>,
    ) -> std::result::Result<String, ServiceError> {
        match response.and_then(ExportResponse::into_result) {
            Ok(url) => {
                tracing::info!(%url, "Export finished");
                Ok(url)
            }
            Err(err) => {
                tracing::warn!(%err, "Export failed");
                Err(err)
            }
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{Clip, ClipKind};
    use crate::keyboard::Key;
    use crate::ripple::is_non_overlapping;
    use crate::track::EditPolicy;
    use std::time::Duration;

    const VIEWPORT: f64 = 1200.0;

    fn payload(name: &str, duration: f64) -> String {
        format!(r#"{{"name":"{name}","type":"video","url":"http://localhost:8000/files/{name}.mp4","duration":{duration}}}"#)
    }

    fn video_id(session: &EditorSession) -> TrackId {
        session.video_track().unwrap().id
    }

    /// Drop at timeline `time` with the current zoom
    fn drop_at(session: &mut EditorSession, track: TrackId, name: &str, duration: f64, time: f64) -> ClipId {
        let x = session.mapper().seconds_to_pixels(time);
        session.drop_media(track, &payload(name, duration), x, 0.0, VIEWPORT).unwrap()
    }

    #[test]
    fn test_default_layout() {
        let session = EditorSession::default();
        let kinds: Vec<_> = session.timeline().tracks().map(|t| t.kind).collect();
        assert_eq!(kinds, [TrackKind::Video, TrackKind::Text, TrackKind::Audio]);
        assert!(session.video_track().unwrap().is_ripple());
        assert!(!session.audio_track().unwrap().is_ripple());
    }

    #[test]
    fn test_first_drop_zooms_to_a_third() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let clip = session.drop_media(v1, &payload("a", 8.0), 0.0, 0.0, VIEWPORT).unwrap();

        assert!((session.mapper().zoom() - VIEWPORT / 24.0).abs() < 1e-9);
        assert_eq!(session.selection().clip(), Some(clip));
        assert_eq!(session.current_time(), 0.0);

        // Later drops leave the zoom alone
        let zoom = session.mapper().zoom();
        drop_at(&mut session, v1, "b", 2.0, 20.0);
        assert_eq!(session.mapper().zoom(), zoom);
    }

    #[test]
    fn test_drop_without_duration_uses_default() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let json = r#"{"name":"still","type":"image","url":"http://h/files/still.png"}"#;
        let clip = session.drop_media(v1, json, 90.0, 30.0, VIEWPORT).unwrap();

        let (_, clip) = session.timeline().find_clip(clip).unwrap();
        assert_eq!(clip.duration, 10.0);
        // Initial zoom is 30 px/s
        assert_eq!(clip.start, 4.0);
    }

    #[test]
    fn test_malformed_drop_ignored() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let before = session.timeline().clone();
        assert!(session.drop_media(v1, "{oops", 0.0, 0.0, VIEWPORT).is_none());
        assert!(session.drop_media(TrackId::new(), &payload("a", 1.0), 0.0, 0.0, VIEWPORT).is_none());
        assert_eq!(session.timeline(), &before);
    }

    #[test]
    fn test_drop_onto_ripple_track_pushes() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a = drop_at(&mut session, v1, "a", 5.0, 0.0);
        let b = drop_at(&mut session, v1, "b", 3.0, 2.0);

        let track = session.video_track().unwrap();
        assert!(is_non_overlapping(track));
        assert_eq!(track.clip(a).unwrap().start, 0.0);
        assert!((track.clip(b).unwrap().start - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_and_delete() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let x = drop_at(&mut session, v1, "x", 4.0, 0.0);

        session.select(Some(x));
        assert_eq!(session.key(KeyInput::plain(Key::Delete)), Some(KeyCommand::DeleteSelected));
        assert!(session.timeline().find_clip(x).is_none());
        assert!(session.selection().is_empty());

        // Nothing selected: no-op
        assert!(!session.delete_selected());
    }

    #[test]
    fn test_keys_ignored_in_text_entry() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let x = drop_at(&mut session, v1, "x", 4.0, 0.0);
        assert_eq!(session.key(KeyInput::plain(Key::Backspace).in_text_entry()), None);
        assert!(session.timeline().find_clip(x).is_some());
    }

    #[test]
    fn test_split_at_playhead() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a = drop_at(&mut session, v1, "a", 10.0, 0.0);

        session.seek(4.0);
        session.select(Some(a));
        session.key(KeyInput::plain(Key::Char('c')));

        let track = session.video_track().unwrap();
        assert_eq!(track.clip_count(), 2);
        let left = track.clip(a).unwrap();
        let right = &track.clips[1];
        assert_eq!((left.start, left.duration), (0.0, 4.0));
        assert_eq!((right.start, right.duration, right.source_offset), (4.0, 6.0, 4.0));
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_split_outside_clip_is_noop() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a = drop_at(&mut session, v1, "a", 10.0, 0.0);

        session.select(Some(a));
        session.seek(0.0);
        assert!(session.split_at_playhead().is_none());
        session.seek(10.0);
        assert!(session.split_at_playhead().is_none());
        assert_eq!(session.video_track().unwrap().clip_count(), 1);
        assert!(session.selection().is_selected(a));
    }

    #[test]
    fn test_drag_move_and_ripple() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a = drop_at(&mut session, v1, "a", 4.0, 0.0);
        let b = drop_at(&mut session, v1, "b", 4.0, 10.0);
        let zoom = session.mapper().zoom();

        // Grab the middle of "b" and drag it two seconds into "a"
        let grab = zoom * 12.0;
        session.pointer_down(v1, b, grab).unwrap();
        session.pointer_move(grab - zoom * 8.0);
        assert!(session.pointer_up(grab - zoom * 8.0, Some(v1)));

        let track = session.video_track().unwrap();
        assert!(is_non_overlapping(track));
        assert_eq!(track.clip(a).unwrap().start, 0.0);
        assert!((track.clip(b).unwrap().start - 4.0).abs() < 1e-9);
        assert!(session.selection().is_selected(b));
    }

    #[test]
    fn test_drag_to_audio_track() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a1 = session.audio_track().unwrap().id;
        let a = drop_at(&mut session, v1, "a", 4.0, 0.0);
        let zoom = session.mapper().zoom();

        session.pointer_down(v1, a, zoom * 2.0).unwrap();
        assert!(session.pointer_up(zoom * 3.0, Some(a1)));
        assert_eq!(session.timeline().track_of(a), Some(a1));
        assert!((session.timeline().find_clip(a).unwrap().1.start - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_from_audio_onto_ripple_track() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a1 = session.audio_track().unwrap().id;
        let a = drop_at(&mut session, v1, "a", 4.0, 0.0);
        let json = r#"{"name":"music","type":"audio","url":"http://h/files/music.mp3","duration":4}"#;
        let x = session.mapper().seconds_to_pixels(10.0);
        let music = session.drop_media(a1, json, x, 0.0, VIEWPORT).unwrap();
        let zoom = session.mapper().zoom();

        // Grab the middle of the music clip and land it two seconds into "a"
        let grab = zoom * 12.0;
        session.pointer_down(a1, music, grab).unwrap();
        session.pointer_move(grab - zoom * 8.0);
        assert!(session.pointer_up(grab - zoom * 8.0, Some(v1)));

        assert_eq!(session.timeline().track_of(music), Some(v1));
        assert_eq!(session.audio_track().unwrap().clip_count(), 0);
        let track = session.video_track().unwrap();
        assert!(is_non_overlapping(track));
        assert_eq!(track.clip(a).unwrap().start, 0.0);
        assert!((track.clip(music).unwrap().start - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_trim_left_on_ripple_track_keeps_tail() {
        let mut v1 = Track::new("Main Video", TrackKind::Video).with_policy(EditPolicy::Ripple);
        let a = Clip::new("a", ClipKind::Video, 0.0, 4.0).with_source("http://h/files/a.mp4");
        let b = Clip::new("b", ClipKind::Video, 6.0, 4.0)
            .with_source("http://h/files/b.mp4")
            .with_source_offset(5.0);
        let c = Clip::new("c", ClipKind::Video, 12.0, 2.0).with_source("http://h/files/c.mp4");
        let ids = (v1.id, a.id, b.id, c.id);
        v1.clips.extend([a, b, c]);
        let (v1_id, a, b, c) = ids;
        let mut session = EditorSession::with_timeline(TimelineConfig::default(), Timeline::with_tracks([v1]));
        let zoom = session.mapper().zoom();

        // Pull b's head four seconds left; its source has five seconds to spare
        let edge = zoom * 6.0 + 2.0;
        session.pointer_down(v1_id, b, edge).unwrap();
        assert_eq!(session.interaction().mode(), crate::interaction::InteractionMode::TrimLeft);
        assert!(session.pointer_up(edge - zoom * 4.0, Some(v1_id)));

        let track = session.timeline().track(v1_id).unwrap();
        assert!(is_non_overlapping(track));
        let trimmed = track.clip(b).unwrap();
        assert!((trimmed.start - 4.0).abs() < 1e-9);
        assert!((trimmed.end() - 10.0).abs() < 1e-9);
        assert!((trimmed.source_offset - 3.0).abs() < 1e-9);
        assert_eq!(track.clip(a).unwrap().start, 0.0);
        assert_eq!(track.clip(c).unwrap().start, 12.0);
    }

    #[test]
    fn test_trim_commit() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a = drop_at(&mut session, v1, "a", 4.0, 0.0);
        let zoom = session.mapper().zoom();

        // Right edge handle
        let edge = zoom * 4.0 - 2.0;
        session.pointer_down(v1, a, edge).unwrap();
        assert_eq!(session.interaction().mode(), crate::interaction::InteractionMode::TrimRight);
        session.pointer_up(edge - zoom * 100.0, Some(v1));

        let clip = session.timeline().find_clip(a).unwrap().1;
        assert!((clip.duration - session.config().min_clip_duration).abs() < 1e-9);
    }

    #[test]
    fn test_gesture_on_deleted_clip() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a = drop_at(&mut session, v1, "a", 4.0, 0.0);
        let zoom = session.mapper().zoom();

        session.pointer_down(v1, a, zoom * 2.0).unwrap();
        session.delete_selected();
        let before = session.timeline().clone();
        assert!(!session.pointer_up(zoom * 3.0, Some(v1)));
        assert_eq!(session.timeline(), &before);
    }

    #[test]
    fn test_gap_clock_past_last_clip() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        drop_at(&mut session, v1, "a", 5.0, 0.0);

        session.seek(12.0);
        session.set_playing(true);
        let t0 = Instant::now();
        session.tick(t0);
        assert!(session.gap_clock_running());

        let time = session.tick(t0 + Duration::from_millis(250));
        assert!((time - 12.25).abs() < 1e-9);
        let time = session.tick(t0 + Duration::from_millis(400));
        assert!((time - 12.4).abs() < 1e-9);

        session.set_playing(false);
        assert!(!session.gap_clock_running());
        assert!((session.tick(t0 + Duration::from_secs(2)) - 12.4).abs() < 1e-9);
    }

    #[test]
    fn test_gap_clock_stops_on_source() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        drop_at(&mut session, v1, "a", 5.0, 1.0);

        session.seek(0.5);
        session.set_playing(true);
        let t0 = Instant::now();
        session.tick(t0);
        session.tick(t0 + Duration::from_millis(600));
        assert!(session.current_time() >= 1.0);

        // Playhead is inside the clip now
        session.tick(t0 + Duration::from_millis(700));
        assert!(!session.gap_clock_running());
    }

    #[derive(Debug, Default)]
    struct FakePlayer {
        url: Option<String>,
        position: f64,
        paused: bool,
    }

    impl MediaPlayer for FakePlayer {
        fn load(&mut self, url: Option<&str>) {
            self.url = url.map(str::to_string);
            self.position = 0.0;
        }
        fn position(&self) -> f64 {
            self.position
        }
        fn seek(&mut self, local: f64) {
            self.position = local;
        }
        fn play(&mut self) {
            self.paused = false;
        }
        fn pause(&mut self) {
            self.paused = true;
        }
        fn is_paused(&self) -> bool {
            self.paused
        }
    }

    #[test]
    fn test_players_follow_playhead() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a1 = session.audio_track().unwrap().id;
        drop_at(&mut session, v1, "a", 5.0, 0.0);
        let json = r#"{"name":"music","type":"audio","url":"http://h/files/music.mp3","duration":30}"#;
        session.drop_media(a1, json, 0.0, 0.0, VIEWPORT).unwrap();

        let (mut video, mut audio) = (FakePlayer::default(), FakePlayer::default());
        session.seek(2.0);
        session.set_playing(true);
        session.drive_players(&mut video, &mut audio);

        assert_eq!(video.url.as_deref(), Some("http://localhost:8000/files/a.mp4"));
        assert_eq!(video.position, 2.0);
        assert_eq!(audio.url.as_deref(), Some("http://h/files/music.mp3"));
        assert!(!video.paused && !audio.paused);

        session.player_progress(3.0);
        assert_eq!(session.current_time(), 3.0);

        // Past the video clip the main player goes dark, music keeps going
        session.seek(7.0);
        session.drive_players(&mut video, &mut audio);
        assert_eq!(video.url, None);
        assert!(audio.url.is_some());
    }

    #[test]
    fn test_ai_edit_round_trip() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a = drop_at(&mut session, v1, "a", 10.0, 0.0);
        session.seek(4.0);
        session.select(Some(a));
        let right = session.split_at_playhead().unwrap();

        assert_eq!(
            session.edit_request(EditCommand::Text("brighter".into())).unwrap_err(),
            ServiceError::NoEditableSelection
        );

        session.select(Some(right));
        let request = session.edit_request(EditCommand::Text("brighter".into())).unwrap();
        assert_eq!(request.filename, "a.mp4");
        assert_eq!((request.clip_start, request.clip_duration), (4.0, 6.0));

        let reply = session
            .apply_edit_result(Ok(EditResponse {
                processed_url: "http://localhost:8000/files/a_edit.mp4".into(),
                new_duration: 5.0,
                reply: Some("Done".into()),
            }))
            .unwrap();
        assert_eq!(reply.as_deref(), Some("Done"));

        let clip = session.timeline().find_clip(right).unwrap().1;
        assert_eq!(clip.source_offset, 0.0);
        assert_eq!(clip.duration, 5.0);
        assert_eq!(clip.source_url.as_deref(), Some("http://localhost:8000/files/a_edit.mp4"));
    }

    #[test]
    fn test_ai_edit_failure_leaves_model() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        drop_at(&mut session, v1, "a", 10.0, 0.0);
        let before = session.timeline().clone();

        let err = session
            .apply_edit_result(Err(ServiceError::failure("edit", "timeout")))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Failure { .. }));
        assert_eq!(session.timeline(), &before);
    }

    #[test]
    fn test_ai_edit_with_bad_duration_leaves_model() {
        let mut session = EditorSession::default();
        let v1 = video_id(&session);
        let a = drop_at(&mut session, v1, "a", 10.0, 0.0);
        session.select(Some(a));
        let before = session.timeline().clone();

        for new_duration in [0.0, -2.0, f64::NAN] {
            let err = session
                .apply_edit_result(Ok(EditResponse {
                    processed_url: "http://localhost:8000/files/a_edit.mp4".into(),
                    new_duration,
                    reply: None,
                }))
                .unwrap_err();
            assert!(
                matches!(&err, ServiceError::Failure { service, .. } if service == "edit"),
                "{new_duration}: {err}"
            );
            assert_eq!(session.timeline(), &before);
        }
    }

    #[test]
    fn test_ai_edit_refused_for_text_clip() {
        let mut session = EditorSession::default();
        let text = session.timeline().first_track_of_kind(TrackKind::Text).unwrap().id;
        let title = session
            .drop_media(text, r#"{"name":"title","type":"text"}"#, 0.0, 0.0, VIEWPORT)
            .unwrap();
        session.select(Some(title));
        let before = session.timeline().clone();

        let err = session
            .apply_edit_result(Ok(EditResponse {
                processed_url: "http://localhost:8000/files/title_edit.mp4".into(),
                new_duration: 3.0,
                reply: None,
            }))
            .unwrap_err();
        assert_eq!(err, ServiceError::NoEditableSelection);
        assert_eq!(session.timeline(), &before);
        assert!(session.timeline().find_clip(title).unwrap().1.source_url.is_none());
    }

    #[test]
    fn test_export() {
        let mut session = EditorSession::default();
        assert_eq!(session.export_request().unwrap_err(), ServiceError::NothingToExport);

        let v1 = video_id(&session);
        drop_at(&mut session, v1, "b", 3.0, 0.0);
        drop_at(&mut session, v1, "a", 2.0, 0.0);
        let request = session.export_request().unwrap();
        let names: Vec<_> = request.clips.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, ["b.mp4", "a.mp4"]);

        let url = session
            .apply_export_result(Ok(ExportResponse {
                status: "success".into(),
                url: Some("http://h/files/out.mp4".into()),
                message: None,
            }))
            .unwrap();
        assert_eq!(url, "http://h/files/out.mp4");
    }

    #[test]
    fn test_zoom_controls() {
        let mut session = EditorSession::default();
        session.zoom_in();
        assert_eq!(session.mapper().zoom(), 40.0);
        session.zoom_out();
        session.zoom_out();
        assert_eq!(session.mapper().zoom(), 20.0);
        session.wheel_zoom(-120.0);
        assert!((session.mapper().zoom() - 22.0).abs() < 1e-9);
    }
}
