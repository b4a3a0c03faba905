// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline panel rendering.
//!
//! Features:
//! - Toolbar with transport, timecode and zoom controls
//! - Time ruler keyed to the zoom level
//! - Track header column and clip lanes
//! - Move/trim gestures with live geometry
//! - Media drops from the library (JSON `String` payloads)
//! - Keyboard shortcuts and wheel zoom

use crate::clip::{ClipGeometry, ClipId};
use crate::config::TimelineConfig;
use crate::coords::{format_tick, format_timecode};
use crate::keyboard::{Key, KeyInput};
use crate::session::EditorSession;
use crate::track::{Track, TrackId};
use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};
use std::time::Instant;

const TRACK_HEIGHT: f32 = 48.0;
const TRACK_HEADER_WIDTH: f32 = 160.0;
const RULER_HEIGHT: f32 = 28.0;
const PLAYHEAD_WIDTH: f32 = 2.0;
const CLIP_ROUNDING: f32 = 4.0;
const HANDLE_WIDTH: f32 = 4.0;
/// Wheel deltas below this are trackpad pinches and zoom instead of scrolling
const PINCH_DELTA: f32 = 50.0;
const PLAYHEAD_COLOR: Color32 = Color32::from_rgb(239, 68, 68);

/// Editor panel hosting one [`EditorSession`]
pub struct TimelinePanel {
    session: EditorSession,
    /// Horizontal scroll offset in pixels
    pub scroll_left: f32,
    /// Vertical scroll offset in pixels
    pub vertical_scroll: f32,
    /// Keep the playhead in view while playing
    pub auto_scroll: bool,
    /// Lane rects from the last frame, for hit-testing releases
    lanes: Vec<(TrackId, Rect)>,
    /// Left edge of the clip area on screen
    content_left: f32,
}

impl TimelinePanel {
    /// Create a panel with the default track layout
    pub fn new(config: TimelineConfig) -> Self {
        Self::with_session(EditorSession::new(config))
    }

    /// Create a panel around an existing session
    pub fn with_session(session: EditorSession) -> Self {
        Self {
            session,
            scroll_left: 0.0,
            vertical_scroll: 0.0,
            auto_scroll: true,
            lanes: Vec::new(),
            content_left: TRACK_HEADER_WIDTH,
        }
    }

    /// Session state
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Mutable session state, for player and service callbacks
    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    /// Advance playback (call each frame)
    pub fn update(&mut self, now: Instant) {
        self.session.tick(now);
    }

    /// Screen x to content-space x (pixels from time zero)
    fn content_x(&self, screen_x: f32) -> f64 {
        f64::from(screen_x - self.content_left + self.scroll_left)
    }

    /// Timeline time to screen x
    fn time_to_x(&self, time: f64) -> f32 {
        self.session.mapper().seconds_to_pixels(time) as f32 - self.scroll_left + self.content_left
    }

    /// Render the full panel
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.render_toolbar(ui);
        ui.separator();

        let area = ui.available_rect_before_wrap();
        self.content_left = area.min.x + TRACK_HEADER_WIDTH;

        let ruler_rect = Rect::from_min_size(area.min, Vec2::new(area.width(), RULER_HEIGHT));
        let tracks_rect = Rect::from_min_max(Pos2::new(area.min.x, ruler_rect.max.y), area.max);

        self.render_ruler(ui, ruler_rect);
        self.render_tracks(ui, tracks_rect);
        self.handle_gesture(ui);
        self.handle_input(ui, area);

        if self.auto_scroll && self.session.is_playing() {
            let playhead_x = self.time_to_x(self.session.current_time());
            if playhead_x > area.max.x - 50.0 {
                let visible = area.width() - TRACK_HEADER_WIDTH;
                self.scroll_left += visible * 0.8;
            }
        }

        if self.session.is_playing() || self.session.interaction().is_active() {
            ui.ctx().request_repaint();
        }
        ui.allocate_rect(area, Sense::hover());
    }

    /// Render toolbar with transport and zoom
    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let viewport = f64::from(ui.available_width() - TRACK_HEADER_WIDTH);

        ui.horizontal(|ui| {
            let play_icon = if self.session.is_playing() { "⏸" } else { "▶" };
            if ui.button(play_icon).on_hover_text("Play/Pause (Space)").clicked() {
                self.session.toggle_playback();
            }
            if ui.button("⏮").on_hover_text("Go to Start (Home)").clicked() {
                self.session.seek(0.0);
            }

            ui.separator();
            ui.monospace(format_timecode(self.session.current_time()));
            ui.separator();

            if ui.button("✂").on_hover_text("Split at Playhead (C)").clicked() {
                self.session.split_at_playhead();
            }
            if ui.button("🗑").on_hover_text("Delete (Del)").clicked() {
                self.session.delete_selected();
            }

            ui.separator();

            ui.label("Zoom:");
            if ui.button("-").clicked() {
                self.session.zoom_out();
            }
            ui.monospace(format!("{:.0} px/s", self.session.mapper().zoom()));
            if ui.button("+").clicked() {
                self.session.zoom_in();
            }
            if ui.button("Fit").clicked() {
                self.session.fit_to_content(viewport);
                self.scroll_left = 0.0;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let timeline = self.session.timeline();
                ui.label(format!(
                    "{} tracks | {} clips | {:.2}s",
                    timeline.track_count(),
                    timeline.clip_count(),
                    timeline.content_end()
                ));
            });
        });
    }

    /// Render the time ruler and handle scrubbing
    fn render_ruler(&mut self, ui: &mut egui::Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(24));

        let mapper = *self.session.mapper();
        let visible_start = mapper.pixels_to_seconds(f64::from(self.scroll_left));
        let visible_end =
            mapper.pixels_to_seconds(f64::from(self.scroll_left + rect.width() - TRACK_HEADER_WIDTH));

        for time in mapper.ruler_ticks(visible_start, visible_end) {
            let x = self.time_to_x(time);
            if x < self.content_left || x > rect.max.x {
                continue;
            }
            painter.line_segment(
                [Pos2::new(x, rect.max.y - 10.0), Pos2::new(x, rect.max.y)],
                Stroke::new(1.0, Color32::from_gray(110)),
            );
            painter.text(
                Pos2::new(x + 3.0, rect.min.y + 4.0),
                egui::Align2::LEFT_TOP,
                format_tick(time),
                egui::FontId::monospace(10.0),
                Color32::from_gray(160),
            );
        }

        let playhead_x = self.time_to_x(self.session.current_time());
        if playhead_x >= self.content_left && playhead_x <= rect.max.x {
            let triangle = vec![
                Pos2::new(playhead_x, rect.max.y),
                Pos2::new(playhead_x - 6.0, rect.max.y - 8.0),
                Pos2::new(playhead_x + 6.0, rect.max.y - 8.0),
            ];
            painter.add(egui::Shape::convex_polygon(triangle, PLAYHEAD_COLOR, Stroke::NONE));
        }

        let response = ui.interact(rect, ui.id().with("timeline_ruler"), Sense::click_and_drag());
        if response.clicked() || response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let x = self.content_x(pos.x).max(0.0);
                self.session.seek(self.session.mapper().pixels_to_seconds(x));
            }
        }
    }

    /// Render lanes, clips and the playhead
    fn render_tracks(&mut self, ui: &mut egui::Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(18));
        painter.rect_filled(
            Rect::from_min_size(rect.min, Vec2::new(TRACK_HEADER_WIDTH, rect.height())),
            0.0,
            Color32::from_gray(22),
        );

        // Collect ids to avoid holding a borrow of the session across handlers
        let track_ids: Vec<TrackId> = self.session.timeline().tracks().map(|t| t.id).collect();

        self.lanes.clear();
        let mut y = rect.min.y - self.vertical_scroll;
        for (idx, track_id) in track_ids.into_iter().enumerate() {
            if y > rect.max.y {
                break;
            }
            let lane = Rect::from_min_size(Pos2::new(rect.min.x, y), Vec2::new(rect.width(), TRACK_HEIGHT));
            if lane.max.y > rect.min.y {
                self.render_track(ui, &painter, lane, track_id, idx);
            }
            y += TRACK_HEIGHT;
        }

        let playhead_x = self.time_to_x(self.session.current_time());
        if playhead_x >= self.content_left && playhead_x <= rect.max.x {
            painter.line_segment(
                [Pos2::new(playhead_x, rect.min.y), Pos2::new(playhead_x, rect.max.y)],
                Stroke::new(PLAYHEAD_WIDTH, PLAYHEAD_COLOR),
            );
        }
    }

    /// Render a single track and wire its interactions
    fn render_track(&mut self, ui: &mut egui::Ui, painter: &egui::Painter, rect: Rect, track_id: TrackId, index: usize) {
        let Some(track) = self.session.timeline().track(track_id).cloned() else {
            return;
        };

        let bg_color = if index % 2 == 0 {
            Color32::from_gray(26)
        } else {
            Color32::from_gray(22)
        };
        painter.rect_filled(rect, 0.0, bg_color);

        let header_rect = Rect::from_min_size(rect.min, Vec2::new(TRACK_HEADER_WIDTH, TRACK_HEIGHT));
        let color = track_color(&track);
        painter.rect_filled(
            Rect::from_min_size(header_rect.min, Vec2::new(4.0, TRACK_HEIGHT)),
            0.0,
            color,
        );
        painter.text(
            Pos2::new(header_rect.min.x + 12.0, header_rect.center().y),
            egui::Align2::LEFT_CENTER,
            &track.name,
            egui::FontId::proportional(12.0),
            Color32::from_gray(200),
        );
        painter.text(
            Pos2::new(header_rect.max.x - 8.0, header_rect.center().y),
            egui::Align2::RIGHT_CENTER,
            track.kind.name(),
            egui::FontId::proportional(10.0),
            Color32::from_gray(110),
        );

        let content_rect = Rect::from_min_max(Pos2::new(self.content_left, rect.min.y), rect.max);
        self.lanes.push((track_id, content_rect));

        // Empty lane: click seeks and deselects, releases accept library drops
        let lane_response = ui.interact(content_rect, ui.id().with(("lane", track_id)), Sense::click());
        if lane_response.clicked() {
            if let Some(pos) = lane_response.interact_pointer_pos() {
                self.session.click_empty(self.content_x(pos.x).max(0.0));
            }
        }
        if let Some(payload) = lane_response.dnd_release_payload::<String>() {
            if let Some(pos) = ui.ctx().pointer_interact_pos() {
                self.session.drop_media(
                    track_id,
                    payload.as_str(),
                    f64::from(pos.x - self.content_left),
                    f64::from(self.scroll_left),
                    f64::from(content_rect.width()),
                );
            }
        }

        let clip_painter = painter.with_clip_rect(content_rect.intersect(painter.clip_rect()));
        let live = self.session.interaction().live();
        for clip in &track.clips {
            let geometry = match live {
                Some(l) if l.clip_id == clip.id => l.geometry,
                _ => clip.geometry(),
            };
            let clip_rect = self.clip_rect(content_rect, geometry);
            if clip_rect.max.x < content_rect.min.x || clip_rect.min.x > content_rect.max.x {
                continue;
            }

            let selected = self.session.selection().is_selected(clip.id);
            let fill = if selected { color } else { color.gamma_multiply(0.6) };
            clip_painter.rect_filled(clip_rect, CLIP_ROUNDING, fill);
            if selected {
                clip_painter.rect_stroke(clip_rect, CLIP_ROUNDING, Stroke::new(2.0, Color32::WHITE));
                for handle_x in [clip_rect.min.x, clip_rect.max.x - HANDLE_WIDTH] {
                    clip_painter.rect_filled(
                        Rect::from_min_size(Pos2::new(handle_x, clip_rect.min.y), Vec2::new(HANDLE_WIDTH, clip_rect.height())),
                        CLIP_ROUNDING,
                        Color32::from_white_alpha(200),
                    );
                }
            }
            clip_painter.text(
                Pos2::new(clip_rect.min.x + 8.0, clip_rect.center().y),
                egui::Align2::LEFT_CENTER,
                &clip.name,
                egui::FontId::proportional(11.0),
                Color32::from_gray(20),
            );

            self.interact_clip(ui, clip_rect, track_id, clip.id);
        }

        painter.line_segment(
            [Pos2::new(rect.min.x, rect.max.y), Pos2::new(rect.max.x, rect.max.y)],
            Stroke::new(1.0, Color32::from_gray(40)),
        );
    }

    fn clip_rect(&self, lane: Rect, geometry: ClipGeometry) -> Rect {
        let mapper = self.session.mapper();
        let left = self.time_to_x(geometry.start);
        let width = (mapper.seconds_to_pixels(geometry.duration) as f32).max(2.0);
        Rect::from_min_size(
            Pos2::new(left, lane.min.y + 4.0),
            Vec2::new(width, lane.height() - 8.0),
        )
    }

    /// Start gestures and select on click
    fn interact_clip(&mut self, ui: &mut egui::Ui, rect: Rect, track_id: TrackId, clip_id: ClipId) {
        let response = ui.interact(rect, ui.id().with(("clip", clip_id)), Sense::click_and_drag());

        if response.hovered() && !self.session.interaction().is_active() {
            let edge = self.session.config().edge_hit_px as f32;
            let near_edge = response
                .hover_pos()
                .is_some_and(|p| p.x - rect.min.x < edge || rect.max.x - p.x < edge);
            if near_edge {
                ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
            }
        }

        if response.clicked() {
            self.session.select(Some(clip_id));
        }
        if response.drag_started() {
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(pos) = origin {
                let x = self.content_x(pos.x);
                self.session.pointer_down(track_id, clip_id, x);
            }
        }
    }

    /// Feed pointer motion and release into the active gesture
    fn handle_gesture(&mut self, ui: &mut egui::Ui) {
        if !self.session.interaction().is_active() {
            return;
        }

        let (pos, released) = ui.input(|i| (i.pointer.interact_pos(), i.pointer.primary_released()));
        let Some(pos) = pos else {
            return;
        };
        let x = self.content_x(pos.x);

        if released {
            let drop_track = self
                .lanes
                .iter()
                .find(|(_, lane)| pos.y >= lane.min.y && pos.y < lane.max.y)
                .map(|(id, _)| *id);
            self.session.pointer_up(x, drop_track);
        } else {
            self.session.pointer_move(x);
        }
    }

    /// Keyboard shortcuts and wheel zoom/scroll
    fn handle_input(&mut self, ui: &mut egui::Ui, rect: Rect) {
        let text_entry_focused = ui.ctx().wants_keyboard_input();
        let keys: Vec<KeyInput> = ui.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        modifiers,
                        ..
                    } => Some(KeyInput {
                        key: map_key(*key),
                        ctrl: modifiers.command,
                        text_entry_focused,
                    }),
                    _ => None,
                })
                .collect()
        });
        for key in keys {
            self.session.key(key);
        }

        if input_escape(ui) {
            self.session.cancel_gesture();
        }

        let hovered = ui.rect_contains_pointer(rect);
        if !hovered {
            return;
        }

        let (zoom_delta, scroll, shift) =
            ui.input(|i| (i.zoom_delta(), i.raw_scroll_delta, i.modifiers.shift));

        // Ctrl+wheel arrives as zoom_delta
        if zoom_delta > 1.0 {
            self.session.wheel_zoom(-1.0);
        } else if zoom_delta < 1.0 {
            self.session.wheel_zoom(1.0);
        } else if shift {
            self.scroll_left = (self.scroll_left - scroll.y - scroll.x).max(0.0);
        } else if scroll.y != 0.0 && scroll.y.abs() < PINCH_DELTA {
            self.session.wheel_zoom(f64::from(-scroll.y));
        } else {
            self.scroll_left = (self.scroll_left - scroll.x).max(0.0);
            self.vertical_scroll = (self.vertical_scroll - scroll.y).max(0.0);
        }
    }
}

impl Default for TimelinePanel {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

fn input_escape(ui: &egui::Ui) -> bool {
    ui.input(|i| i.key_pressed(egui::Key::Escape))
}

fn track_color(track: &Track) -> Color32 {
    let [r, g, b] = track.color();
    Color32::from_rgb(r, g, b)
}

/// Translate an egui key into the timeline's key set
pub fn map_key(key: egui::Key) -> Key {
    match key {
        egui::Key::Delete => Key::Delete,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::Space => Key::Space,
        egui::Key::Home => Key::Home,
        egui::Key::C => Key::Char('c'),
        egui::Key::K => Key::Char('k'),
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KeyCommand;

    #[test]
    fn test_map_key() {
        assert_eq!(map_key(egui::Key::Delete), Key::Delete);
        assert_eq!(map_key(egui::Key::C), Key::Char('c'));
        assert_eq!(map_key(egui::Key::A), Key::Other);

        let split = KeyInput {
            key: map_key(egui::Key::K),
            ctrl: true,
            text_entry_focused: false,
        };
        assert_eq!(split.command(), Some(KeyCommand::SplitAtPlayhead));
    }

    #[test]
    fn test_coordinate_conversion() {
        let mut panel = TimelinePanel::default();
        panel.content_left = 200.0;
        panel.scroll_left = 60.0;

        // Initial zoom is 30 px/s
        assert_eq!(panel.time_to_x(2.0), 200.0);
        assert_eq!(panel.content_x(200.0), 60.0);
    }

    #[test]
    fn test_panel_renders_headless() {
        let ctx = egui::Context::default();
        let mut panel = TimelinePanel::default();
        let v1 = panel.session().video_track().unwrap().id;
        panel.session_mut().drop_media(
            v1,
            r#"{"name":"a","type":"video","url":"http://h/files/a.mp4","duration":4}"#,
            0.0,
            0.0,
            800.0,
        );

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| panel.ui(ui));
        });
        assert_eq!(panel.lanes.len(), 3);
    }
}
