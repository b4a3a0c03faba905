// SPDX-License-Identifier: MIT OR Apache-2.0
//! Multi-track timeline core for the VoxEdit video editor.
//!
//! This crate provides the editing and playback model behind the timeline:
//! - Video, audio and text tracks holding clips
//! - Move, trim, split, delete and cross-track transfer
//! - Ripple tracks that never overlap
//! - Playback synchronization with external media players
//! - Boundary types for media drops, AI edits and export
//!
//! ## Architecture
//!
//! The timeline is built on:
//! - Immutable [`Timeline`] snapshots edited by pure operations
//! - An [`EditorSession`] owning the snapshot and every event handler
//! - A gesture engine producing one commit per pointer release
//! - An egui [`TimelinePanel`] translating input into session calls

pub mod clip;
pub mod config;
pub mod coords;
pub mod error;
pub mod external;
pub mod interaction;
pub mod keyboard;
pub mod playback;
pub mod ripple;
pub mod selection;
pub mod session;
pub mod timeline;
pub mod track;
pub mod ui;

pub use clip::{Clip, ClipGeometry, ClipId, ClipKind, ClipPatch};
pub use config::{TimelineConfig, CONFIG_FILE_NAME};
pub use coords::TimeMapper;
pub use error::{ConfigError, EditError, ServiceError};
pub use external::{
    EditCommand, EditRequest, EditResponse, ExportEntry, ExportRequest, ExportResponse, MediaDescriptor,
};
pub use interaction::{Commit, GestureKind, InteractionEngine, InteractionMode, LiveClip};
pub use keyboard::{Key, KeyCommand, KeyInput};
pub use playback::{ActiveClip, GapClock, MediaPlayer, PlaybackState, PlaybackSync, SyncTarget};
pub use selection::Selection;
pub use session::EditorSession;
pub use timeline::Timeline;
pub use track::{EditPolicy, Track, TrackId, TrackKind};
pub use ui::TimelinePanel;
