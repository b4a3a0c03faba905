// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for timeline edits, external services and configuration.

use crate::clip::ClipId;
use crate::track::TrackId;
use thiserror::Error;

/// Errors raised by timeline model operations.
///
/// None of these are fatal. The editor session treats every variant as a
/// rejected edit and keeps the last consistent timeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// Track does not exist (e.g. removed mid-gesture)
    #[error("Track not found: {0:?}")]
    TrackNotFound(TrackId),

    /// Clip does not exist in the addressed track
    #[error("Clip not found: {0:?}")]
    ClipNotFound(ClipId),

    /// Split point is not strictly inside the clip
    #[error("Split at {split_time}s is outside clip [{start}s, {end}s)")]
    SplitOutOfRange {
        /// Requested split time
        split_time: f64,
        /// Clip start
        start: f64,
        /// Clip end
        end: f64,
    },

    /// Edit would leave the clip shorter than the minimum duration
    #[error("Duration {duration}s is below the minimum of {minimum}s")]
    BelowMinimumDuration {
        /// Requested duration
        duration: f64,
        /// Configured floor
        minimum: f64,
    },

    /// Duration is zero, negative or not a number
    #[error("Invalid clip duration: {0}s")]
    InvalidDuration(f64),

    /// Drag payload did not match the descriptor schema
    #[error("Invalid media payload: {0}")]
    InvalidPayload(String),
}

impl EditError {
    /// Whether this error is a lookup miss (benign race with a delete)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TrackNotFound(_) | Self::ClipNotFound(_))
    }
}

/// Result type for timeline edits
pub type Result<T> = std::result::Result<T, EditError>;

/// Failures of the collaborators outside the core (upload, AI edit, export, microphone).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Remote service returned an error or could not be reached
    #[error("{service} failed: {message}")]
    Failure {
        /// Service name, e.g. "export"
        service: String,
        /// Human-readable reason
        message: String,
    },

    /// Microphone access refused
    #[error("Microphone permission denied")]
    PermissionDenied,

    /// Export requested with no clips on the video track
    #[error("No clips to export")]
    NothingToExport,

    /// AI edit requested without a selected clip that has media
    #[error("No clip with media is selected")]
    NoEditableSelection,

    /// Request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ServiceError {
    /// Create a failure for a named service
    pub fn failure(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            service: service.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Configuration load/save errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Values parsed but are unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
