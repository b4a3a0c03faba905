// SPDX-License-Identifier: MIT OR Apache-2.0
//! Boundary types for the collaborators outside the core.
//!
//! - Media library drag payloads ([`MediaDescriptor`])
//! - AI text/voice edit requests and responses
//! - The export projection sent to the render service

use crate::clip::{Clip, ClipKind};
use crate::error::{EditError, ServiceError};
use crate::timeline::Timeline;
use crate::track::TrackKind;
use serde::{Deserialize, Serialize};

/// Media description carried across a drag from the library.
///
/// This is also the shape media ingestion returns after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    /// Display name
    pub name: String,
    /// Source media url (absent for text)
    #[serde(default)]
    pub url: Option<String>,
    /// Media duration in seconds, if known
    #[serde(default)]
    pub duration: Option<f64>,
    /// Media kind
    #[serde(rename = "type", alias = "kind")]
    pub kind: ClipKind,
}

impl MediaDescriptor {
    /// Parse and validate a JSON drag payload
    pub fn from_json(payload: &str) -> Result<Self, EditError> {
        let descriptor: MediaDescriptor =
            serde_json::from_str(payload).map_err(|e| EditError::InvalidPayload(e.to_string()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Encode as a JSON drag payload
    pub fn to_json(&self) -> Result<String, ServiceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject shapes the model cannot hold
    pub fn validate(&self) -> Result<(), EditError> {
        if self.kind.requires_source() && self.url.as_deref().map_or(true, str::is_empty) {
            return Err(EditError::InvalidPayload(format!(
                "{} media '{}' has no url",
                self.kind.name(),
                self.name
            )));
        }
        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err(EditError::InvalidPayload(format!(
                    "duration {duration} of '{}' is not a positive number",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Duration to give a new clip; missing or zero falls back to `default`
    pub fn duration_or(&self, default: f64) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 => d,
            _ => default,
        }
    }
}

/// What the AI collaborator should do to a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditCommand {
    /// Typed instruction
    Text(String),
    /// Recorded voice instruction (encoded audio bytes)
    Voice(Vec<u8>),
}

/// Request sent to the AI edit collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Source file name derived from the clip's url
    pub filename: String,
    /// Start of the clip's window within the source file
    pub clip_start: f64,
    /// Length of the clip's window
    pub clip_duration: f64,
    /// Instruction
    pub command: EditCommand,
}

impl EditRequest {
    /// Build a request covering exactly the part of the source the clip plays
    pub fn for_clip(clip: &Clip, command: EditCommand) -> Result<Self, ServiceError> {
        if clip.source_url.is_none() {
            return Err(ServiceError::NoEditableSelection);
        }
        Ok(Self {
            filename: clip.source_filename(),
            clip_start: clip.source_offset,
            clip_duration: clip.duration,
            command,
        })
    }
}

/// Successful reply from the AI edit collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditResponse {
    /// Url of the processed media
    pub processed_url: String,
    /// Duration of the processed media
    pub new_duration: f64,
    /// Optional spoken/text reply for the user
    #[serde(default)]
    pub reply: Option<String>,
}

/// One entry of the render projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Source file name
    pub filename: String,
    /// Clip duration
    pub duration: f64,
}

/// Ordered clip list handed to the render service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportRequest {
    /// Video clips in timeline order
    pub clips: Vec<ExportEntry>,
}

impl ExportRequest {
    /// Project the first video track, stably sorted by start
    pub fn from_timeline(timeline: &Timeline) -> Result<Self, ServiceError> {
        let track = timeline
            .first_track_of_kind(TrackKind::Video)
            .filter(|t| t.clip_count() > 0)
            .ok_or(ServiceError::NothingToExport)?;

        let clips = track
            .sorted_clips()
            .into_iter()
            .map(|c| ExportEntry {
                filename: c.source_filename(),
                duration: c.duration,
            })
            .collect();

        Ok(Self { clips })
    }

    /// Encode as the `project_data` form field
    pub fn to_json(&self) -> Result<String, ServiceError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Reply from the render service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResponse {
    /// "success" or "error"
    pub status: String,
    /// Artifact url on success
    #[serde(default)]
    pub url: Option<String>,
    /// Failure reason
    #[serde(default)]
    pub message: Option<String>,
}

impl ExportResponse {
    /// Artifact reference, or the service failure
    pub fn into_result(self) -> Result<String, ServiceError> {
        match (self.status.as_str(), self.url) {
            ("success", Some(url)) => Ok(url),
            _ => Err(ServiceError::failure(
                "export",
                self.message.unwrap_or_else(|| "render service returned no artifact".to_string()),
            )),
        }
    }
}
