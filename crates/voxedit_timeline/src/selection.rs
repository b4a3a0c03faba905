// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip selection.

use crate::clip::ClipId;
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// At most one selected clip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    clip: Option<ClipId>,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection; `None` clears it
    pub fn select(&mut self, clip: Option<ClipId>) {
        self.clip = clip;
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.clip = None;
    }

    /// Selected clip
    pub fn clip(&self) -> Option<ClipId> {
        self.clip
    }

    /// Check if a clip is selected
    pub fn is_selected(&self, clip: ClipId) -> bool {
        self.clip == Some(clip)
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.clip.is_none()
    }

    /// Drop the selection if its clip no longer exists
    pub fn retain_existing(&mut self, timeline: &Timeline) {
        if let Some(clip) = self.clip {
            if timeline.find_clip(clip).is_none() {
                self.clip = None;
            }
        }
    }
}
