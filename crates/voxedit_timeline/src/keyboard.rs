// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyboard shortcuts.
//!
//! | Key | Command |
//! |-----|---------|
//! | Delete, Backspace | Delete the selected clip |
//! | C, Ctrl+K | Split the selected clip at the playhead |
//! | Space | Play/pause |
//! | Home | Jump to the start |
//!
//! Nothing fires while a text-entry control has focus.

/// Keys the timeline reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Delete
    Delete,
    /// Backspace
    Backspace,
    /// Space bar
    Space,
    /// Home
    Home,
    /// Printable character
    Char(char),
    /// Anything else
    Other,
}

/// One key press with its context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    /// Key pressed
    pub key: Key,
    /// Ctrl (or Cmd) held
    pub ctrl: bool,
    /// Focus is inside a text field
    pub text_entry_focused: bool,
}

impl KeyInput {
    /// Plain key press with no modifiers outside a text field
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            text_entry_focused: false,
        }
    }

    /// Same press with Ctrl held
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Same press while a text field has focus
    pub fn in_text_entry(mut self) -> Self {
        self.text_entry_focused = true;
        self
    }

    /// Command bound to this press
    pub fn command(&self) -> Option<KeyCommand> {
        if self.text_entry_focused {
            return None;
        }

        match (self.key, self.ctrl) {
            (Key::Delete | Key::Backspace, _) => Some(KeyCommand::DeleteSelected),
            (Key::Char('c' | 'C'), false) | (Key::Char('k' | 'K'), true) => {
                Some(KeyCommand::SplitAtPlayhead)
            }
            (Key::Space, false) => Some(KeyCommand::TogglePlayback),
            (Key::Home, false) => Some(KeyCommand::SeekStart),
            _ => None,
        }
    }
}

/// Timeline command triggered from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Remove the selected clip
    DeleteSelected,
    /// Split the selected clip at the playhead
    SplitAtPlayhead,
    /// Play/pause
    TogglePlayback,
    /// Move the playhead to zero
    SeekStart,
}
