use std::path::PathBuf;

use super::Action;
use crate::config::KeyContext;

/// UI-specific state
#[derive(Clone, Debug)]
pub struct UiState {
    /// Whether the help overlay is visible
    pub help_visible: bool,

    /// Show the HH:MM:SS column
    pub show_timestamps: bool,

    /// Show the source file column
    pub show_sources: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            help_visible: false,
            show_timestamps: true,
            show_sources: true,
        }
    }
}

/// Main application state
///
/// Holds only presentation state; the lines and the viewport live in the
/// shared log store.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Path being viewed, as given on the command line
    pub root: PathBuf,

    /// Suffix selecting log files in a directory root
    pub suffix: String,

    /// The root is a single file rather than a directory
    pub single_file: bool,

    pub ui_state: UiState,

    pub should_quit: bool,
}

impl AppState {
    pub fn new(root: PathBuf, suffix: impl Into<String>) -> Self {
        Self {
            root,
            suffix: suffix.into(),
            single_file: false,
            ui_state: UiState::default(),
            should_quit: false,
        }
    }

    /// Which keybinding table applies right now
    pub fn key_context(&self) -> KeyContext {
        if self.ui_state.help_visible {
            KeyContext::Help
        } else {
            KeyContext::LogViewer
        }
    }

    /// Apply an action that only touches presentation state.
    ///
    /// Returns true if the action was handled here; navigation and reload
    /// are left to the caller.
    pub fn apply(&mut self, action: &Action) -> bool {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.ui_state.help_visible = !self.ui_state.help_visible,
            Action::ToggleTimestamps => {
                self.ui_state.show_timestamps = !self.ui_state.show_timestamps
            }
            Action::ToggleSources => self.ui_state.show_sources = !self.ui_state.show_sources,
            Action::Navigate(_) | Action::Reload => return false,
        }
        true
    }
}
