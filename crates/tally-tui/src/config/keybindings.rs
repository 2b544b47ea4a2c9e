use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use tally_types::ViewportIntent;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    LogViewer,
    Help,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::shift(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Log viewer bindings - less-like navigation
        let mut log_viewer = HashMap::new();
        let nav = Action::Navigate;
        // Line navigation
        log_viewer.insert(KeyBinding::new(KeyCode::Char('j')), nav(ViewportIntent::MoveDown));
        log_viewer.insert(KeyBinding::new(KeyCode::Down), nav(ViewportIntent::MoveDown));
        log_viewer.insert(KeyBinding::new(KeyCode::Char('k')), nav(ViewportIntent::MoveUp));
        log_viewer.insert(KeyBinding::new(KeyCode::Up), nav(ViewportIntent::MoveUp));
        // Page navigation
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('d')), nav(ViewportIntent::PageDown));
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('u')), nav(ViewportIntent::PageUp));
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('f')), nav(ViewportIntent::PageDown));
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('b')), nav(ViewportIntent::PageUp));
        log_viewer.insert(KeyBinding::new(KeyCode::PageDown), nav(ViewportIntent::PageDown));
        log_viewer.insert(KeyBinding::new(KeyCode::PageUp), nav(ViewportIntent::PageUp));
        // Top/bottom navigation
        log_viewer.insert(KeyBinding::new(KeyCode::Char('g')), nav(ViewportIntent::Top));
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('G')), nav(ViewportIntent::Bottom));
        log_viewer.insert(KeyBinding::new(KeyCode::Home), nav(ViewportIntent::Top));
        log_viewer.insert(KeyBinding::new(KeyCode::End), nav(ViewportIntent::Bottom));
        // Display and actions
        log_viewer.insert(KeyBinding::new(KeyCode::Char('t')), Action::ToggleTimestamps);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('s')), Action::ToggleSources);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('r')), Action::Reload);
        log_viewer.insert(KeyBinding::new(KeyCode::Esc), Action::Quit);
        bindings.insert(KeyContext::LogViewer, log_viewer);

        // Help overlay swallows navigation; these close it
        let mut help = HashMap::new();
        help.insert(KeyBinding::new(KeyCode::Esc), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::Char('q')), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::Enter), Action::ToggleHelp);
        bindings.insert(KeyContext::Help, help);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_arrow_keys_navigate() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::LogViewer, &key(KeyCode::Up, KeyModifiers::NONE)),
            Some(Action::Navigate(ViewportIntent::MoveUp))
        );
        assert_eq!(
            kb.get_action(KeyContext::LogViewer, &key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(Action::Navigate(ViewportIntent::MoveDown))
        );
        assert_eq!(
            kb.get_action(KeyContext::LogViewer, &key(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(Action::Navigate(ViewportIntent::Bottom))
        );
    }

    #[test]
    fn test_quit_keys() {
        let kb = KeyBindings::new();
        for (code, mods) in [
            (KeyCode::Esc, KeyModifiers::NONE),
            (KeyCode::Char('c'), KeyModifiers::CONTROL),
            (KeyCode::Char('q'), KeyModifiers::NONE),
        ] {
            assert_eq!(
                kb.get_action(KeyContext::LogViewer, &key(code, mods)),
                Some(Action::Quit)
            );
        }
    }

    #[test]
    fn test_help_context_closes_instead_of_quitting() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::Help, &key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Action::ToggleHelp)
        );
        assert_eq!(
            kb.get_action(KeyContext::Help, &key(KeyCode::Down, KeyModifiers::NONE)),
            None
        );
        // Ctrl-C still quits from the overlay
        assert_eq!(
            kb.get_action(KeyContext::Help, &key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_unbound_key() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::LogViewer, &key(KeyCode::Char('z'), KeyModifiers::NONE)),
            None
        );
    }
}
