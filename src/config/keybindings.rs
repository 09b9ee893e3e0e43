//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Number of sort slots bound to the digit keys `1`-`9`.
pub const SORT_SLOTS: usize = 9;

/// Maps keyboard events to domain actions.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event. Event kind and state are ignored.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }

    fn bind(&mut self, code: KeyCode, modifiers: KeyModifiers, action: KeyAction) {
        self.bindings.insert(KeyEvent::new(code, modifiers), action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut keys = Self {
            bindings: HashMap::new(),
        };

        // Application controls
        keys.bind(KeyCode::Char('q'), KeyModifiers::NONE, KeyAction::Quit);
        keys.bind(KeyCode::Esc, KeyModifiers::NONE, KeyAction::Quit);
        keys.bind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit);

        // Ordering
        for slot in 0..SORT_SLOTS {
            if let Some(digit) = char::from_digit(slot as u32 + 1, 10) {
                keys.bind(KeyCode::Char(digit), KeyModifiers::NONE, KeyAction::SortBy(slot));
            }
        }
        keys.bind(KeyCode::Char('r'), KeyModifiers::NONE, KeyAction::Reverse);

        // Filtering
        keys.bind(KeyCode::Char('f'), KeyModifiers::NONE, KeyAction::NextFilter);
        keys.bind(KeyCode::Char('F'), KeyModifiers::SHIFT, KeyAction::ClearFilter);

        // Collection mutation
        keys.bind(KeyCode::Char('p'), KeyModifiers::NONE, KeyAction::Pop);
        keys.bind(KeyCode::Char('x'), KeyModifiers::NONE, KeyAction::Shift);
        keys.bind(KeyCode::Char('a'), KeyModifiers::NONE, KeyAction::PushBack);
        keys.bind(KeyCode::Char('u'), KeyModifiers::NONE, KeyAction::UnshiftBack);
        keys.bind(KeyCode::Char('c'), KeyModifiers::NONE, KeyAction::Clear);
        keys.bind(KeyCode::Char('R'), KeyModifiers::SHIFT, KeyAction::Reset);

        keys
    }
}
