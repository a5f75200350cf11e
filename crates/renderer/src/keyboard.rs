use std::collections::HashSet;

use engine::{EditorKey, InputSource, KeySnapshot};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks which editor keys the window currently holds down.
///
/// Keys are tracked by physical code so that releasing one of two held
/// modifiers (left and right Alt, say) keeps the editor key down.
#[derive(Debug, Default)]
pub struct LiveKeyboard {
    held: HashSet<KeyCode>,
}

impl LiveKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the event touched a key the editor cares about.
    pub fn handle_event(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        self.set_key(code, event.state == ElementState::Pressed)
    }

    pub fn set_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        if editor_key(code).is_none() {
            return false;
        }
        if pressed {
            self.held.insert(code)
        } else {
            self.held.remove(&code)
        }
    }

    /// Forgets every held key; the window lost focus and will not see the
    /// matching releases.
    pub fn reset(&mut self) {
        self.held.clear();
    }
}

impl InputSource for LiveKeyboard {
    fn snapshot(&mut self) -> KeySnapshot {
        let mut snapshot = KeySnapshot::default();
        for key in self.held.iter().copied().filter_map(editor_key) {
            snapshot.set(key, true);
        }
        snapshot
    }
}

pub fn editor_key(code: KeyCode) -> Option<EditorKey> {
    let key = match code {
        KeyCode::AltLeft | KeyCode::AltRight => EditorKey::Modifier,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => EditorKey::Secondary,
        KeyCode::ControlLeft | KeyCode::ControlRight => EditorKey::Control,
        KeyCode::ArrowUp => EditorKey::Up,
        KeyCode::ArrowDown => EditorKey::Down,
        KeyCode::ArrowLeft => EditorKey::Left,
        KeyCode::ArrowRight => EditorKey::Right,
        KeyCode::KeyS => EditorKey::S,
        KeyCode::Escape => EditorKey::Escape,
        KeyCode::F1 => EditorKey::F1,
        KeyCode::F2 => EditorKey::F2,
        KeyCode::F3 => EditorKey::F3,
        _ => return None,
    };
    Some(key)
}
