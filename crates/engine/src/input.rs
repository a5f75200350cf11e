//! Per-frame input polling and command derivation.
//!
//! Input is level-triggered: the mapper looks at which keys are held right
//! now, once per frame. Transport and reload commands follow the held state
//! directly (they are idempotent).
//!
//! UI visibility toggles are edge-triggered here, in the mapper: F1, F2 and
//! F3 fire only on the poll where their key goes down. Whatever consumes
//! [`UiToggles`] can flip its state on every `true` it receives and needs no
//! debounce of its own.

use std::collections::VecDeque;

use crate::transport::{PlayState, TransportCommands, FINE_SEEK_STEP, SEEK_STEP};

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorKey {
    /// Transport modifier (Alt).
    Modifier,
    /// Fine-step modifier (Shift).
    Secondary,
    /// Reload modifier (Ctrl).
    Control,
    Up,
    Down,
    Left,
    Right,
    S,
    Escape,
    F1,
    F2,
    F3,
}

impl EditorKey {
    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Set of keys held at the moment of a poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    bits: u16,
}

impl KeySnapshot {
    pub fn from_keys(keys: &[EditorKey]) -> Self {
        let mut snapshot = Self::default();
        for &key in keys {
            snapshot.set(key, true);
        }
        snapshot
    }

    pub fn is_down(&self, key: EditorKey) -> bool {
        self.bits & key.bit() != 0
    }

    pub fn set(&mut self, key: EditorKey, down: bool) {
        if down {
            self.bits |= key.bit();
        } else {
            self.bits &= !key.bit();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// Platform capability that reports the currently held keys.
pub trait InputSource {
    fn snapshot(&mut self) -> KeySnapshot;
}

/// Replays a fixed sequence of snapshots, then reports nothing held.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<KeySnapshot>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = KeySnapshot>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, keys: &[EditorKey]) {
        self.frames.push_back(KeySnapshot::from_keys(keys));
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn snapshot(&mut self) -> KeySnapshot {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Visibility toggles forwarded to whatever draws the editor overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiToggles {
    pub controls: bool,
    pub stats: bool,
    pub seek_bar: bool,
}

impl UiToggles {
    pub fn any(&self) -> bool {
        self.controls || self.stats || self.seek_bar
    }
}

/// Everything derived from a single input poll.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameCommands {
    pub transport: TransportCommands,
    pub reload: bool,
    pub ui: UiToggles,
    pub quit: bool,
}

#[derive(Debug, Default)]
pub struct InputEventMapper {
    previous: KeySnapshot,
}

impl InputEventMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls `source` once and derives this frame's commands.
    pub fn poll(&mut self, source: &mut dyn InputSource) -> FrameCommands {
        let snapshot = source.snapshot();
        let commands = self.map(snapshot);
        self.previous = snapshot;
        commands
    }

    fn map(&self, keys: KeySnapshot) -> FrameCommands {
        let mut commands = FrameCommands::default();

        if keys.is_down(EditorKey::Modifier) {
            // play wins when both are held
            commands.transport.play_state = if keys.is_down(EditorKey::Up) {
                Some(PlayState::Playing)
            } else if keys.is_down(EditorKey::Down) {
                Some(PlayState::Paused)
            } else {
                None
            };
            commands.transport.seek_delta = seek_delta(keys);
        }

        commands.reload = keys.is_down(EditorKey::Control) && keys.is_down(EditorKey::S);

        commands.ui = UiToggles {
            controls: self.pressed(keys, EditorKey::F1),
            stats: self.pressed(keys, EditorKey::F2),
            seek_bar: self.pressed(keys, EditorKey::F3),
        };
        commands.quit = keys.is_down(EditorKey::Escape);
        commands
    }

    fn pressed(&self, keys: KeySnapshot, key: EditorKey) -> bool {
        keys.is_down(key) && !self.previous.is_down(key)
    }
}

/// Net seek for the held arrow keys; `None` when nothing moves.
fn seek_delta(keys: KeySnapshot) -> Option<f64> {
    let step = if keys.is_down(EditorKey::Secondary) {
        FINE_SEEK_STEP
    } else {
        SEEK_STEP
    };
    let forward = keys.is_down(EditorKey::Right);
    let backward = keys.is_down(EditorKey::Left);
    match (forward, backward) {
        (true, false) => Some(step),
        (false, true) => Some(-step),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EditorKey::*;

    fn poll(keys: &[EditorKey]) -> FrameCommands {
        let mut mapper = InputEventMapper::new();
        let mut input = ScriptedInput::default();
        input.push(keys);
        mapper.poll(&mut input)
    }

    #[test]
    fn nothing_held_maps_to_nothing() {
        assert_eq!(poll(&[]), FrameCommands::default());
    }

    #[test]
    fn transport_keys_need_the_modifier() {
        let commands = poll(&[Down, Right]);
        assert_eq!(commands.transport, TransportCommands::default());

        let commands = poll(&[Modifier, Down]);
        assert_eq!(commands.transport.play_state, Some(PlayState::Paused));

        let commands = poll(&[Modifier, Up]);
        assert_eq!(commands.transport.play_state, Some(PlayState::Playing));
    }

    #[test]
    fn play_wins_when_both_held() {
        let commands = poll(&[Modifier, Up, Down]);
        assert_eq!(commands.transport.play_state, Some(PlayState::Playing));
    }

    #[test]
    fn seek_steps_follow_secondary_modifier() {
        assert_eq!(poll(&[Modifier, Right]).transport.seek_delta, Some(1.0));
        assert_eq!(poll(&[Modifier, Left]).transport.seek_delta, Some(-1.0));
        assert_eq!(
            poll(&[Modifier, Secondary, Right]).transport.seek_delta,
            Some(0.1)
        );
        assert_eq!(
            poll(&[Modifier, Secondary, Left]).transport.seek_delta,
            Some(-0.1)
        );
    }

    #[test]
    fn opposing_seek_keys_cancel() {
        assert_eq!(poll(&[Modifier, Left, Right]).transport.seek_delta, None);
        assert_eq!(
            poll(&[Modifier, Secondary, Left, Right]).transport.seek_delta,
            None
        );
    }

    #[test]
    fn reload_needs_control_and_s() {
        assert!(poll(&[Control, S]).reload);
        assert!(!poll(&[S]).reload);
        assert!(!poll(&[Modifier, S]).reload);
    }

    #[test]
    fn ui_toggles_fire_on_press_only() {
        let mut mapper = InputEventMapper::new();
        let mut input = ScriptedInput::new([
            KeySnapshot::from_keys(&[F2]),
            KeySnapshot::from_keys(&[F2]),
            KeySnapshot::default(),
            KeySnapshot::from_keys(&[F2, F1]),
        ]);
        assert!(mapper.poll(&mut input).ui.stats);
        assert!(!mapper.poll(&mut input).ui.any());
        assert!(!mapper.poll(&mut input).ui.any());
        let commands = mapper.poll(&mut input);
        assert!(commands.ui.stats && commands.ui.controls && !commands.ui.seek_bar);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn escape_requests_quit() {
        assert!(poll(&[Escape]).quit);
    }
}
