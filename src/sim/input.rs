//! Keyboard input: held-key state for the game and the secret sequence
//! that reveals it.

use std::collections::VecDeque;

use super::tick::TickInput;

/// Keys the application reacts to, by physical position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    KeyA,
    KeyB,
    KeyD,
    Space,
    Enter,
    Escape,
}

impl KeyCode {
    /// Parse a DOM `KeyboardEvent.code`; unknown codes yield `None`
    pub fn from_dom_code(code: &str) -> Option<Self> {
        Some(match code {
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "KeyA" => KeyCode::KeyA,
            "KeyB" => KeyCode::KeyB,
            "KeyD" => KeyCode::KeyD,
            "Space" => KeyCode::Space,
            "Enter" | "NumpadEnter" => KeyCode::Enter,
            "Escape" => KeyCode::Escape,
            _ => return None,
        })
    }
}

/// ↑ ↑ ↓ ↓ ← → ← → B A
pub const SECRET_SEQUENCE: [KeyCode; 10] = [
    KeyCode::ArrowUp,
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
    KeyCode::ArrowDown,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::KeyB,
    KeyCode::KeyA,
];

/// Sliding window over the most recent key codes
#[derive(Debug, Clone)]
pub struct SequenceRecognizer {
    pattern: Vec<KeyCode>,
    window: VecDeque<KeyCode>,
}

impl Default for SequenceRecognizer {
    fn default() -> Self {
        Self::new(&SECRET_SEQUENCE)
    }
}

impl SequenceRecognizer {
    pub fn new(pattern: &[KeyCode]) -> Self {
        Self {
            pattern: pattern.to_vec(),
            window: VecDeque::with_capacity(pattern.len()),
        }
    }

    /// Record one key; true exactly when the window now equals the pattern
    ///
    /// The window is cleared on a match so the trigger fires once per
    /// complete entry.
    pub fn push(&mut self, key: KeyCode) -> bool {
        if self.pattern.is_empty() {
            return false;
        }
        if self.window.len() == self.pattern.len() {
            self.window.pop_front();
        }
        self.window.push_back(key);
        if self.window.iter().eq(self.pattern.iter()) {
            self.window.clear();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Keys currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    left: bool,
    right: bool,
    fire: bool,
    arrow_left: bool,
    arrow_right: bool,
    key_a: bool,
    key_d: bool,
}

impl HeldKeys {
    pub fn press(&mut self, key: KeyCode) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.set(key, false);
    }

    fn set(&mut self, key: KeyCode, down: bool) {
        match key {
            KeyCode::ArrowLeft => self.arrow_left = down,
            KeyCode::ArrowRight => self.arrow_right = down,
            KeyCode::KeyA => self.key_a = down,
            KeyCode::KeyD => self.key_d = down,
            KeyCode::Space => self.fire = down,
            _ => return,
        }
        self.left = self.arrow_left || self.key_a;
        self.right = self.arrow_right || self.key_d;
    }

    /// Release everything (focus loss, game closed)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Input for the next tick
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            fire: self.fire,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dom_codes() {
        assert_eq!(KeyCode::from_dom_code("ArrowUp"), Some(KeyCode::ArrowUp));
        assert_eq!(KeyCode::from_dom_code("KeyB"), Some(KeyCode::KeyB));
        assert_eq!(KeyCode::from_dom_code("KeyZ"), None);
        assert_eq!(KeyCode::from_dom_code(""), None);
    }

    #[test]
    fn test_exact_sequence_triggers_once() {
        let mut rec = SequenceRecognizer::default();
        let hits: Vec<bool> = SECRET_SEQUENCE.iter().map(|k| rec.push(*k)).collect();
        assert_eq!(hits.iter().filter(|h| **h).count(), 1);
        assert!(hits[9]);
        // Window was cleared, a trailing A does not retrigger
        assert!(!rec.push(KeyCode::KeyA));
    }

    #[test]
    fn test_noise_before_sequence_is_tolerated() {
        let mut rec = SequenceRecognizer::default();
        for key in [KeyCode::Enter, KeyCode::ArrowUp, KeyCode::Space] {
            rec.push(key);
        }
        let fired = SECRET_SEQUENCE.iter().any(|k| rec.push(*k));
        assert!(fired);
    }

    #[test]
    fn test_interrupted_sequence_does_not_trigger() {
        let mut rec = SequenceRecognizer::default();
        for (i, key) in SECRET_SEQUENCE.iter().enumerate() {
            if i == 5 {
                assert!(!rec.push(KeyCode::Space));
            }
            assert!(!rec.push(*key));
        }
    }

    #[test]
    fn test_held_keys_merge_aliases() {
        let mut held = HeldKeys::default();
        held.press(KeyCode::ArrowLeft);
        held.press(KeyCode::KeyA);
        held.release(KeyCode::ArrowLeft);
        assert!(held.snapshot().left);
        held.release(KeyCode::KeyA);
        assert!(!held.snapshot().left);

        held.press(KeyCode::KeyD);
        held.press(KeyCode::Space);
        assert_eq!(
            held.snapshot(),
            TickInput {
                left: false,
                right: true,
                fire: true
            }
        );
        held.clear();
        assert_eq!(held.snapshot(), TickInput::default());
    }
}
