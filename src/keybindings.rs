//! Customizable keybindings.
//!
//! Hosts translate raw key presses into [`KeyChord`]s and look them up here
//! to get the [`KeyCommand`] the controller understands. Bindings are part
//! of the persisted configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::controller::KeyCommand;

/// Keys that can be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Space,
    Tab,
    Enter,
    Escape,
    Delete,
    Backspace,
    BracketLeft,
    BracketRight,
}

impl KeyCode {
    /// Display string for this key.
    pub fn name(&self) -> &'static str {
        match self {
            KeyCode::A => "A",
            KeyCode::B => "B",
            KeyCode::C => "C",
            KeyCode::D => "D",
            KeyCode::E => "E",
            KeyCode::F => "F",
            KeyCode::G => "G",
            KeyCode::H => "H",
            KeyCode::I => "I",
            KeyCode::J => "J",
            KeyCode::K => "K",
            KeyCode::L => "L",
            KeyCode::M => "M",
            KeyCode::N => "N",
            KeyCode::O => "O",
            KeyCode::P => "P",
            KeyCode::Q => "Q",
            KeyCode::R => "R",
            KeyCode::S => "S",
            KeyCode::T => "T",
            KeyCode::U => "U",
            KeyCode::V => "V",
            KeyCode::W => "W",
            KeyCode::X => "X",
            KeyCode::Y => "Y",
            KeyCode::Z => "Z",
            KeyCode::Key0 => "0",
            KeyCode::Key1 => "1",
            KeyCode::Key2 => "2",
            KeyCode::Key3 => "3",
            KeyCode::Key4 => "4",
            KeyCode::Key5 => "5",
            KeyCode::Key6 => "6",
            KeyCode::Key7 => "7",
            KeyCode::Key8 => "8",
            KeyCode::Key9 => "9",
            KeyCode::Space => "Space",
            KeyCode::Tab => "Tab",
            KeyCode::Enter => "Enter",
            KeyCode::Escape => "Esc",
            KeyCode::Delete => "Del",
            KeyCode::Backspace => "Backspace",
            KeyCode::BracketLeft => "[",
            KeyCode::BracketRight => "]",
        }
    }
}

/// A key plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: KeyCode,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyChord {
    /// A key with no modifiers.
    pub const fn plain(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub const fn ctrl(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
        }
    }

    pub const fn ctrl_shift(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: true,
            shift: true,
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        f.write_str(self.key.name())
    }
}

/// Maximum number of labels that can have hotkeys (0-9 keys).
pub const MAX_LABEL_HOTKEYS: usize = 10;

/// Keybinding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub undo: KeyChord,
    pub redo: KeyChord,
    /// Alternative redo binding
    pub redo_alt: KeyChord,
    pub delete: KeyChord,
    pub cancel: KeyChord,
    pub commit: KeyChord,
    pub copy: KeyChord,
    pub paste: KeyChord,
    pub toggle_mask_mode: KeyChord,
    pub label_picker: KeyChord,
    pub next_label: KeyChord,
    pub previous_label: KeyChord,
    pub toggle_trash: KeyChord,
    pub toggle_requires_review: KeyChord,

    /// Hotkeys for label selection (indices 0-9 map to labels 1-10).
    /// None means no hotkey assigned for that slot
    pub label_hotkeys: [Option<KeyCode>; MAX_LABEL_HOTKEYS],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: KeyChord::ctrl(KeyCode::Z),
            redo: KeyChord::ctrl(KeyCode::Y),
            redo_alt: KeyChord::ctrl_shift(KeyCode::Z),
            delete: KeyChord::plain(KeyCode::Delete),
            cancel: KeyChord::plain(KeyCode::Escape),
            commit: KeyChord::plain(KeyCode::Enter),
            copy: KeyChord::ctrl(KeyCode::C),
            paste: KeyChord::ctrl(KeyCode::V),
            toggle_mask_mode: KeyChord::plain(KeyCode::M),
            label_picker: KeyChord::plain(KeyCode::Space),
            next_label: KeyChord::plain(KeyCode::BracketRight),
            previous_label: KeyChord::plain(KeyCode::BracketLeft),
            toggle_trash: KeyChord::plain(KeyCode::T),
            toggle_requires_review: KeyChord::plain(KeyCode::R),

            // Default label hotkeys: 1-9, 0 for labels 1-10
            label_hotkeys: [
                Some(KeyCode::Key1),
                Some(KeyCode::Key2),
                Some(KeyCode::Key3),
                Some(KeyCode::Key4),
                Some(KeyCode::Key5),
                Some(KeyCode::Key6),
                Some(KeyCode::Key7),
                Some(KeyCode::Key8),
                Some(KeyCode::Key9),
                Some(KeyCode::Key0),
            ],
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    fn command_chords(&self) -> [(KeyChord, KeyCommand); 14] {
        [
            (self.undo, KeyCommand::Undo),
            (self.redo, KeyCommand::Redo),
            (self.redo_alt, KeyCommand::Redo),
            (self.delete, KeyCommand::Delete),
            (self.cancel, KeyCommand::Cancel),
            (self.commit, KeyCommand::Commit),
            (self.copy, KeyCommand::Copy),
            (self.paste, KeyCommand::Paste),
            (self.toggle_mask_mode, KeyCommand::ToggleMaskMode),
            (self.label_picker, KeyCommand::OpenLabelPicker),
            (self.next_label, KeyCommand::NextLabel),
            (self.previous_label, KeyCommand::PreviousLabel),
            (self.toggle_trash, KeyCommand::ToggleTrash),
            (self.toggle_requires_review, KeyCommand::ToggleRequiresReview),
        ]
    }

    /// Get the command that corresponds to a key press, if any.
    ///
    /// Label hotkeys only match without modifiers.
    pub fn command_for(&self, chord: KeyChord) -> Option<KeyCommand> {
        if let Some((_, command)) = self.command_chords().into_iter().find(|(c, _)| *c == chord) {
            return Some(command);
        }
        if chord.ctrl || chord.shift {
            return None;
        }
        self.label_index_for_key(chord.key)
            .map(KeyCommand::SelectLabel)
    }

    /// Get the label index (0-based) that corresponds to a key press, if any.
    pub fn label_index_for_key(&self, key: KeyCode) -> Option<usize> {
        self.label_hotkeys
            .iter()
            .position(|hotkey| *hotkey == Some(key))
    }

    /// Get the hotkey for a label at a specific index, if any.
    pub fn key_for_label_index(&self, index: usize) -> Option<KeyCode> {
        self.label_hotkeys.get(index).copied().flatten()
    }

    /// Set the hotkey for a label index.
    pub fn set_label_key(&mut self, index: usize, key: Option<KeyCode>) {
        if let Some(slot) = self.label_hotkeys.get_mut(index) {
            *slot = key;
        }
    }

    /// Check if a chord is already used by any binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, chord: KeyChord) -> Option<String> {
        if let Some((_, command)) = self.command_chords().into_iter().find(|(c, _)| *c == chord) {
            return Some(format!("{:?}", command));
        }
        if chord.ctrl || chord.shift {
            return None;
        }
        self.label_index_for_key(chord.key)
            .map(|i| format!("Label {}", i + 1))
    }
}

/// Convert an optional KeyCode to a display string.
pub fn optional_key_to_string(key: Option<KeyCode>) -> &'static str {
    match key {
        Some(k) => k.name(),
        None => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_commands() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.command_for(KeyChord::ctrl(KeyCode::Z)),
            Some(KeyCommand::Undo)
        );
        assert_eq!(
            bindings.command_for(KeyChord::ctrl_shift(KeyCode::Z)),
            Some(KeyCommand::Redo)
        );
        assert_eq!(
            bindings.command_for(KeyChord::plain(KeyCode::Escape)),
            Some(KeyCommand::Cancel)
        );
        assert_eq!(bindings.command_for(KeyChord::plain(KeyCode::Z)), None);
    }

    #[test]
    fn test_label_hotkeys() {
        let mut bindings = KeyBindings::default();
        assert_eq!(
            bindings.command_for(KeyChord::plain(KeyCode::Key3)),
            Some(KeyCommand::SelectLabel(2))
        );
        assert_eq!(
            bindings.command_for(KeyChord::plain(KeyCode::Key0)),
            Some(KeyCommand::SelectLabel(9))
        );
        // Modifiers disable label hotkeys
        assert_eq!(bindings.command_for(KeyChord::ctrl(KeyCode::Key3)), None);

        bindings.set_label_key(2, None);
        bindings.set_label_key(42, Some(KeyCode::Q));
        assert_eq!(bindings.command_for(KeyChord::plain(KeyCode::Key3)), None);
        assert_eq!(optional_key_to_string(bindings.key_for_label_index(2)), "-");
    }

    #[test]
    fn test_conflicts() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.key_conflict(KeyChord::plain(KeyCode::M)).as_deref(),
            Some("ToggleMaskMode")
        );
        assert_eq!(
            bindings.key_conflict(KeyChord::plain(KeyCode::Key1)).as_deref(),
            Some("Label 1")
        );
        assert_eq!(bindings.key_conflict(KeyChord::plain(KeyCode::W)), None);
    }

    #[test]
    fn test_chord_display() {
        assert_eq!(KeyChord::ctrl_shift(KeyCode::Z).to_string(), "Ctrl+Shift+Z");
        assert_eq!(KeyChord::plain(KeyCode::Escape).to_string(), "Esc");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"undo": {"key": "U", "ctrl": true}}"#;
        let bindings: KeyBindings = serde_json::from_str(json).expect("valid bindings");
        assert_eq!(
            bindings.command_for(KeyChord::ctrl(KeyCode::U)),
            Some(KeyCommand::Undo)
        );
        assert_eq!(
            bindings.command_for(KeyChord::ctrl(KeyCode::C)),
            Some(KeyCommand::Copy)
        );
    }
}
