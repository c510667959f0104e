//! Input event types and key mappings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Simplified key representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Unknown,
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Unknown,
        }
    }
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Self {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
            shift: mods.contains(KeyModifiers::SHIFT),
        }
    }
}

/// A parsed key binding such as `"Ctrl+r"`, `"Space"` or `"?"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyBinding {
    /// Parse a binding string. Returns `None` for an unknown key name.
    pub fn parse(binding: &str) -> Option<Self> {
        let mut modifiers = Modifiers::default();
        let mut key = None;

        // "+" alone is a key, not a separator.
        if binding == "+" {
            return Some(Self {
                key: Key::Char('+'),
                modifiers,
            });
        }

        for part in binding.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                _ => key = Some(Self::parse_key(part)?),
            }
        }

        key.map(|key| Self { key, modifiers })
    }

    fn parse_key(name: &str) -> Option<Key> {
        let key = match name.to_lowercase().as_str() {
            "enter" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "tab" => Key::Tab,
            "backtab" => Key::BackTab,
            "space" => Key::Char(' '),
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            s if s.len() > 1 && s.starts_with('f') => Key::F(s[1..].parse().ok()?),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// A processed input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self {
            key: Key::from(event.code),
            modifiers: Modifiers::from(event.modifiers),
        }
    }
}

impl InputEvent {
    /// Create a new input event.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Get the character if this is a character input.
    pub fn char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) => Some(c),
            _ => None,
        }
    }

    /// Check if this matches a key binding string (e.g., "Ctrl+q", "Enter").
    ///
    /// Shift is ignored for character keys, since it is already reflected in
    /// the character itself (`?`, `+`, `R`). Letters match either case.
    pub fn matches(&self, binding: &str) -> bool {
        let Some(expected) = KeyBinding::parse(binding) else {
            return false;
        };

        if self.modifiers.ctrl != expected.modifiers.ctrl
            || self.modifiers.alt != expected.modifiers.alt
        {
            return false;
        }

        match (self.key, expected.key) {
            (Key::Char(actual), Key::Char(wanted)) => {
                actual == wanted || actual.to_ascii_lowercase() == wanted.to_ascii_lowercase()
            }
            (actual, wanted) => actual == wanted && self.modifiers.shift == expected.modifiers.shift,
        }
    }
}
