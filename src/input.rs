//! Held-key tracking
//!
//! Key events only ever add or remove entries from a set; the frame driver
//! reads the set once per frame. Whatever was pressed last wins.

use std::collections::HashSet;

use crate::sim::TickInput;

/// A driving control a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Accelerate,
    Brake,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::Left,
        Control::Right,
        Control::Accelerate,
        Control::Brake,
    ];

    /// Keys (as reported by `KeyboardEvent.key`, normalized) bound to this control
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Control::Left => &["ArrowLeft", "a"],
            Control::Right => &["ArrowRight", "d"],
            Control::Accelerate => &["ArrowUp", "w"],
            Control::Brake => &["ArrowDown", "s"],
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = normalize_key(key);
        Self::ALL
            .into_iter()
            .find(|control| control.keys().contains(&key.as_str()))
    }
}

/// Single-character keys are case-folded so Shift+A releases what A pressed
fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

/// Whether the browser's default action (page scroll) should be suppressed
pub fn is_scroll_key(key: &str) -> bool {
    matches!(key, "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight")
}

/// Set of keys currently held down
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: HashSet<String>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns true if the event's default should be prevented.
    pub fn press(&mut self, key: &str) -> bool {
        if Control::from_key(key).is_some() {
            self.keys.insert(normalize_key(key));
        }
        is_scroll_key(key)
    }

    pub fn release(&mut self, key: &str) {
        self.keys.remove(&normalize_key(key));
    }

    /// Forget everything (window lost focus, keyups will never arrive)
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_held(&self, control: Control) -> bool {
        control.keys().iter().any(|k| self.keys.contains(*k))
    }

    /// Snapshot for this frame's tick
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.is_held(Control::Left),
            right: self.is_held(Control::Right),
            accelerate: self.is_held(Control::Accelerate),
            brake: self.is_held(Control::Brake),
        }
    }
}
