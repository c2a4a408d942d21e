//! Badge buttons
//!
//! The keypad reports numbered keys; this maps them to the names printed
//! on the badge.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of keys on the badge keypad
pub const KEY_COUNT: usize = 8;

/// Named badge buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Button {
    #[default]
    B,
    A,
    Start,
    Select,
    Right,
    Down,
    Up,
    Left,
}

impl Button {
    /// All buttons in key-number order
    pub const ALL: [Button; KEY_COUNT] = [
        Button::B,
        Button::A,
        Button::Start,
        Button::Select,
        Button::Right,
        Button::Down,
        Button::Up,
        Button::Left,
    ];

    /// Map a keypad key number to a button
    pub fn from_key_number(key: u8) -> Option<Self> {
        Self::ALL.get(key as usize).copied()
    }

    /// Keypad key number of this button
    pub const fn key_number(self) -> u8 {
        match self {
            Button::B => 0,
            Button::A => 1,
            Button::Start => 2,
            Button::Select => 3,
            Button::Right => 4,
            Button::Down => 5,
            Button::Up => 6,
            Button::Left => 7,
        }
    }
}
