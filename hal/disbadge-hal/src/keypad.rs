//! Keypad abstractions
//!
//! Buttons are reported as numbered keys with press/release edges. Key
//! numbering follows the badge's shift-register keypad (key 0 is `B`,
//! key 7 is `Left`); `disbadge-core` maps numbers to named buttons.

use crate::gpio::InputPin;

/// A key changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// Key number (0-based)
    pub key: u8,
    /// True on press, false on release
    pub pressed: bool,
}

impl KeyEvent {
    /// Create a press event
    pub const fn pressed(key: u8) -> Self {
        Self { key, pressed: true }
    }

    /// Create a release event
    pub const fn released(key: u8) -> Self {
        Self {
            key,
            pressed: false,
        }
    }
}

/// Source of key events
pub trait Keypad {
    /// Return the next pending key event, if any
    ///
    /// Must not block.
    fn poll_event(&mut self) -> Option<KeyEvent>;
}

/// Keypad built from one input pin per key
///
/// Each poll samples every pin and reports the first key whose level
/// changed since the previous poll. Further changes are reported on
/// later polls, one event per call.
pub struct PinKeypad<P, const N: usize> {
    pins: [P; N],
    pressed: [bool; N],
    active_high: bool,
}

impl<P: InputPin, const N: usize> PinKeypad<P, N> {
    /// Create a keypad; `active_high` is the pin level of a pressed key
    pub fn new(pins: [P; N], active_high: bool) -> Self {
        Self {
            pins,
            pressed: [false; N],
            active_high,
        }
    }

    /// Check if a key is currently held
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed.get(key as usize).copied().unwrap_or(false)
    }
}

impl<P: InputPin, const N: usize> Keypad for PinKeypad<P, N> {
    fn poll_event(&mut self) -> Option<KeyEvent> {
        for (index, pin) in self.pins.iter().enumerate() {
            let down = pin.is_high() == self.active_high;
            if down != self.pressed[index] {
                self.pressed[index] = down;
                return Some(KeyEvent {
                    key: index as u8,
                    pressed: down,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct FakePin<'a>(&'a Cell<bool>);

    impl InputPin for FakePin<'_> {
        fn is_high(&self) -> bool {
            self.0.get()
        }
    }

    #[test]
    fn test_press_and_release_edges() {
        let level = Cell::new(false);
        let mut keypad = PinKeypad::new([FakePin(&level)], true);

        assert_eq!(keypad.poll_event(), None);

        level.set(true);
        assert_eq!(keypad.poll_event(), Some(KeyEvent::pressed(0)));
        assert!(keypad.is_pressed(0));
        // Held key does not repeat
        assert_eq!(keypad.poll_event(), None);

        level.set(false);
        assert_eq!(keypad.poll_event(), Some(KeyEvent::released(0)));
        assert!(!keypad.is_pressed(0));
    }

    #[test]
    fn test_active_low_pins() {
        let level = Cell::new(true);
        let mut keypad = PinKeypad::new([FakePin(&level)], false);

        assert_eq!(keypad.poll_event(), None);
        level.set(false);
        assert_eq!(keypad.poll_event(), Some(KeyEvent::pressed(0)));
    }

    #[test]
    fn test_one_event_per_poll() {
        let a = Cell::new(true);
        let b = Cell::new(true);
        let mut keypad = PinKeypad::new([FakePin(&a), FakePin(&b)], true);

        assert_eq!(keypad.poll_event(), Some(KeyEvent::pressed(0)));
        assert_eq!(keypad.poll_event(), Some(KeyEvent::pressed(1)));
        assert_eq!(keypad.poll_event(), None);
        assert!(!keypad.is_pressed(5));
    }
}
