//! GPIO pin abstractions
//!
//! The badge uses plain digital pins for its buttons, the status LED and
//! the amplifier enable line of an external speaker.

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high
    fn set_high(&mut self);

    /// Drive the pin low
    fn set_low(&mut self);

    /// Drive the pin to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high
    fn is_high(&self) -> bool;
}
