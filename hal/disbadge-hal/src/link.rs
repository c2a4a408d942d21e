//! Link liveness
//!
//! The badge only reads from the serial port while the link is up. What
//! "up" means belongs to the connectivity layer: a BLE connection, an
//! activation request from the bot link, or simply a wire.

use core::sync::atomic::{AtomicBool, Ordering};

/// Reports whether the host link is currently usable
pub trait LinkStatus {
    /// Check if the link is connected
    fn is_connected(&self) -> bool;
}

impl<T: LinkStatus + ?Sized> LinkStatus for &T {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

/// Link flag flipped by an external connectivity collaborator
///
/// Usable from a `static`: the BLE stack (or the `/activate` handler) sets
/// it, the transport reads it.
#[derive(Debug)]
pub struct LinkFlag {
    connected: AtomicBool,
}

impl Default for LinkFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

impl LinkFlag {
    /// Create a flag with the given initial state
    pub const fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
        }
    }

    /// Mark the link as connected or disconnected
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }
}

impl LinkStatus for LinkFlag {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

/// A wired link (USB serial, direct UART) that is always up
#[derive(Debug, Clone, Copy, Default)]
pub struct Wired;

impl LinkStatus for Wired {
    fn is_connected(&self) -> bool {
        true
    }
}
