//! Board glue
//!
//! Adapts embassy-rp peripherals to the `disbadge-hal` traits.
//!
//! Pin assignments (Raspberry Pi Pico):
//! - GPIO0/1: UART0 TX/RX to the BLE UART module
//! - GPIO2..9: keypad B, A, Start, Select, Right, Down, Up, Left (active low)
//! - GPIO15: BLE module "connected" status (active high)
//! - GPIO22: external speaker amplifier enable
//! - GPIO25: status LED

use disbadge_hal::{InputPin, OutputPin, SerialRx, SerialTx};
use embassy_rp::gpio::{Input, Output};
use embedded_io::{Read, ReadReady, Write};

/// Scratch size used when draining stale input
const DRAIN_CHUNK: usize = 32;

/// Serial port over a blocking embedded-io stream
///
/// `ReadReady` only says whether something is pending, so
/// `bytes_waiting` reports 0 or 1; the transport re-queries after each byte.
pub struct IoSerial<T> {
    io: T,
}

impl<T> IoSerial<T> {
    pub fn new(io: T) -> Self {
        Self { io }
    }
}

impl<T: Write> SerialTx for IoSerial<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), T::Error> {
        self.io.write_all(data)
    }

    fn flush(&mut self) -> Result<(), T::Error> {
        self.io.flush()
    }
}

impl<T: Read + ReadReady> SerialRx for IoSerial<T> {
    type Error = T::Error;

    fn bytes_waiting(&mut self) -> Result<usize, T::Error> {
        Ok(usize::from(self.io.read_ready()?))
    }

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, T::Error> {
        self.io.read(buf)
    }

    fn reset_input_buffer(&mut self) {
        let mut scratch = [0u8; DRAIN_CHUNK];
        while let Ok(true) = self.io.read_ready() {
            if !matches!(self.io.read(&mut scratch), Ok(n) if n > 0) {
                break;
            }
        }
    }
}

/// Input pin wrapper
pub struct RpInput(pub Input<'static>);

impl InputPin for RpInput {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// Output pin wrapper
pub struct RpOutput(pub Output<'static>);

impl OutputPin for RpOutput {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }
}
