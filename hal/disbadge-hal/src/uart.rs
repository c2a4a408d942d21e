//! Serial link abstractions
//!
//! The badge talks to its host over a byte-oriented duplex stream: a
//! hardware UART bridged to a BLE UART module, or a USB serial adapter.
//! Nothing here knows about frames; that is `disbadge-protocol`'s job.

/// Serial transmitter
pub trait SerialTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the link
    ///
    /// Blocks until all data has been accepted or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Serial receiver
pub trait SerialRx {
    /// Error type for receive operations
    type Error;

    /// Number of received bytes waiting to be read
    ///
    /// Never blocks. A non-zero count means the next `read_blocking` call
    /// returns without waiting.
    fn bytes_waiting(&mut self) -> Result<usize, Self::Error>;

    /// Read data from the link
    ///
    /// Blocks until at least one byte is available. Returns the number of
    /// bytes written into `buf`; `Ok(0)` means the stream has ended.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Discard everything buffered on the receive side
    fn reset_input_buffer(&mut self);
}
