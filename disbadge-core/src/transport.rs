//! Framed message transport over a serial link
//!
//! A [`Transport`] borrows a serial port and a link-status source for one
//! connection session. It sends and receives whole [`Message`]s using the
//! length-prefixed frame codec. Dropping it flushes stale input from the
//! port so the next session starts on a frame boundary.

use core::fmt;

use disbadge_hal::{LinkStatus, SerialRx, SerialTx};
use disbadge_protocol::{encode_frame, FrameDecoder, FramingError, Message, MAX_LENGTH_LINE};

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The current frame was dropped; later frames still decode
    Framing(FramingError),
    /// Link down or port failed; the session is over
    LinkLost,
}

impl From<FramingError> for TransportError {
    fn from(err: FramingError) -> Self {
        TransportError::Framing(err)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Framing(err) => write!(f, "framing error: {}", err),
            TransportError::LinkLost => f.write_str("link lost"),
        }
    }
}

/// Scoped message transport
pub struct Transport<'a, S, L>
where
    S: SerialRx + SerialTx,
    L: LinkStatus,
{
    serial: &'a mut S,
    link: &'a L,
    decoder: FrameDecoder,
}

impl<'a, S, L> Transport<'a, S, L>
where
    S: SerialRx + SerialTx,
    L: LinkStatus,
{
    /// Open a session with the default frame size limit
    pub fn new(serial: &'a mut S, link: &'a L) -> Self {
        Self::with_decoder(serial, link, FrameDecoder::new())
    }

    /// Open a session that rejects payloads above `max_frame_len`
    pub fn with_max_frame_len(serial: &'a mut S, link: &'a L, max_frame_len: usize) -> Self {
        Self::with_decoder(serial, link, FrameDecoder::with_max_frame_len(max_frame_len))
    }

    fn with_decoder(serial: &'a mut S, link: &'a L, decoder: FrameDecoder) -> Self {
        Self {
            serial,
            link,
            decoder,
        }
    }

    /// Check if the link reports a peer
    pub fn connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Send a message, blocking until the port accepts the whole frame
    pub fn send(&mut self, message: &Message) -> Result<(), TransportError> {
        self.ensure_connected()?;
        let frame = encode_frame(message)?;
        self.serial
            .write_blocking(&frame)
            .map_err(|_| TransportError::LinkLost)?;
        self.serial.flush().map_err(|_| TransportError::LinkLost)
    }

    /// Check if at least one byte is pending
    ///
    /// A hint only: a pending byte does not mean a whole frame is there.
    pub fn has_frame_available(&mut self) -> bool {
        matches!(self.serial.bytes_waiting(), Ok(n) if n > 0)
    }

    /// Block until one complete message is decoded
    ///
    /// Framing errors end the call; the caller may call again and decoding
    /// resumes with the next frame.
    pub fn receive(&mut self) -> Result<Message, TransportError> {
        loop {
            self.ensure_connected()?;
            let byte = self.read_byte()?;
            if let Some(message) = self.decoder.feed(byte)? {
                return Ok(message);
            }
        }
    }

    /// Decode from already-pending bytes without blocking
    ///
    /// Returns at most one message. A partial frame is kept for the next
    /// call. At most one largest-frame's worth of bytes is read per call,
    /// so a busy link cannot hold the caller.
    pub fn poll(&mut self) -> Result<Option<Message>, TransportError> {
        self.ensure_connected()?;
        let mut budget = self.decoder.max_frame_len() + MAX_LENGTH_LINE + 1;

        while budget > 0 {
            let waiting = self
                .serial
                .bytes_waiting()
                .map_err(|_| TransportError::LinkLost)?;
            if waiting == 0 {
                break;
            }

            for _ in 0..waiting.min(budget) {
                budget -= 1;
                let byte = self.read_byte()?;
                if let Some(message) = self.decoder.feed(byte)? {
                    return Ok(Some(message));
                }
            }
        }
        Ok(None)
    }

    /// Check if a frame is partially received
    pub fn is_mid_frame(&self) -> bool {
        self.decoder.is_mid_frame()
    }

    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.link.is_connected() {
            Ok(())
        } else {
            Err(TransportError::LinkLost)
        }
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut byte = [0u8; 1];
        match self.serial.read_blocking(&mut byte) {
            Ok(1) => Ok(byte[0]),
            // Zero bytes means the port closed
            _ => Err(TransportError::LinkLost),
        }
    }
}

impl<S, L> Drop for Transport<'_, S, L>
where
    S: SerialRx + SerialTx,
    L: LinkStatus,
{
    fn drop(&mut self) {
        self.decoder.reset();
        self.serial.reset_input_buffer();
    }
}
