//! Frame encoding and decoding for the serial link.
//!
//! Frame format:
//! - LENGTH: payload byte count as ASCII decimal digits
//! - `\n`: line terminator
//! - PAYLOAD: exactly LENGTH bytes of UTF-8 JSON
//!
//! There is no start byte and no checksum. The decoder resynchronises on
//! length lines: a length that does not parse or exceeds the frame limit is
//! dropped and the very next bytes are read as a new length line. A line
//! that runs past [`MAX_LENGTH_LINE`] is payload seen out of step; bytes are
//! then dropped up to the next `\n`, and the digits directly in front of it
//! are taken as the next length, since a payload never ends in a digit and
//! the following length line is written right after it.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use heapless::Vec as LineBuf;

use crate::message::Message;

/// Default limit on the declared payload length
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024;

/// Longest accepted length line, terminator excluded
///
/// Ten digits cover any `u32`; the slack allows a `\r` or padding.
pub const MAX_LENGTH_LINE: usize = 12;

/// Errors that can occur while decoding a frame
///
/// Both are recoverable: the offending frame is discarded and decoding
/// continues with the next length line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingError {
    /// Length line is not an unsigned decimal number, or declares more
    /// than the frame limit
    BadLength,
    /// Payload is not UTF-8 JSON with the required fields
    BadPayload,
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::BadLength => f.write_str("bad frame length"),
            FramingError::BadPayload => f.write_str("bad frame payload"),
        }
    }
}

/// Encode a message as a complete frame
pub fn encode_frame(message: &Message) -> Result<Vec<u8>, FramingError> {
    let payload = message.to_json()?;
    let mut frame = format!("{}\n", payload.len()).into_bytes();
    frame.extend_from_slice(&payload);
    Ok(frame)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Collecting the length line
    ReadingLength,
    /// Collecting payload bytes
    ReadingPayload { expected: usize },
    /// Dropping bytes up to the next `\n`, keeping trailing digits
    Resyncing,
}

/// Incremental frame decoder
///
/// Bytes go in one at a time; a [`Message`] comes out only once its length
/// line and the whole payload have been seen. Partial frames are kept
/// across calls and never exposed.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    line: LineBuf<u8, MAX_LENGTH_LINE>,
    buffer: Vec<u8>,
    filled: usize,
    max_frame_len: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder with the default frame limit
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    /// Create a decoder that rejects payloads longer than `max_frame_len`
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            state: DecodeState::ReadingLength,
            line: LineBuf::new(),
            buffer: Vec::new(),
            filled: 0,
            max_frame_len,
        }
    }

    /// Largest payload this decoder accepts
    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Check if a frame is partially decoded
    pub fn is_mid_frame(&self) -> bool {
        !matches!(self.state, DecodeState::ReadingLength) || !self.line.is_empty()
    }

    /// Drop any partial frame
    ///
    /// The scratch buffer keeps its allocation.
    pub fn reset(&mut self) {
        self.state = DecodeState::ReadingLength;
        self.line.clear();
        self.filled = 0;
    }

    /// Feed a single byte to the decoder
    ///
    /// Returns `Ok(Some(message))` when a frame completes, `Ok(None)` when
    /// more bytes are needed, or `Err` when the current frame is dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Message>, FramingError> {
        match self.state {
            DecodeState::ReadingLength => {
                if byte == b'\n' {
                    return self.finish_length_line();
                }
                if self.line.push(byte).is_err() {
                    self.line.clear();
                    self.state = DecodeState::Resyncing;
                    return Err(FramingError::BadLength);
                }
                Ok(None)
            }
            DecodeState::Resyncing => {
                if byte == b'\n' {
                    let length = parse_length(&self.line);
                    self.line.clear();
                    self.state = DecodeState::ReadingLength;
                    // Anything unusable here was already reported
                    if let Some(len) = length.filter(|&len| len > 0 && len <= self.max_frame_len) {
                        self.start_payload(len);
                    }
                } else if byte.is_ascii_digit() || byte.is_ascii_whitespace() {
                    if self.line.push(byte).is_err() {
                        self.line.clear();
                    }
                } else {
                    self.line.clear();
                }
                Ok(None)
            }
            DecodeState::ReadingPayload { expected } => {
                self.buffer[self.filled] = byte;
                self.filled += 1;
                if self.filled < expected {
                    return Ok(None);
                }

                self.state = DecodeState::ReadingLength;
                self.filled = 0;
                Message::from_json(&self.buffer).map(Some)
            }
        }
    }

    fn finish_length_line(&mut self) -> Result<Option<Message>, FramingError> {
        let length = parse_length(&self.line);
        self.line.clear();

        match length {
            None => Err(FramingError::BadLength),
            Some(0) => Err(FramingError::BadPayload),
            Some(len) if len > self.max_frame_len => Err(FramingError::BadLength),
            Some(len) => {
                self.start_payload(len);
                Ok(None)
            }
        }
    }

    /// Size the scratch buffer to exactly `len` bytes and start collecting
    ///
    /// Same-size frames reuse the buffer without touching the allocator.
    fn start_payload(&mut self, len: usize) {
        if self.buffer.len() != len {
            self.buffer.resize(len, 0);
        }
        self.filled = 0;
        self.state = DecodeState::ReadingPayload { expected: len };
    }
}

/// Parse a length line as an unsigned decimal number
fn parse_length(line: &[u8]) -> Option<usize> {
    let start = line.iter().position(|b| !b.is_ascii_whitespace())?;
    let end = line.iter().rposition(|b| !b.is_ascii_whitespace())? + 1;
    let digits = &line[start..end];

    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    digits.iter().try_fold(0usize, |acc, &digit| {
        acc.checked_mul(10)?.checked_add((digit - b'0') as usize)
    })
}
