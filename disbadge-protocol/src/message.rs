//! Notification message model and its JSON payload

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::frame::FramingError;

// Command type codes on the wire
const CODE_PING: u8 = 0;
const CODE_CHEER: u8 = 1;
const CODE_HYPE: u8 = 2;
const CODE_NONE: u8 = 3;

/// Slash command used to send a message
///
/// Selects which alert variant (splash, sound, animation) the badge plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandType {
    /// `/ping`
    Ping,
    /// `/cheer`
    Cheer,
    /// `/hype`
    Hype,
    /// No command (plain message or "no active message")
    #[default]
    None,
}

impl CommandType {
    /// Parse a wire code
    ///
    /// Unknown codes are not an error: they fall back to [`CommandType::None`],
    /// which the badge renders with the hype alert.
    pub fn from_code(code: u64) -> Self {
        match code {
            c if c == CODE_PING as u64 => CommandType::Ping,
            c if c == CODE_CHEER as u64 => CommandType::Cheer,
            c if c == CODE_HYPE as u64 => CommandType::Hype,
            _ => CommandType::None,
        }
    }

    /// Parse a textual wire code such as `"1"`
    pub fn from_code_str(code: &str) -> Self {
        code.trim()
            .parse::<u64>()
            .map(Self::from_code)
            .unwrap_or_default()
    }

    /// Convert to wire code
    pub fn code(self) -> u8 {
        match self {
            CommandType::Ping => CODE_PING,
            CommandType::Cheer => CODE_CHEER,
            CommandType::Hype => CODE_HYPE,
            CommandType::None => CODE_NONE,
        }
    }

    fn from_json_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_u64().map(Self::from_code).unwrap_or_default(),
            Value::String(s) => Self::from_code_str(s),
            _ => CommandType::None,
        }
    }
}

/// A notification received from the bot link
///
/// Two messages are equal when their text and sender match. The command
/// type does not take part in equality: a re-delivered message with a
/// different command is still the same message.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Message body
    pub text: String,
    /// Sender handle, including the `#NNNN` discriminator when present
    pub sender: String,
    /// Command used to send the message
    pub command_type: CommandType,
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.sender == other.sender
    }
}

impl Eq for Message {}

/// Outgoing JSON payload
#[derive(Serialize)]
struct WirePayloadRef<'a> {
    message: &'a str,
    user: &'a str,
    cmdtype: u8,
}

/// Incoming JSON payload
#[derive(Deserialize)]
struct WirePayload {
    message: String,
    user: String,
    #[serde(default)]
    cmdtype: Value,
}

impl Message {
    /// Create a new message
    pub fn new(text: impl Into<String>, sender: impl Into<String>, command_type: CommandType) -> Self {
        Self {
            text: text.into(),
            sender: sender.into(),
            command_type,
        }
    }

    /// Sender name without the trailing `#NNNN` discriminator
    pub fn username(&self) -> &str {
        let bytes = self.sender.as_bytes();
        if bytes.len() >= 5 {
            let split = bytes.len() - 5;
            let (name, tag) = bytes.split_at(split);
            if tag[0] == b'#' && tag[1..].iter().all(u8::is_ascii_digit) {
                // The tag is pure ASCII, so `split` is a char boundary
                return &self.sender[..name.len()];
            }
        }
        &self.sender
    }

    /// Serialize to the JSON payload carried inside a frame
    pub fn to_json(&self) -> Result<Vec<u8>, FramingError> {
        let payload = WirePayloadRef {
            message: &self.text,
            user: &self.sender,
            cmdtype: self.command_type.code(),
        };
        serde_json::to_vec(&payload).map_err(|_| FramingError::BadPayload)
    }

    /// Parse a JSON payload
    ///
    /// `message` and `user` are required strings; `cmdtype` may be an
    /// integer, a numeric string, or absent.
    pub fn from_json(bytes: &[u8]) -> Result<Self, FramingError> {
        let payload: WirePayload =
            serde_json::from_slice(bytes).map_err(|_| FramingError::BadPayload)?;

        Ok(Self {
            command_type: CommandType::from_json_value(&payload.cmdtype),
            text: payload.message,
            sender: payload.user,
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.text)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Message {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{=str}: {=str} ({})",
            self.sender.as_str(),
            self.text.as_str(),
            self.command_type
        )
    }
}
