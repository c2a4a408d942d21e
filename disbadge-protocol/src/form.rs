//! Form body codec for the HTTP ingress
//!
//! The network bot link posts messages as `key=value` pairs joined by `&`.
//! Keys and values are escaped character by character: ASCII letters and
//! digits pass through, every other character is written as its decimal
//! code point between dashes.
//!
//! ```text
//! message=hi-33-&user=alice-35-0001&cmdtype=1
//!           ^^^^           ^^^^
//!           '!'            '#'
//! ```

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::message::{CommandType, Message};

const FIELD_MESSAGE: &str = "message";
const FIELD_USER: &str = "user";
const FIELD_CMDTYPE: &str = "cmdtype";

/// Errors that can occur while decoding a form body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormError {
    /// Body is not valid UTF-8
    InvalidUtf8,
    /// A pair has no `=` or more than one
    MalformedPair,
    /// An escape sequence has no closing dash
    UnterminatedEscape,
    /// An escape sequence is not a valid code point
    InvalidEscape,
    /// `message` or `user` is absent
    MissingField,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FormError::InvalidUtf8 => "form body is not UTF-8",
            FormError::MalformedPair => "malformed key=value pair",
            FormError::UnterminatedEscape => "unterminated escape sequence",
            FormError::InvalidEscape => "invalid escape sequence",
            FormError::MissingField => "missing message or user field",
        };
        f.write_str(text)
    }
}

/// Escape a string for a form body
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('-');
            out.push_str(&(c as u32).to_string());
            out.push('-');
        }
    }
    out
}

/// Reverse [`encode_text`]
pub fn decode_text(text: &str) -> Result<String, FormError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('-') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('-').ok_or(FormError::UnterminatedEscape)?;

        let code: u32 = after[..end].parse().map_err(|_| FormError::InvalidEscape)?;
        out.push(char::from_u32(code).ok_or(FormError::InvalidEscape)?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Encode a message as a form body
pub fn encode_form(message: &Message) -> String {
    format!(
        "{}={}&{}={}&{}={}",
        FIELD_MESSAGE,
        encode_text(&message.text),
        FIELD_USER,
        encode_text(&message.sender),
        FIELD_CMDTYPE,
        message.command_type.code()
    )
}

/// Decode a form body into a message
///
/// Unknown keys are ignored. A missing or unparsable `cmdtype` falls back to
/// [`CommandType::None`], as on the serial link.
pub fn decode_form(body: &[u8]) -> Result<Message, FormError> {
    let body = core::str::from_utf8(body).map_err(|_| FormError::InvalidUtf8)?;
    let pairs = decode_pairs(body)?;

    let mut text = None;
    let mut sender = None;
    let mut command_type = CommandType::None;

    for (key, value) in pairs {
        match key.as_str() {
            FIELD_MESSAGE => text = Some(value),
            FIELD_USER => sender = Some(value),
            FIELD_CMDTYPE => command_type = CommandType::from_code_str(&value),
            _ => {}
        }
    }

    Ok(Message {
        text: text.ok_or(FormError::MissingField)?,
        sender: sender.ok_or(FormError::MissingField)?,
        command_type,
    })
}

/// Split and unescape `key=value&key=value`
fn decode_pairs(body: &str) -> Result<Vec<(String, String)>, FormError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    body.split('&')
        .map(|pair| {
            let mut parts = pair.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => Ok((decode_text(key)?, decode_text(value)?)),
                _ => Err(FormError::MalformedPair),
            }
        })
        .collect()
}
