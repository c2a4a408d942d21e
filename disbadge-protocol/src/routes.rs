//! Device-control routes
//!
//! The network bot link drives the badge with a handful of POST requests.
//! This module maps a request line and body onto a [`ControlRequest`]; the
//! HTTP server itself lives outside this crate.
//!
//! | Route              | Effect                                   |
//! |--------------------|------------------------------------------|
//! | `POST /message`    | Deliver a form-encoded message           |
//! | `POST /activate`   | Mark the connection as active            |
//! | `POST /sound/on`   | Unmute alerts                            |
//! | `POST /sound/off`  | Mute alerts                              |

use core::fmt;

use crate::form::{decode_form, FormError};
use crate::message::Message;

/// Alert sound setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundSetting {
    On,
    Off,
}

impl SoundSetting {
    /// True when alerts should stay silent
    pub fn is_muted(self) -> bool {
        matches!(self, SoundSetting::Off)
    }
}

/// A parsed device-control request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// New message from the bot
    Message(Message),
    /// The bot link is up
    Activate,
    /// Change the alert sound setting
    Sound(SoundSetting),
}

/// Route parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteError {
    /// No route for this path
    NotFound,
    /// Route exists but only accepts POST
    MethodNotAllowed,
    /// `/sound/<setting>` with a setting other than `on`/`off`
    UnknownSetting,
    /// `/message` body could not be decoded
    BadBody(FormError),
}

impl From<FormError> for RouteError {
    fn from(err: FormError) -> Self {
        RouteError::BadBody(err)
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NotFound => f.write_str("no such route"),
            RouteError::MethodNotAllowed => f.write_str("method not allowed"),
            RouteError::UnknownSetting => f.write_str("unknown sound setting"),
            RouteError::BadBody(err) => write!(f, "bad message body: {}", err),
        }
    }
}

/// Map a request onto a control request
///
/// The query string and a trailing slash are ignored. Methods compare
/// case-insensitively.
pub fn parse_request(method: &str, path: &str, body: &[u8]) -> Result<ControlRequest, RouteError> {
    let path = path.split('?').next().unwrap_or_default();
    let path = path.strip_suffix('/').unwrap_or(path);

    let request = match path {
        "/message" => Route::Message,
        "/activate" => Route::Activate,
        _ => match path.strip_prefix("/sound/") {
            Some("on") => Route::Sound(SoundSetting::On),
            Some("off") => Route::Sound(SoundSetting::Off),
            Some(_) => Route::UnknownSound,
            None => return Err(RouteError::NotFound),
        },
    };

    if !method.eq_ignore_ascii_case("POST") {
        return Err(RouteError::MethodNotAllowed);
    }

    match request {
        Route::Message => Ok(ControlRequest::Message(decode_form(body)?)),
        Route::Activate => Ok(ControlRequest::Activate),
        Route::Sound(setting) => Ok(ControlRequest::Sound(setting)),
        Route::UnknownSound => Err(RouteError::UnknownSetting),
    }
}

enum Route {
    Message,
    Activate,
    Sound(SoundSetting),
    UnknownSound,
}
