//! Disbadge wire protocol
//!
//! This crate defines how notification messages travel from the bot link
//! to the badge. The serial link carries length-prefixed JSON frames:
//!
//! ```text
//! ┌──────────────────┬────┬──────────────────────────────────────────┐
//! │ LENGTH (ASCII)   │ \n │ PAYLOAD (exactly LENGTH bytes of JSON)   │
//! └──────────────────┴────┴──────────────────────────────────────────┘
//!
//! 48\n{"message":"hi","user":"alice#0001","cmdtype":0}
//! ```
//!
//! The payload object carries `message`, `user` and `cmdtype`. The HTTP
//! ingress used by the network bot link carries the same three fields as a
//! form body (see [`form`]), and [`routes`] maps device-control requests to
//! typed values.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod form;
pub mod frame;
pub mod message;
pub mod routes;

pub use form::{decode_form, encode_form, FormError};
pub use frame::{
    encode_frame, FrameDecoder, FramingError, DEFAULT_MAX_FRAME_LEN, MAX_LENGTH_LINE,
};
pub use message::{CommandType, Message};
pub use routes::{parse_request, ControlRequest, RouteError, SoundSetting};
