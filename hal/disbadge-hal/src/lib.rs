//! Disbadge Hardware Abstraction Layer
//!
//! Traits implemented by the board support code so that the badge logic in
//! `disbadge-core` never touches a peripheral directly.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  disbadge-core (transport, scheduler)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  disbadge-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  disbadge-firmware (board glue)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::SerialRx`], [`uart::SerialTx`] - Serial link to the host
//! - [`link::LinkStatus`] - Liveness of the link (BLE connection, activation)
//! - [`gpio::InputPin`], [`gpio::OutputPin`] - Digital I/O
//! - [`keypad::Keypad`] - Button events

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod keypad;
pub mod link;
pub mod uart;

pub use gpio::{InputPin, OutputPin};
pub use keypad::{KeyEvent, Keypad, PinKeypad};
pub use link::{LinkFlag, LinkStatus, Wired};
pub use uart::{SerialRx, SerialTx};
