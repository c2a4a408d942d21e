//! Board-agnostic core logic for the Disbadge notification badge
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Scoped message transport over a serial link
//! - Notification state machine and its render commands
//! - Cooperative scheduler pass
//! - Button mapping
//! - Configuration types

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod input;
pub mod scheduler;
pub mod state;
pub mod transport;

pub use config::{BadgeConfig, ConfigError};
pub use input::Button;
pub use scheduler::{DeviceSettings, LinkStats, PassReport, Renderer, Scheduler};
pub use state::{DeviceState, NotificationMachine, RenderCommand};
pub use transport::{Transport, TransportError};
