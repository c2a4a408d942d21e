//! Badge configuration
//!
//! `build.rs` validates `badge.toml` on the host and generates
//! `badge_config()` from it; nothing is parsed on the device.

use disbadge_core::{BadgeConfig, Button};

include!(concat!(env!("OUT_DIR"), "/badge_config.rs"));
