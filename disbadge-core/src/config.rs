//! Badge configuration
//!
//! Settings are read from `badge.toml` on the host at build time and baked
//! into the firmware image. Every field has a default, so an empty file is
//! a valid configuration.
//!
//! ```toml
//! pin_time_s = 600
//! muted = false
//! external_speaker = false
//! max_frame_len = 1024
//! muted_alert_ms = 2000
//! dismiss_button = "b"
//! baudrate = 115200
//! ```

use core::fmt;

use disbadge_protocol::DEFAULT_MAX_FRAME_LEN;

use crate::input::Button;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest accepted `max_frame_len`
pub const MIN_FRAME_LEN: usize = 64;

/// Largest accepted `max_frame_len`
pub const MAX_FRAME_LEN: usize = 16 * 1024;

/// Longest accepted muted alert hold
pub const MAX_MUTED_ALERT_MS: u32 = 60_000;

/// Badge settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct BadgeConfig {
    /// How long a message stays pinned (seconds)
    pub pin_time_s: u32,
    /// Start with alert sounds suppressed
    pub muted: bool,
    /// Route audio to the external speaker
    pub external_speaker: bool,
    /// Largest accepted frame payload (bytes)
    pub max_frame_len: usize,
    /// Alert hold when muted, in place of the sound (ms)
    pub muted_alert_ms: u32,
    /// Button that dismisses a pinned message
    pub dismiss_button: Button,
    /// Serial link baud rate
    pub baudrate: u32,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            pin_time_s: 600,
            muted: false,
            external_speaker: false,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            muted_alert_ms: 2000,
            dismiss_button: Button::B,
            baudrate: 115_200,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML could not be parsed into a configuration
    Parse,
    /// `pin_time_s` is zero
    ZeroPinTime,
    /// `max_frame_len` outside `MIN_FRAME_LEN..=MAX_FRAME_LEN`
    FrameLenOutOfRange,
    /// `muted_alert_ms` above `MAX_MUTED_ALERT_MS`
    MutedAlertTooLong,
    /// `baudrate` is zero
    ZeroBaudrate,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse => f.write_str("invalid badge configuration"),
            ConfigError::ZeroPinTime => f.write_str("pin_time_s must be at least 1"),
            ConfigError::FrameLenOutOfRange => write!(
                f,
                "max_frame_len must be between {} and {}",
                MIN_FRAME_LEN, MAX_FRAME_LEN
            ),
            ConfigError::MutedAlertTooLong => {
                write!(f, "muted_alert_ms must be at most {}", MAX_MUTED_ALERT_MS)
            }
            ConfigError::ZeroBaudrate => f.write_str("baudrate must be non-zero"),
        }
    }
}

impl BadgeConfig {
    /// Pin duration in milliseconds
    pub fn pin_time_ms(&self) -> u64 {
        self.pin_time_s as u64 * 1000
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pin_time_s == 0 {
            return Err(ConfigError::ZeroPinTime);
        }
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&self.max_frame_len) {
            return Err(ConfigError::FrameLenOutOfRange);
        }
        if self.muted_alert_ms > MAX_MUTED_ALERT_MS {
            return Err(ConfigError::MutedAlertTooLong);
        }
        if self.baudrate == 0 {
            return Err(ConfigError::ZeroBaudrate);
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BadgeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.pin_time_ms(), 600_000);
        assert_eq!(config.dismiss_button, Button::B);
    }

    #[test]
    fn test_validate_ranges() {
        let base = BadgeConfig::default();

        let zero_pin = BadgeConfig { pin_time_s: 0, ..base.clone() };
        assert_eq!(zero_pin.validate(), Err(ConfigError::ZeroPinTime));

        let tiny = BadgeConfig { max_frame_len: 8, ..base.clone() };
        assert_eq!(tiny.validate(), Err(ConfigError::FrameLenOutOfRange));

        let huge = BadgeConfig { max_frame_len: MAX_FRAME_LEN + 1, ..base.clone() };
        assert_eq!(huge.validate(), Err(ConfigError::FrameLenOutOfRange));

        let long_wait = BadgeConfig { muted_alert_ms: 60_001, ..base.clone() };
        assert_eq!(long_wait.validate(), Err(ConfigError::MutedAlertTooLong));

        let no_baud = BadgeConfig { baudrate: 0, ..base };
        assert_eq!(no_baud.validate(), Err(ConfigError::ZeroBaudrate));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml() {
        let config = BadgeConfig::from_toml(
            r#"
            pin_time_s = 30
            muted = true
            dismiss_button = "start"
            "#,
        )
        .unwrap();

        assert_eq!(config.pin_time_s, 30);
        assert!(config.muted);
        assert_eq!(config.dismiss_button, Button::Start);
        assert_eq!(config.max_frame_len, DEFAULT_MAX_FRAME_LEN);
        assert_eq!(config.baudrate, 115_200);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml_errors() {
        assert_eq!(BadgeConfig::from_toml(""), Ok(BadgeConfig::default()));
        assert_eq!(BadgeConfig::from_toml("pin_time_s = 0"), Err(ConfigError::ZeroPinTime));
        assert_eq!(BadgeConfig::from_toml("pin_time_s = \"ten\""), Err(ConfigError::Parse));
        assert_eq!(BadgeConfig::from_toml("volume = 3"), Err(ConfigError::Parse));
        assert_eq!(BadgeConfig::from_toml("dismiss_button = \"x\""), Err(ConfigError::Parse));
    }
}
