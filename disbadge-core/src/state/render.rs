//! Render command vocabulary
//!
//! The state machine never touches hardware. It describes what the badge
//! should show, play and animate as a short ordered list of commands, and
//! the [`Renderer`](crate::scheduler::Renderer) carries them out.

use disbadge_protocol::CommandType;
use heapless::Vec;

/// Most commands a single event can produce
pub const MAX_COMMANDS: usize = 4;

/// Ordered commands produced by one event
pub type Commands = Vec<RenderCommand, MAX_COMMANDS>;

/// Full-screen splash images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SplashKind {
    /// Power-on, also shown while a replacement message is loaded
    Loading,
    /// Link is down
    Connecting,
    /// Idle, nothing to show
    NoMessage,
    /// `/ping` alert
    Ping,
    /// `/cheer` alert
    Cheer,
    /// `/hype` alert
    Hype,
}

/// LED strip animations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationKind {
    /// Red pulse
    Ping,
    /// Rainbow cycle
    Cheer,
    /// Rainbow with sparkles
    Hype,
}

impl AnimationKind {
    /// Animation period in milliseconds
    pub const fn period_ms(self) -> u32 {
        match self {
            AnimationKind::Ping => 2000,
            AnimationKind::Cheer | AnimationKind::Hype => 750,
        }
    }
}

/// Alert sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundKind {
    Ping,
    Cheer,
    Hype,
}

/// The alert variant selected by a message's command type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertKind {
    pub splash: SplashKind,
    pub animation: AnimationKind,
    pub sound: SoundKind,
}

impl AlertKind {
    /// Select the alert for a command type
    ///
    /// Messages without a command use the hype alert.
    pub const fn for_command(command: CommandType) -> Self {
        match command {
            CommandType::Ping => Self {
                splash: SplashKind::Ping,
                animation: AnimationKind::Ping,
                sound: SoundKind::Ping,
            },
            CommandType::Cheer => Self {
                splash: SplashKind::Cheer,
                animation: AnimationKind::Cheer,
                sound: SoundKind::Cheer,
            },
            CommandType::Hype | CommandType::None => Self {
                splash: SplashKind::Hype,
                animation: AnimationKind::Hype,
                sound: SoundKind::Hype,
            },
        }
    }
}

/// A side effect requested by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderCommand {
    /// Replace the screen with a splash
    ShowSplash(SplashKind),
    /// Show the current message text and sender
    ShowMessage,
    /// Start looping an LED animation
    StartAnimation(AnimationKind),
    /// Stop the LED animation and blank the strip
    StopAnimation,
    /// Play an alert sound to completion
    PlaySound(SoundKind),
    /// Hold for the given time (stands in for a sound when muted)
    Wait(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_kind_mapping() {
        assert_eq!(AlertKind::for_command(CommandType::Ping).splash, SplashKind::Ping);
        assert_eq!(AlertKind::for_command(CommandType::Cheer).sound, SoundKind::Cheer);
        assert_eq!(
            AlertKind::for_command(CommandType::None),
            AlertKind::for_command(CommandType::Hype)
        );
    }

    #[test]
    fn test_animation_periods() {
        assert_eq!(AnimationKind::Ping.period_ms(), 2000);
        assert_eq!(AnimationKind::Cheer.period_ms(), 750);
        assert_eq!(AnimationKind::Hype.period_ms(), 750);
    }
}
