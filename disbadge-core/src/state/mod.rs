//! Notification state machine
//!
//! Decides, from received messages and elapsed time, what the badge should
//! be showing and sounding. The machine is explicit, finite and
//! deterministic; its side effects are render commands.

pub mod events;
pub mod machine;
pub mod render;

pub use events::Event;
pub use machine::{DeviceState, NotificationMachine};
pub use render::{
    AlertKind, AnimationKind, Commands, RenderCommand, SoundKind, SplashKind, MAX_COMMANDS,
};
