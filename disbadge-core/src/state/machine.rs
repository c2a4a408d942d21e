//! Notification state machine
//!
//! Everything the badge shows, plays and animates is a function of the
//! current state and an event. Each event returns the ordered render
//! commands for the transition it caused.
//!
//! ```text
//!            message                tick
//!   Idle ───────────────▶ Alerting ──────▶ Pinned
//!    ▲ ▲                     │               │ │
//!    │ │   different message │               │ │ dismiss
//!    │ └─────────────────────┴───────────────┘ ▼
//!    │       (replacement pending)       Dismissing
//!    │                                         │
//!    └─────────────── tick / timer ◀───────────┘
//! ```

use disbadge_protocol::Message;

use super::events::Event;
use super::render::{AlertKind, Commands, RenderCommand, SplashKind};
use crate::config::BadgeConfig;

/// Device states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// No message; idle splash shown
    Idle,
    /// A new message arrived; alert triggered once
    Alerting,
    /// Message on screen, animation looping, pin timer running
    Pinned,
    /// Dismissed; returns to Idle on the next tick
    Dismissing,
}

/// What the screen currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Blank,
    Splash(SplashKind),
    Message,
}

/// Message lifecycle state machine
#[derive(Debug)]
pub struct NotificationMachine {
    state: DeviceState,
    current: Option<Message>,
    /// Preempting message, alerted on the next Idle tick
    pending: Option<Message>,
    pin_deadline: Option<u64>,
    pin_time_ms: u64,
    muted: bool,
    muted_alert_ms: u32,
    animating: bool,
    screen: Screen,
}

impl NotificationMachine {
    /// Create a machine in `Idle`
    pub fn new(pin_time_ms: u64, muted_alert_ms: u32, muted: bool) -> Self {
        Self {
            state: DeviceState::Idle,
            current: None,
            pending: None,
            pin_deadline: None,
            pin_time_ms,
            muted,
            muted_alert_ms,
            animating: false,
            screen: Screen::Blank,
        }
    }

    /// Create a machine from badge configuration
    pub fn from_config(config: &BadgeConfig) -> Self {
        Self::new(config.pin_time_ms(), config.muted_alert_ms, config.muted)
    }

    /// Power-on commands
    pub fn start(&mut self) -> Commands {
        let mut out = Commands::new();
        self.emit(&mut out, RenderCommand::ShowSplash(SplashKind::Loading));
        out
    }

    /// Feed a received message
    pub fn on_message_received(&mut self, message: Message) -> Commands {
        self.handle(Event::MessageReceived(message))
    }

    /// Advance time-based logic
    pub fn tick(&mut self, now_ms: u64) -> Commands {
        self.handle(Event::Tick(now_ms))
    }

    /// Feed a dismiss button press; no-op outside `Pinned`
    pub fn on_dismiss_pressed(&mut self) -> Commands {
        self.handle(Event::DismissPressed)
    }

    /// Drop everything and show the connecting splash
    pub fn on_link_lost(&mut self) -> Commands {
        self.handle(Event::LinkLost)
    }

    /// Process an event and return the resulting commands
    pub fn handle(&mut self, event: Event) -> Commands {
        let mut out = Commands::new();

        match (self.state, event) {
            (_, Event::LinkLost) => {
                if self.animating {
                    self.emit(&mut out, RenderCommand::StopAnimation);
                }
                self.pending = None;
                self.clear_message();
                self.emit(&mut out, RenderCommand::ShowSplash(SplashKind::Connecting));
            }

            // Idle transitions
            (DeviceState::Idle, Event::MessageReceived(message)) => {
                // A newer arrival supersedes a replacement that never alerted
                self.pending = None;
                self.begin_alert(message, &mut out);
            }
            (DeviceState::Idle, Event::Tick(_)) => match self.pending.take() {
                Some(message) => self.begin_alert(message, &mut out),
                None => {
                    if self.screen != Screen::Splash(SplashKind::NoMessage) {
                        self.emit(&mut out, RenderCommand::ShowSplash(SplashKind::NoMessage));
                    }
                }
            },

            // Alerting transitions
            (DeviceState::Alerting, Event::Tick(now_ms)) => {
                self.emit(&mut out, RenderCommand::ShowMessage);
                self.pin_deadline = Some(now_ms.saturating_add(self.pin_time_ms));
                self.state = DeviceState::Pinned;
            }

            // Pinned transitions
            (DeviceState::Pinned, Event::DismissPressed) => {
                self.emit(&mut out, RenderCommand::StopAnimation);
                self.pin_deadline = None;
                self.state = DeviceState::Dismissing;
            }
            (DeviceState::Pinned, Event::Tick(now_ms)) => {
                if self.pin_deadline.is_some_and(|deadline| now_ms >= deadline) {
                    self.emit(&mut out, RenderCommand::StopAnimation);
                    self.clear_message();
                    self.emit(&mut out, RenderCommand::ShowSplash(SplashKind::NoMessage));
                }
            }

            // New message while one is owned
            (DeviceState::Alerting | DeviceState::Pinned, Event::MessageReceived(message)) => {
                if self.current.as_ref() != Some(&message) {
                    self.preempt(message, &mut out);
                }
            }

            // Dismissing transitions
            (DeviceState::Dismissing, Event::Tick(_)) => {
                self.clear_message();
                self.emit(&mut out, RenderCommand::ShowSplash(SplashKind::NoMessage));
            }
            (DeviceState::Dismissing, Event::MessageReceived(message)) => {
                self.clear_message();
                self.begin_alert(message, &mut out);
            }

            // Dismiss only acts while pinned
            (_, Event::DismissPressed) => {}
        }

        out
    }

    /// Current state
    pub fn current_state(&self) -> DeviceState {
        self.state
    }

    /// Message being alerted or shown
    pub fn current_message(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    /// Replacement waiting for the next Idle tick
    pub fn pending_message(&self) -> Option<&Message> {
        self.pending.as_ref()
    }

    /// Monotonic time (ms) at which the pinned message expires
    pub fn pin_deadline(&self) -> Option<u64> {
        self.pin_deadline
    }

    /// Check if an LED animation is running
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Suppress alert sounds
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Check if alert sounds are suppressed
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn begin_alert(&mut self, message: Message, out: &mut Commands) {
        let alert = AlertKind::for_command(message.command_type);

        self.emit(out, RenderCommand::ShowSplash(alert.splash));
        self.emit(out, RenderCommand::StartAnimation(alert.animation));
        if self.muted {
            self.emit(out, RenderCommand::Wait(self.muted_alert_ms));
        } else {
            self.emit(out, RenderCommand::PlaySound(alert.sound));
        }

        self.current = Some(message);
        self.pin_deadline = None;
        self.state = DeviceState::Alerting;
    }

    fn preempt(&mut self, message: Message, out: &mut Commands) {
        if self.animating {
            self.emit(out, RenderCommand::StopAnimation);
        }
        self.emit(out, RenderCommand::ShowSplash(SplashKind::Loading));
        self.clear_message();
        self.pending = Some(message);
    }

    fn clear_message(&mut self) {
        self.current = None;
        self.pin_deadline = None;
        self.state = DeviceState::Idle;
    }

    fn emit(&mut self, out: &mut Commands, command: RenderCommand) {
        match command {
            RenderCommand::ShowSplash(kind) => self.screen = Screen::Splash(kind),
            RenderCommand::ShowMessage => self.screen = Screen::Message,
            RenderCommand::StartAnimation(_) => self.animating = true,
            RenderCommand::StopAnimation => self.animating = false,
            RenderCommand::PlaySound(_) | RenderCommand::Wait(_) => {}
        }
        let pushed = out.push(command);
        debug_assert!(pushed.is_ok(), "transition produced too many commands");
    }
}
