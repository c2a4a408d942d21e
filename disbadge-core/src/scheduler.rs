//! Cooperative scheduler loop
//!
//! The badge has two activities: pulling frames off the link and driving
//! the display. [`Scheduler::poll_once`] runs one bounded pass of both and
//! returns; the caller yields between passes.
//!
//! Pass order:
//! 1. Link check (a lost link shows the connecting splash once)
//! 2. Transport step (at most one message)
//! 3. Input step (at most one key event)
//! 4. Tick step (pin timer, pending replacement, idle splash)
//! 5. Renderer refresh
//!
//! The alert sound blocks the renderer, so `now_ms` is stale once it has
//! played. A message that raised an alert skips the tick step; it is pinned
//! by the next pass, whose clock reading comes after the sound.

use disbadge_hal::{Keypad, LinkStatus, SerialRx, SerialTx};
use disbadge_protocol::{ControlRequest, FramingError, Message};

use crate::config::BadgeConfig;
use crate::input::Button;
use crate::state::{Commands, DeviceState, NotificationMachine, RenderCommand};
use crate::transport::{Transport, TransportError};

/// Carries out render commands on real hardware
pub trait Renderer {
    /// Execute one command
    ///
    /// `message` is the machine's current message after the transition
    /// that produced the command.
    fn execute(&mut self, command: RenderCommand, message: Option<&Message>);

    /// Called once at the end of every pass
    ///
    /// Advances running animations.
    fn refresh(&mut self) {}
}

/// Link counters since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Messages decoded
    pub messages: u32,
    /// Frames dropped for bad length
    pub bad_length: u32,
    /// Frames dropped for bad payload
    pub bad_payload: u32,
    /// Times the link went down
    pub link_losses: u32,
}

impl LinkStats {
    /// Total dropped frames
    pub fn framing_errors(&self) -> u32 {
        self.bad_length.saturating_add(self.bad_payload)
    }

    fn record(&mut self, err: FramingError) {
        match err {
            FramingError::BadLength => self.bad_length = self.bad_length.saturating_add(1),
            FramingError::BadPayload => self.bad_payload = self.bad_payload.saturating_add(1),
        }
    }
}

/// Outcome of one scheduler pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PassReport {
    /// The link is down; nothing else ran
    pub link_lost: bool,
    /// The link came back since the previous pass
    pub link_restored: bool,
    /// A message was decoded and fed to the machine
    pub message_received: bool,
    /// A frame was dropped
    pub framing_error: Option<FramingError>,
    /// The dismiss button was pressed
    pub dismiss_pressed: bool,
    /// Render commands executed
    pub commands: usize,
}

/// Device settings changed through control requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSettings {
    /// Alerts hold silently instead of playing a sound
    pub muted: bool,
    /// Audio goes to the external speaker
    pub external_speaker: bool,
    /// The bot link announced itself
    pub activated: bool,
}

/// Drives the notification machine from the link and keypad
#[derive(Debug)]
pub struct Scheduler {
    machine: NotificationMachine,
    dismiss_button: Button,
    external_speaker: bool,
    activated: bool,
    link_up: bool,
    stats: LinkStats,
}

impl Scheduler {
    /// Create a scheduler from badge configuration
    pub fn new(config: &BadgeConfig) -> Self {
        Self {
            machine: NotificationMachine::from_config(config),
            dismiss_button: config.dismiss_button,
            external_speaker: config.external_speaker,
            activated: false,
            // Start "up" so a link that is down at boot shows the splash
            link_up: true,
            stats: LinkStats::default(),
        }
    }

    /// Show the power-on splash
    pub fn start<R: Renderer>(&mut self, renderer: &mut R) -> usize {
        let commands = self.machine.start();
        self.run(commands, renderer)
    }

    /// Run one cooperative pass
    pub fn poll_once<S, L, K, R>(
        &mut self,
        transport: &mut Transport<'_, S, L>,
        keypad: &mut K,
        renderer: &mut R,
        now_ms: u64,
    ) -> PassReport
    where
        S: SerialRx + SerialTx,
        L: LinkStatus,
        K: Keypad,
        R: Renderer,
    {
        let mut report = PassReport::default();

        // Link check
        if !transport.connected() {
            self.lose_link(renderer, &mut report);
            return report;
        }
        if !self.link_up {
            self.link_up = true;
            report.link_restored = true;
        }

        // Transport step
        let mut alerted = false;
        match transport.poll() {
            Ok(Some(message)) => {
                self.stats.messages = self.stats.messages.saturating_add(1);
                report.message_received = true;
                let commands = self.machine.on_message_received(message);
                alerted = !commands.is_empty()
                    && self.machine.current_state() == DeviceState::Alerting;
                report.commands += self.run(commands, renderer);
            }
            Ok(None) => {}
            Err(TransportError::Framing(err)) => {
                self.stats.record(err);
                report.framing_error = Some(err);
            }
            Err(TransportError::LinkLost) => {
                self.lose_link(renderer, &mut report);
                return report;
            }
        }

        // Input step
        if let Some(event) = keypad.poll_event() {
            if event.pressed && Button::from_key_number(event.key) == Some(self.dismiss_button) {
                report.dismiss_pressed = true;
                let commands = self.machine.on_dismiss_pressed();
                report.commands += self.run(commands, renderer);
            }
        }

        // Tick step
        if !alerted {
            let commands = self.machine.tick(now_ms);
            report.commands += self.run(commands, renderer);
        }

        renderer.refresh();
        report
    }

    /// Apply a request from the network bot link
    ///
    /// Returns the number of render commands executed.
    pub fn apply_control<R: Renderer>(&mut self, request: ControlRequest, renderer: &mut R) -> usize {
        match request {
            ControlRequest::Message(message) => {
                self.stats.messages = self.stats.messages.saturating_add(1);
                let commands = self.machine.on_message_received(message);
                self.run(commands, renderer)
            }
            ControlRequest::Activate => {
                self.activated = true;
                0
            }
            ControlRequest::Sound(setting) => {
                self.machine.set_muted(setting.is_muted());
                0
            }
        }
    }

    /// The notification machine
    pub fn machine(&self) -> &NotificationMachine {
        &self.machine
    }

    /// Link counters since boot
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Current device settings
    pub fn settings(&self) -> DeviceSettings {
        DeviceSettings {
            muted: self.machine.is_muted(),
            external_speaker: self.external_speaker,
            activated: self.activated,
        }
    }

    fn lose_link<R: Renderer>(&mut self, renderer: &mut R, report: &mut PassReport) {
        report.link_lost = true;
        if self.link_up {
            self.link_up = false;
            self.stats.link_losses = self.stats.link_losses.saturating_add(1);
            let commands = self.machine.on_link_lost();
            report.commands += self.run(commands, renderer);
        }
    }

    fn run<R: Renderer>(&self, commands: Commands, renderer: &mut R) -> usize {
        let count = commands.len();
        for command in commands {
            renderer.execute(command, self.machine.current_message());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AnimationKind, DeviceState, SoundKind, SplashKind};
    use crate::transport::mock::MockSerial;
    use alloc::collections::VecDeque;
    use core::cell::Cell;
    use alloc::string::String;
    use alloc::vec::Vec;
    use disbadge_hal::{KeyEvent, LinkFlag, Wired};
    use disbadge_protocol::{encode_frame, CommandType, SoundSetting};

    #[derive(Default)]
    struct RecordingRenderer {
        commands: Vec<RenderCommand>,
        shown: Vec<String>,
        refreshes: usize,
    }

    impl Renderer for RecordingRenderer {
        fn execute(&mut self, command: RenderCommand, message: Option<&Message>) {
            if command == RenderCommand::ShowMessage {
                if let Some(message) = message {
                    self.shown.push(String::from(message.username()));
                }
            }
            self.commands.push(command);
        }

        fn refresh(&mut self) {
            self.refreshes += 1;
        }
    }

    #[derive(Default)]
    struct ScriptedKeypad(VecDeque<KeyEvent>);

    impl Keypad for ScriptedKeypad {
        fn poll_event(&mut self) -> Option<KeyEvent> {
            self.0.pop_front()
        }
    }

    fn ping() -> Message {
        Message::new("hi", "alice#0001", CommandType::Ping)
    }

    fn config() -> BadgeConfig {
        BadgeConfig {
            pin_time_s: 10,
            ..BadgeConfig::default()
        }
    }

    #[test]
    fn test_message_alerts_then_pins_next_pass() {
        let mut scheduler = Scheduler::new(&config());
        let mut serial = MockSerial::default();
        serial.push(&encode_frame(&ping()).unwrap());
        let mut transport = Transport::new(&mut serial, &Wired);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = RecordingRenderer::default();

        let report = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 0);
        assert!(report.message_received);
        assert_eq!(report.commands, 3);
        assert_eq!(scheduler.machine().current_state(), DeviceState::Alerting);
        assert_eq!(scheduler.machine().pin_deadline(), None);

        let report = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 1);
        assert!(!report.message_received);
        assert_eq!(report.commands, 1);
        assert_eq!(
            renderer.commands,
            [
                RenderCommand::ShowSplash(SplashKind::Ping),
                RenderCommand::StartAnimation(AnimationKind::Ping),
                RenderCommand::PlaySound(SoundKind::Ping),
                RenderCommand::ShowMessage,
            ]
        );
        assert_eq!(renderer.shown, ["alice"]);
        assert_eq!(renderer.refreshes, 2);
        assert_eq!(scheduler.machine().current_state(), DeviceState::Pinned);
        assert_eq!(scheduler.stats().messages, 1);
    }

    /// Renderer whose sound playback advances a shared clock
    struct ClockedRenderer<'a> {
        clock: &'a Cell<u64>,
    }

    impl Renderer for ClockedRenderer<'_> {
        fn execute(&mut self, command: RenderCommand, _message: Option<&Message>) {
            if let RenderCommand::PlaySound(_) = command {
                self.clock.set(self.clock.get() + 2_400);
            }
        }
    }

    #[test]
    fn test_pin_timer_starts_after_sound() {
        let clock = Cell::new(1_000);
        let mut scheduler = Scheduler::new(&config());
        let mut serial = MockSerial::default();
        serial.push(&encode_frame(&ping()).unwrap());
        let mut transport = Transport::new(&mut serial, &Wired);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = ClockedRenderer { clock: &clock };

        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, clock.get());
        assert_eq!(clock.get(), 3_400);
        assert_eq!(scheduler.machine().pin_deadline(), None);

        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, clock.get());
        assert_eq!(scheduler.machine().current_state(), DeviceState::Pinned);
        assert_eq!(scheduler.machine().pin_deadline(), Some(13_400));
    }

    #[test]
    fn test_dismiss_button_returns_to_idle() {
        let mut scheduler = Scheduler::new(&config());
        let mut serial = MockSerial::default();
        serial.push(&encode_frame(&ping()).unwrap());
        let mut transport = Transport::new(&mut serial, &Wired);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = RecordingRenderer::default();

        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 0);

        // Other keys and releases are ignored
        keypad.0.push_back(KeyEvent::pressed(Button::A.key_number()));
        let report = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 1);
        assert!(!report.dismiss_pressed);
        assert_eq!(scheduler.machine().current_state(), DeviceState::Pinned);
        renderer.commands.clear();

        keypad.0.push_back(KeyEvent::pressed(Button::B.key_number()));
        let report = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 2);
        assert!(report.dismiss_pressed);
        assert_eq!(scheduler.machine().current_state(), DeviceState::Idle);
        assert_eq!(
            renderer.commands,
            [
                RenderCommand::StopAnimation,
                RenderCommand::ShowSplash(SplashKind::NoMessage),
            ]
        );
    }

    #[test]
    fn test_configured_dismiss_button() {
        let config = BadgeConfig {
            dismiss_button: Button::Start,
            ..config()
        };
        let mut scheduler = Scheduler::new(&config);
        let mut serial = MockSerial::default();
        serial.push(&encode_frame(&ping()).unwrap());
        let mut transport = Transport::new(&mut serial, &Wired);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = RecordingRenderer::default();

        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 0);
        keypad.0.push_back(KeyEvent::pressed(Button::B.key_number()));
        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 1);
        assert_eq!(scheduler.machine().current_state(), DeviceState::Pinned);

        keypad.0.push_back(KeyEvent::pressed(Button::Start.key_number()));
        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 2);
        assert_eq!(scheduler.machine().current_state(), DeviceState::Idle);
    }

    #[test]
    fn test_pin_timeout() {
        let mut scheduler = Scheduler::new(&config());
        let mut serial = MockSerial::default();
        serial.push(&encode_frame(&ping()).unwrap());
        let mut transport = Transport::new(&mut serial, &Wired);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = RecordingRenderer::default();

        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 500);
        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 3_000);
        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 12_999);
        assert_eq!(scheduler.machine().current_state(), DeviceState::Pinned);

        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 13_000);
        assert_eq!(scheduler.machine().current_state(), DeviceState::Idle);
        assert_eq!(scheduler.machine().current_message(), None);
    }

    #[test]
    fn test_framing_errors_are_counted_not_fatal() {
        let mut scheduler = Scheduler::new(&config());
        let mut serial = MockSerial::default();
        serial.push(b"xx\n8\nnot json");
        serial.push(&encode_frame(&ping()).unwrap());
        let mut transport = Transport::new(&mut serial, &Wired);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = RecordingRenderer::default();

        let first = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 0);
        assert_eq!(first.framing_error, Some(FramingError::BadLength));
        let second = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 1);
        assert_eq!(second.framing_error, Some(FramingError::BadPayload));
        let third = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 2);
        assert!(third.message_received);

        let stats = scheduler.stats();
        assert_eq!(stats.bad_length, 1);
        assert_eq!(stats.bad_payload, 1);
        assert_eq!(stats.framing_errors(), 2);
        assert_eq!(stats.messages, 1);
    }

    #[test]
    fn test_duplicate_redelivery_does_not_realert() {
        let mut scheduler = Scheduler::new(&config());
        let mut serial = MockSerial::default();
        serial.push(&encode_frame(&ping()).unwrap());
        serial.push(&encode_frame(&ping()).unwrap());
        let mut transport = Transport::new(&mut serial, &Wired);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = RecordingRenderer::default();

        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 0);
        let report = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 5);

        // The copy does not alert again, so the pass pins the first one
        assert!(report.message_received);
        assert_eq!(report.commands, 1);
        assert_eq!(renderer.commands.last(), Some(&RenderCommand::ShowMessage));
        assert_eq!(scheduler.machine().pin_deadline(), Some(10_005));
        assert_eq!(
            renderer
                .commands
                .iter()
                .filter(|command| matches!(command, RenderCommand::PlaySound(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_link_stats_saturate() {
        let mut stats = LinkStats {
            bad_length: u32::MAX,
            bad_payload: 1,
            ..LinkStats::default()
        };
        assert_eq!(stats.framing_errors(), u32::MAX);
        stats.record(FramingError::BadLength);
        assert_eq!(stats.bad_length, u32::MAX);
    }

    #[test]
    fn test_link_loss_shows_connecting_once() {
        let link = LinkFlag::new(true);
        let mut scheduler = Scheduler::new(&config());
        let mut serial = MockSerial::default();
        serial.push(&encode_frame(&ping()).unwrap());
        let mut transport = Transport::new(&mut serial, &link);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = RecordingRenderer::default();

        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 0);
        renderer.commands.clear();

        link.set_connected(false);
        let report = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 1);
        assert!(report.link_lost);
        assert_eq!(
            renderer.commands,
            [
                RenderCommand::StopAnimation,
                RenderCommand::ShowSplash(SplashKind::Connecting),
            ]
        );
        assert_eq!(scheduler.machine().current_message(), None);

        let again = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 2);
        assert!(again.link_lost);
        assert_eq!(again.commands, 0);
        assert_eq!(scheduler.stats().link_losses, 1);

        link.set_connected(true);
        renderer.commands.clear();
        let back = scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 3);
        assert!(back.link_restored);
        assert_eq!(
            renderer.commands,
            [RenderCommand::ShowSplash(SplashKind::NoMessage)]
        );
    }

    #[test]
    fn test_boot_disconnected() {
        let link = LinkFlag::new(false);
        let mut scheduler = Scheduler::new(&config());
        let mut serial = MockSerial::default();
        let mut transport = Transport::new(&mut serial, &link);
        let mut keypad = ScriptedKeypad::default();
        let mut renderer = RecordingRenderer::default();

        assert_eq!(scheduler.start(&mut renderer), 1);
        scheduler.poll_once(&mut transport, &mut keypad, &mut renderer, 0);
        assert_eq!(
            renderer.commands,
            [
                RenderCommand::ShowSplash(SplashKind::Loading),
                RenderCommand::ShowSplash(SplashKind::Connecting),
            ]
        );
    }

    #[test]
    fn test_apply_control() {
        let mut scheduler = Scheduler::new(&config());
        let mut renderer = RecordingRenderer::default();
        assert!(!scheduler.settings().activated);

        scheduler.apply_control(ControlRequest::Activate, &mut renderer);
        scheduler.apply_control(ControlRequest::Sound(SoundSetting::Off), &mut renderer);
        let settings = scheduler.settings();
        assert!(settings.activated);
        assert!(settings.muted);
        assert!(!settings.external_speaker);

        let executed = scheduler.apply_control(ControlRequest::Message(ping()), &mut renderer);
        assert_eq!(executed, 3);
        assert_eq!(renderer.commands[2], RenderCommand::Wait(2000));

        scheduler.apply_control(ControlRequest::Sound(SoundSetting::On), &mut renderer);
        assert!(!scheduler.settings().muted);
    }
}
