//! Badge renderer
//!
//! Carries out render commands on the board: splashes and message text go
//! to the RTT log, animations drive the status LED, and sounds hold the
//! external speaker amplifier enabled for the length of the clip.

use defmt::*;
use disbadge_core::state::{AnimationKind, RenderCommand, SoundKind};
use disbadge_core::Renderer;
use disbadge_hal::OutputPin;
use disbadge_protocol::Message;
use embassy_time::{block_for, Duration, Instant};

/// Sparkle flicker step for the hype animation
const SPARKLE_STEP_MS: u64 = 50;

/// Clip length of an alert sound
fn sound_duration(kind: SoundKind) -> Duration {
    match kind {
        SoundKind::Ping => Duration::from_millis(1200),
        SoundKind::Cheer => Duration::from_millis(1800),
        SoundKind::Hype => Duration::from_millis(2400),
    }
}

/// LED level for an animation at `elapsed_ms` since it started
fn led_level(kind: AnimationKind, elapsed_ms: u64) -> bool {
    let period = kind.period_ms() as u64;
    let phase = elapsed_ms % period;
    match kind {
        // On for the first half of each pulse
        AnimationKind::Ping => phase < period / 2,
        // Two short blinks per cycle
        AnimationKind::Cheer => (phase * 4 / period) % 2 == 0,
        // Blink with an irregular flicker on top
        AnimationKind::Hype => {
            let step = elapsed_ms / SPARKLE_STEP_MS;
            phase < period / 2 || step % 7 == 3
        }
    }
}

/// Renderer for the badge hardware
pub struct BadgeRenderer<O: OutputPin> {
    led: O,
    speaker_enable: Option<O>,
    animation: Option<(AnimationKind, Instant)>,
}

impl<O: OutputPin> BadgeRenderer<O> {
    /// Create a renderer; `speaker_enable` is set when an external speaker is fitted
    pub fn new(mut led: O, speaker_enable: Option<O>) -> Self {
        led.set_low();
        Self {
            led,
            speaker_enable,
            animation: None,
        }
    }

    fn play(&mut self, kind: SoundKind) {
        debug!("Playing {} sound", kind);
        if let Some(pin) = self.speaker_enable.as_mut() {
            pin.set_high();
        }
        // Playback blocks the loop, as the alert is meant to
        block_for(sound_duration(kind));
        if let Some(pin) = self.speaker_enable.as_mut() {
            pin.set_low();
        }
    }
}

impl<O: OutputPin> Renderer for BadgeRenderer<O> {
    fn execute(&mut self, command: RenderCommand, message: Option<&Message>) {
        match command {
            RenderCommand::ShowSplash(kind) => match message {
                Some(message) => info!("Splash {} from {=str}", kind, message.username()),
                None => info!("Splash {}", kind),
            },
            RenderCommand::ShowMessage => {
                if let Some(message) = message {
                    info!("{=str}: {=str}", message.username(), message.text.as_str());
                }
            }
            RenderCommand::StartAnimation(kind) => {
                debug!("Animation {} ({} ms period)", kind, kind.period_ms());
                self.animation = Some((kind, Instant::now()));
            }
            RenderCommand::StopAnimation => {
                debug!("Animation stopped");
                self.animation = None;
                self.led.set_low();
            }
            RenderCommand::PlaySound(kind) => self.play(kind),
            RenderCommand::Wait(ms) => {
                debug!("Muted, holding {} ms", ms);
                block_for(Duration::from_millis(ms as u64));
            }
        }
    }

    fn refresh(&mut self) {
        if let Some((kind, started)) = self.animation {
            let level = led_level(kind, started.elapsed().as_millis());
            self.led.set_state(level);
        }
    }
}
