//! Badge loop
//!
//! Opens a transport session per link connection and runs scheduler passes
//! until the link drops. Dropping the session flushes whatever the port
//! still holds from the old connection.

use defmt::*;
use disbadge_core::{BadgeConfig, PassReport, Renderer, Scheduler, Transport};
use disbadge_hal::{Keypad, LinkStatus, SerialRx, SerialTx};
use embassy_futures::yield_now;
use embassy_time::{Instant, Timer};

/// Poll interval while waiting for the link to come back
const LINK_RETRY_MS: u64 = 250;

/// Run the badge forever
pub async fn run_badge<S, L, K, R>(
    serial: &mut S,
    link: &L,
    keypad: &mut K,
    renderer: &mut R,
    config: &BadgeConfig,
) -> !
where
    S: SerialRx + SerialTx,
    L: LinkStatus,
    K: Keypad,
    R: Renderer,
{
    let mut scheduler = Scheduler::new(config);
    scheduler.start(renderer);
    let boot = Instant::now();

    loop {
        {
            let mut transport = Transport::with_max_frame_len(serial, link, config.max_frame_len);
            debug!("Transport session opened");

            loop {
                let now_ms = boot.elapsed().as_millis();
                let report = scheduler.poll_once(&mut transport, keypad, renderer, now_ms);
                log_report(&report);

                if report.link_lost {
                    break;
                }
                yield_now().await;
            }
        }

        let stats = scheduler.stats();
        info!(
            "Session closed: {} messages, {} dropped frames, {} link losses",
            stats.messages,
            stats.framing_errors(),
            stats.link_losses
        );

        while !link.is_connected() {
            Timer::after_millis(LINK_RETRY_MS).await;
        }
    }
}

fn log_report(report: &PassReport) {
    if report.link_restored {
        info!("Link restored");
    }
    if report.message_received {
        debug!("Message received, {} commands", report.commands);
    }
    if let Some(err) = report.framing_error {
        warn!("Dropped frame: {}", err);
    }
    if report.dismiss_pressed {
        debug!("Dismiss pressed");
    }
    if report.link_lost && report.commands > 0 {
        warn!("Link lost");
    }
}
