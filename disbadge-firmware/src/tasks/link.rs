//! Link status task
//!
//! Mirrors the BLE module's "connected" pin into the shared link flag.

use defmt::*;
use disbadge_hal::{LinkFlag, LinkStatus};
use embassy_rp::gpio::Input;

/// Shared link state, read by the transport
pub static LINK: LinkFlag = LinkFlag::new(false);

/// Link task - follows the status pin edges
#[embassy_executor::task]
pub async fn link_task(mut status: Input<'static>) {
    info!("Link task started");

    loop {
        let connected = status.is_high();
        if connected != LINK.is_connected() {
            if connected {
                info!("BLE link connected");
            } else {
                warn!("BLE link disconnected");
            }
            LINK.set_connected(connected);
        }

        status.wait_for_any_edge().await;
    }
}
