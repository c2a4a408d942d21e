//! Disbadge - Discord notification badge firmware
//!
//! Main firmware binary for RP2040-based badges. Messages from the bot
//! link arrive as length-prefixed JSON frames over a BLE UART bridge and
//! are shown with a splash, an LED animation and an alert sound.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use disbadge_hal::PinKeypad;

use crate::board::{IoSerial, RpInput, RpOutput};
use crate::renderer::BadgeRenderer;

mod board;
mod config;
mod renderer;
mod tasks;

// Heap allocator for message strings and the frame scratch buffer
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 32KB
const HEAP_SIZE: usize = 32 * 1024;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Disbadge firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::badge_config();
    info!(
        "Config: pin {} s, muted={}, external_speaker={}, dismiss={}, {} baud",
        config.pin_time_s,
        config.muted,
        config.external_speaker,
        config.dismiss_button,
        config.baudrate
    );

    // Setup UART for the BLE bridge
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.baudrate;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 1024]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let mut serial = IoSerial::new(uart);

    info!("UART initialized for the bot link");

    // Keypad, in key-number order (B, A, Start, Select, Right, Down, Up, Left)
    let mut keypad = PinKeypad::new(
        [
            RpInput(Input::new(p.PIN_2, Pull::Up)),
            RpInput(Input::new(p.PIN_3, Pull::Up)),
            RpInput(Input::new(p.PIN_4, Pull::Up)),
            RpInput(Input::new(p.PIN_5, Pull::Up)),
            RpInput(Input::new(p.PIN_6, Pull::Up)),
            RpInput(Input::new(p.PIN_7, Pull::Up)),
            RpInput(Input::new(p.PIN_8, Pull::Up)),
            RpInput(Input::new(p.PIN_9, Pull::Up)),
        ],
        false,
    );

    // Status LED and optional speaker amplifier
    let led = RpOutput(Output::new(p.PIN_25, Level::Low));
    let speaker_enable = if config.external_speaker {
        Some(RpOutput(Output::new(p.PIN_22, Level::Low)))
    } else {
        None
    };
    let mut renderer = BadgeRenderer::new(led, speaker_enable);

    info!("Keypad and outputs initialized");

    // Spawn tasks
    let link_status = Input::new(p.PIN_15, Pull::Down);
    unwrap!(spawner.spawn(tasks::link_task(link_status)));

    info!("Link task spawned, badge running");

    tasks::run_badge(&mut serial, &tasks::LINK, &mut keypad, &mut renderer, &config).await
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
