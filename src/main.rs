//! ROX-2X Controller Main Application
//!
//! Entry point for the STM32G474-based controller firmware.
//! Brings up the tuning encoder and recalls the channel memory.

#![no_std]
#![no_main]

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_stm32::flash::Flash;
use embassy_stm32::peripherals::{EXTI0, EXTI1, PA0, PA1};
use {defmt_rtt as _, panic_probe as _};

use rox2x_firmware::hal::exti::{run_line, ExtiDispatch, ExtiLine};
use rox2x_firmware::hal::flash::FlashMedium;
use rox2x_firmware::prelude::*;

static LINE_A: ExtiLine = ExtiLine::new();
static LINE_B: ExtiLine = ExtiLine::new();

static ENCODER: QuadratureDecoder<&ExtiLine> =
    QuadratureDecoder::new(&LINE_A, &LINE_B, encoder_a_edge, encoder_b_edge);

fn encoder_a_edge() {
    ENCODER.on_channel_a_edge();
}

fn encoder_b_edge() {
    ENCODER.on_channel_b_edge();
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ROX-2X Controller Firmware v{}", env!("CARGO_PKG_VERSION"));

    let config = embassy_stm32::Config::default();
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // Edge tasks idle until the encoder arms their lines
    spawner.spawn(encoder_a_task(p.PA0, p.EXTI0)).unwrap();
    spawner.spawn(encoder_b_task(p.PA1, p.EXTI1)).unwrap();

    match ENCODER.activate(&mut ExtiDispatch) {
        Ok(()) => info!("Encoder active on {} / {}", pins::ENCODER_A, pins::ENCODER_B),
        Err(e) => error!("Encoder activation failed: {}", e),
    }

    let mut store = FrequencyStore::new(FlashMedium::new(Flash::new_blocking(p.FLASH)));
    let channels = match store.initialize_medium().and_then(|()| store.recall()) {
        Ok(channels) => channels,
        Err(e) => {
            error!("Channel memory unavailable: {}", e);
            core::future::pending::<()>().await;
            return;
        }
    };

    info!("Recalled {} channel(s)", channels.len());
    for (n, freq) in channels.iter().enumerate() {
        info!("  CH{}: {}", n + 1, freq);
    }

    let mut last = ENCODER.read();
    loop {
        Timer::after(Duration::from_millis(ENCODER_POLL_MS)).await;
        let position = ENCODER.read();
        if position != last {
            info!("Encoder {} -> {}", last, position);
            last = position;
        }
    }
}

#[embassy_executor::task]
async fn encoder_a_task(pin: PA0, channel: EXTI0) {
    run_line(pin, channel, &LINE_A).await
}

#[embassy_executor::task]
async fn encoder_b_task(pin: PA1, channel: EXTI1) {
    run_line(pin, channel, &LINE_B).await
}
