//! Inkbridge - e-paper display node firmware
//!
//! Pico W firmware for a battery-powered picture frame. Each wake
//! cycle pulls one rendered frame from the house server over TCP,
//! streams it into an AC073TC1 7-color e-paper panel, refreshes, and
//! sleeps. When the network path fails the cycle renders a procedural
//! pattern instead, so the panel itself reports device health.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::spi::{self, Spi};
use {defmt_rtt as _, panic_probe as _};

use inkbridge_core::session::{FaultKind, SessionState};
use inkbridge_panel::Ac073Tc1;

use crate::entropy::RoscEntropy;
use crate::led::StatusLed;
use crate::panel_io::{PanelBusy, PanelPin};

mod config;
mod controller;
mod entropy;
mod led;
mod net;
mod panel_io;
mod power;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

/// One wake cycle per boot; sleep ends in a system reset
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("inkbridge firmware starting");
    let p = embassy_rp::init(Default::default());

    let mut led = StatusLed::new(
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::Low),
    );
    led.show(SessionState::Idle);

    let mut rng = RoscEntropy;

    // Panel on SPI0 with dedicated control lines
    let mut spi_config = spi::Config::default();
    spi_config.frequency = config::PANEL_SPI_HZ;
    let panel_spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let mut panel = Ac073Tc1::new(
        panel_spi,
        PanelPin(Output::new(p.PIN_20, Level::Low)),
        PanelPin(Output::new(p.PIN_17, Level::High)),
        PanelPin(Output::new(p.PIN_21, Level::High)),
        PanelPin(Output::new(p.PIN_22, Level::Low)),
        PanelBusy(Input::new(p.PIN_26, Pull::Up)),
        embassy_time::Delay,
    );

    if let Err(err) = panel.initialize() {
        // Nothing can be rendered without a panel; try again next cycle
        error!("panel bring-up failed: {}", err);
        led.show(SessionState::Failed(FaultKind::Panel));
        power::sleep_until_next_cycle(&mut led).await;
    }
    info!("panel initialized");

    // cyw43 radio on PIO0 (Pico W onboard wiring)
    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let radio_spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let seed = rng.next_u64();
    let (stack, mut control) = net::bring_up(&spawner, pwr, radio_spi, seed).await;

    led.joining();
    let session = match net::join(&mut control, stack).await {
        Ok(()) => controller::run_cycle(stack, &mut panel, &mut led, &mut rng).await,
        Err(err) => {
            warn!("network unavailable: {}", err);
            controller::run_offline_cycle(&mut panel, &mut led, &mut rng, FaultKind::Transport)
                .await
        }
    };
    info!("session ended in {}", session);

    panel.turn_off();
    power::sleep_until_next_cycle(&mut led).await
}
