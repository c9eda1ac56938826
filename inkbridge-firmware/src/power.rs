//! Sleep between wake cycles
//!
//! The RP2040 has no ESP-style deep sleep controller with a wake
//! timer, so the low-power interval is the executor idling in WFI with
//! everything we control switched off, followed by a full system reset
//! to start the next cycle from a clean state.

use defmt::*;
use embassy_time::Timer;

use inkbridge_core::session::SessionState;

use crate::config;
use crate::led::StatusLed;

pub async fn sleep_until_next_cycle(led: &mut StatusLed<'_>) -> ! {
    led.show(SessionState::Sleeping);
    info!(
        "cycle done, sleeping {} s",
        config::SLEEP_INTERVAL.as_secs()
    );

    Timer::after(config::SLEEP_INTERVAL).await;

    cortex_m::peripheral::SCB::sys_reset()
}
