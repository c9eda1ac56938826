//! Wifi and network stack bring-up
//!
//! The cyw43 radio hangs off PIO0 as a half-duplex SPI device. Its
//! driver and the network stack each need a background task; both are
//! spawned here and run for the rest of the wake cycle.

use cyw43::{Control, JoinOptions};
use cyw43_pio::PioSpi;
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Stack, StackResources};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{with_timeout, Timer};
use static_cell::StaticCell;

use crate::config;

/// Radio chip firmware. Download the blobs from the embassy
/// repository's cyw43-firmware directory into ../cyw43-firmware.
const FW: &[u8] = include_bytes!("../cyw43-firmware/43439A0.bin");
const CLM: &[u8] = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

/// Network bring-up failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetError {
    /// All association attempts exhausted
    JoinFailed,
    /// Associated but no DHCP lease within the deadline
    DhcpTimeout,
}

#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Initialize the radio and the network stack, spawning their
/// background tasks. Returns before any association is attempted.
pub async fn bring_up(
    spawner: &Spawner,
    pwr: Output<'static>,
    spi: PioSpi<'static, PIO0, 0, DMA_CH0>,
    seed: u64,
) -> (Stack<'static>, Control<'static>) {
    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, FW).await;
    unwrap!(spawner.spawn(cyw43_task(runner)));

    control.init(CLM).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    static RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
    let (stack, net_runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );
    unwrap!(spawner.spawn(net_task(net_runner)));

    (stack, control)
}

/// Join the configured network and wait for a DHCP lease.
pub async fn join(control: &mut Control<'static>, stack: Stack<'static>) -> Result<(), NetError> {
    let mut joined = false;
    for attempt in 1..=config::WIFI_JOIN_ATTEMPTS {
        match control
            .join(
                config::WIFI_SSID,
                JoinOptions::new(config::WIFI_PSK.as_bytes()),
            )
            .await
        {
            Ok(()) => {
                info!("joined {} on attempt {}", config::WIFI_SSID, attempt);
                joined = true;
                break;
            }
            Err(err) => {
                warn!("join attempt {} failed, status {}", attempt, err.status);
                Timer::after_secs(1).await;
            }
        }
    }
    if !joined {
        return Err(NetError::JoinFailed);
    }

    match with_timeout(config::DHCP_TIMEOUT, stack.wait_config_up()).await {
        Ok(()) => {
            if let Some(cfg) = stack.config_v4() {
                info!("dhcp lease: {}", cfg.address);
            }
            Ok(())
        }
        Err(_) => Err(NetError::DhcpTimeout),
    }
}
