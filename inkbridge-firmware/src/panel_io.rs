//! Panel driver bindings for RP2040 GPIO and SPI

use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};

use inkbridge_panel::{Ac073Tc1, BusyLine, ControlPin};

/// The panel driver as wired on this board
pub type Panel<'d> = Ac073Tc1<
    Spi<'d, SPI0, Blocking>,
    PanelPin<'d>,
    PanelPin<'d>,
    PanelPin<'d>,
    PanelPin<'d>,
    PanelBusy<'d>,
    embassy_time::Delay,
>;

pub struct PanelPin<'d>(pub Output<'d>);

impl ControlPin for PanelPin<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }
}

/// Panel busy line; the controller holds it low while working
pub struct PanelBusy<'d>(pub Input<'d>);

impl BusyLine for PanelBusy<'_> {
    fn is_busy(&mut self) -> bool {
        self.0.is_low()
    }
}
