//! RGB status LED
//!
//! One color per session phase, so a device stuck mid-cycle can be
//! read at a glance without a debug probe attached.

use embassy_rp::gpio::Output;

use inkbridge_core::session::SessionState;

/// Common-cathode RGB LED on three GPIO lines
pub struct StatusLed<'d> {
    red: Output<'d>,
    green: Output<'d>,
    blue: Output<'d>,
}

impl<'d> StatusLed<'d> {
    pub fn new(red: Output<'d>, green: Output<'d>, blue: Output<'d>) -> Self {
        Self { red, green, blue }
    }

    /// Yellow marks the wifi join, which happens before the session
    /// state machine starts.
    pub fn joining(&mut self) {
        self.set(true, true, false);
    }

    /// Reflect a session state on the LED.
    ///
    /// Idle is white, handshake blue, streaming cyan, rendering green,
    /// any fault red. Sleeping turns the LED off to save the battery.
    pub fn show(&mut self, state: SessionState) {
        match state {
            SessionState::Idle => self.set(true, true, true),
            SessionState::Handshaking => self.set(false, false, true),
            SessionState::Streaming => self.set(false, true, true),
            SessionState::Rendering => self.set(false, true, false),
            SessionState::Failed(_) => self.set(true, false, false),
            SessionState::Sleeping => self.set(false, false, false),
        }
    }

    fn set(&mut self, red: bool, green: bool, blue: bool) {
        set_level(&mut self.red, red);
        set_level(&mut self.green, green);
        set_level(&mut self.blue, blue);
    }
}

fn set_level(pin: &mut Output<'_>, on: bool) {
    if on {
        pin.set_high();
    } else {
        pin.set_low();
    }
}
