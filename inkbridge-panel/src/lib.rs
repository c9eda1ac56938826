//! AC073TC1 e-paper panel driver
//!
//! Drives the 800x480 7-color electrophoretic panel over SPI: the
//! vendor bring-up register sequence, the begin/data/refresh frame
//! cycle, and busy-line synchronization. The panel is write-only from
//! this device; nothing is ever read back except the busy status line.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod driver;

pub use driver::{Ac073Tc1, BusyLine, ControlPin, PanelError, PanelState};
