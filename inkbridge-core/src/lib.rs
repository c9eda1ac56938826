//! Board-agnostic core logic for the inkbridge display node
//!
//! This crate contains all pipeline logic that does not depend on
//! specific hardware implementations:
//!
//! - Byte-exact stream transfer primitives
//! - The 4-bit pixel packing codec
//! - The procedural fallback pattern generator
//! - The wake-cycle session state machine
//!
//! Everything here runs on the host for testing; the firmware crate
//! supplies sockets, the panel, and entropy.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod codec;
pub mod color;
pub mod frame;
pub mod pattern;
pub mod session;
pub mod transport;
