//! Ring-oscillator entropy
//!
//! Seeds the fallback pattern and the network stack. The ROSC random
//! bit is not uniformly distributed, but pattern placement and TCP
//! sequence seeding only need boot-to-boot variation, not
//! cryptographic quality.

use inkbridge_core::pattern::EntropySource;

pub struct RoscEntropy;

impl RoscEntropy {
    pub fn next_u64(&mut self) -> u64 {
        (self.next_u32() as u64) << 32 | self.next_u32() as u64
    }
}

impl EntropySource for RoscEntropy {
    fn next_u32(&mut self) -> u32 {
        let mut value = 0;
        for _ in 0..32 {
            let bit = embassy_rp::pac::ROSC.randombit().read().randombit();
            value = value << 1 | bit as u32;
        }
        value
    }
}
