//! Panel driver state machine
//!
//! Command/state sequencing for the AC073TC1: reset pulse, vendor
//! bring-up, the begin/data/refresh frame cycle, and busy-line
//! polling. All transfers are blocking; the refresh sequence in
//! particular takes tens of seconds and must not be interrupted, since
//! an aborted refresh can leave the panel in an inconsistent
//! electrical state.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiBus;

use inkbridge_core::frame::{CHUNK_BYTES, PACKED_FRAME_BYTES};

use crate::command::{cmd, INIT_SEQUENCE};

/// Default busy-line poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Reset pulse step duration in milliseconds
const RESET_PULSE_MS: u32 = 10;

/// Output pin seam for the DC, CS, reset, and power-enable lines
pub trait ControlPin {
    fn set_high(&mut self);
    fn set_low(&mut self);
}

/// Busy status line seam. Implementations translate the electrical
/// polarity; `true` means the controller is mid-operation and cannot
/// accept commands.
pub trait BusyLine {
    fn is_busy(&mut self) -> bool;
}

/// Driver states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelState {
    /// Constructed, hardware untouched
    Uninitialized,
    /// Bring-up sequence sent, ready to open a frame
    Configured,
    /// Data-start issued, accepting packed pixel chunks
    FrameOpen,
    /// Refresh sequence finished
    FrameClosed,
    /// Panel power enable dropped
    PoweredOff,
}

/// Panel driver failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError<E> {
    /// Operation not valid in the current state
    InvalidState(PanelState),
    /// More packed bytes than one frame holds
    FrameOverrun,
    /// SPI transfer failure
    Spi(E),
}

/// AC073TC1 driver over a shared SPI bus with dedicated control lines
pub struct Ac073Tc1<SPI, DC, CS, RST, EN, BUSY, D> {
    spi: SPI,
    dc: DC,
    cs: CS,
    reset: RST,
    power: EN,
    busy: BUSY,
    delay: D,
    poll_interval_ms: u32,
    state: PanelState,
    frame_bytes: usize,
}

impl<SPI, DC, CS, RST, EN, BUSY, D> Ac073Tc1<SPI, DC, CS, RST, EN, BUSY, D>
where
    SPI: SpiBus,
    DC: ControlPin,
    CS: ControlPin,
    RST: ControlPin,
    EN: ControlPin,
    BUSY: BusyLine,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, cs: CS, reset: RST, power: EN, busy: BUSY, delay: D) -> Self {
        Self {
            spi,
            dc,
            cs,
            reset,
            power,
            busy,
            delay,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            state: PanelState::Uninitialized,
            frame_bytes: 0,
        }
    }

    /// Override the busy-line poll interval (tests script this)
    pub fn with_poll_interval(mut self, interval_ms: u32) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Packed bytes accepted since the last `begin_frame`
    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    /// Power the panel, drive the reset pulse, and send the vendor
    /// bring-up sequence.
    pub fn initialize(&mut self) -> Result<(), PanelError<SPI::Error>> {
        match self.state {
            PanelState::Uninitialized | PanelState::PoweredOff => {}
            other => return Err(PanelError::InvalidState(other)),
        }

        self.power.set_high();

        self.reset.set_high();
        self.delay.delay_ms(RESET_PULSE_MS);
        self.reset.set_low();
        self.delay.delay_ms(RESET_PULSE_MS);
        self.reset.set_high();
        self.delay.delay_ms(RESET_PULSE_MS);

        self.wait_until_idle();

        for &(command, data) in INIT_SEQUENCE {
            self.write_command(command, data)?;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("panel configured");

        self.state = PanelState::Configured;
        Ok(())
    }

    /// Issue the data-start command and reset the frame byte counter.
    ///
    /// Also valid while a frame is open: the failure path re-opens the
    /// frame to restart the data phase for the fallback render.
    pub fn begin_frame(&mut self) -> Result<(), PanelError<SPI::Error>> {
        match self.state {
            PanelState::Configured | PanelState::FrameClosed | PanelState::FrameOpen => {}
            other => return Err(PanelError::InvalidState(other)),
        }

        self.write_command(cmd::DATA_START, &[])?;
        self.frame_bytes = 0;
        self.state = PanelState::FrameOpen;
        Ok(())
    }

    /// Transmit packed pixel bytes as a data phase following the
    /// data-start command, split into transaction-sized SPI transfers.
    pub fn send_chunk(&mut self, packed: &[u8]) -> Result<(), PanelError<SPI::Error>> {
        if self.state != PanelState::FrameOpen {
            return Err(PanelError::InvalidState(self.state));
        }
        if self.frame_bytes + packed.len() > PACKED_FRAME_BYTES {
            return Err(PanelError::FrameOverrun);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("panel data chunk: {} bytes", packed.len());

        for part in packed.chunks(CHUNK_BYTES) {
            self.write_data(part)?;
        }
        self.frame_bytes += packed.len();
        Ok(())
    }

    /// Run the refresh sequence: power on, refresh, power off, each
    /// followed by a busy-wait. Takes tens of seconds.
    pub fn end_frame(&mut self) -> Result<(), PanelError<SPI::Error>> {
        if self.state != PanelState::FrameOpen {
            return Err(PanelError::InvalidState(self.state));
        }

        if self.frame_bytes != PACKED_FRAME_BYTES {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "refreshing a short frame: {} of {} bytes",
                self.frame_bytes,
                PACKED_FRAME_BYTES
            );
        }

        self.write_command(cmd::POWER_ON, &[])?;
        self.wait_until_idle();

        self.write_command(cmd::DISPLAY_REFRESH, &[0x00])?;
        self.wait_until_idle();

        self.write_command(cmd::POWER_OFF, &[])?;
        self.wait_until_idle();

        self.state = PanelState::FrameClosed;
        Ok(())
    }

    /// Drop the panel power enable. Valid from any state; idempotent.
    pub fn turn_off(&mut self) {
        self.power.set_low();
        self.state = PanelState::PoweredOff;
    }

    /// Poll the busy line at a fixed interval until it clears.
    ///
    /// No timeout: refresh duration is bounded and predictable, and a
    /// panel that never clears busy is a hardware fault surfaced by
    /// the device watchdog, not by this driver.
    fn wait_until_idle(&mut self) {
        let mut polls: u32 = 0;
        while self.busy.is_busy() {
            if polls == 0 {
                #[cfg(feature = "defmt")]
                defmt::debug!("waiting for panel busy line");
            }
            self.delay.delay_ms(self.poll_interval_ms);
            polls += 1;
        }
        if polls > 0 {
            #[cfg(feature = "defmt")]
            defmt::debug!("panel unbusy after {} polls", polls);
        }
    }

    fn write_command(&mut self, command: u8, data: &[u8]) -> Result<(), PanelError<SPI::Error>> {
        self.dc.set_low();
        self.cs.set_low();
        let res = self
            .spi
            .write(&[command])
            .and_then(|_| self.spi.flush())
            .map_err(PanelError::Spi);
        self.cs.set_high();
        res?;

        if !data.is_empty() {
            self.write_data(data)?;
        }
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), PanelError<SPI::Error>> {
        self.dc.set_high();
        self.cs.set_low();
        let res = self
            .spi
            .write(data)
            .and_then(|_| self.spi.flush())
            .map_err(PanelError::Spi);
        self.cs.set_high();
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::vec::Vec;

    /// Shared view of the mock bus: every write is recorded with the
    /// DC level in effect, so command/data phasing is observable.
    #[derive(Default)]
    struct BusLog {
        dc_high: Cell<bool>,
        writes: RefCell<Vec<(bool, Vec<u8>)>>,
    }

    impl BusLog {
        /// Command bytes in transmit order
        fn commands(&self) -> Vec<u8> {
            self.writes
                .borrow()
                .iter()
                .filter(|(dc, _)| !dc)
                .map(|(_, bytes)| bytes[0])
                .collect()
        }

        /// Data payloads in transmit order
        fn data_writes(&self) -> Vec<Vec<u8>> {
            self.writes
                .borrow()
                .iter()
                .filter(|(dc, _)| *dc)
                .map(|(_, bytes)| bytes.clone())
                .collect()
        }
    }

    struct MockSpi(Rc<BusLog>);

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = core::convert::Infallible;
    }

    impl SpiBus for MockSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.0
                .writes
                .borrow_mut()
                .push((self.0.dc_high.get(), words.to_vec()));
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> {
            read.fill(0);
            Ok(())
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct MockDc(Rc<BusLog>);

    impl ControlPin for MockDc {
        fn set_high(&mut self) {
            self.0.dc_high.set(true);
        }
        fn set_low(&mut self) {
            self.0.dc_high.set(false);
        }
    }

    /// Pin that records its level history
    struct TracePin(Rc<RefCell<Vec<bool>>>);

    impl ControlPin for TracePin {
        fn set_high(&mut self) {
            self.0.borrow_mut().push(true);
        }
        fn set_low(&mut self) {
            self.0.borrow_mut().push(false);
        }
    }

    /// Busy line that reports busy for a scripted number of polls
    struct ScriptedBusy(Rc<Cell<u32>>);

    impl BusyLine for ScriptedBusy {
        fn is_busy(&mut self) -> bool {
            let remaining = self.0.get();
            if remaining > 0 {
                self.0.set(remaining - 1);
                true
            } else {
                false
            }
        }
    }

    struct CountingDelay(Rc<Cell<u64>>);

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.set(self.0.get() + ns as u64);
        }
    }

    struct Fixture {
        bus: Rc<BusLog>,
        reset_trace: Rc<RefCell<Vec<bool>>>,
        power_trace: Rc<RefCell<Vec<bool>>>,
        busy_polls: Rc<Cell<u32>>,
        delay_ns: Rc<Cell<u64>>,
    }

    fn fixture() -> (
        Ac073Tc1<MockSpi, MockDc, TracePin, TracePin, TracePin, ScriptedBusy, CountingDelay>,
        Fixture,
    ) {
        let bus = Rc::new(BusLog::default());
        let reset_trace = Rc::new(RefCell::new(Vec::new()));
        let power_trace = Rc::new(RefCell::new(Vec::new()));
        let cs_trace = Rc::new(RefCell::new(Vec::new()));
        let busy_polls = Rc::new(Cell::new(0));
        let delay_ns = Rc::new(Cell::new(0));

        let panel = Ac073Tc1::new(
            MockSpi(bus.clone()),
            MockDc(bus.clone()),
            TracePin(cs_trace),
            TracePin(reset_trace.clone()),
            TracePin(power_trace.clone()),
            ScriptedBusy(busy_polls.clone()),
            CountingDelay(delay_ns.clone()),
        );

        (
            panel,
            Fixture {
                bus,
                reset_trace,
                power_trace,
                busy_polls,
                delay_ns,
            },
        )
    }

    #[test]
    fn test_initialize_sends_full_bringup_sequence() {
        let (mut panel, fx) = fixture();
        panel.initialize().unwrap();

        assert_eq!(panel.state(), PanelState::Configured);

        let expected_cmds: Vec<u8> = INIT_SEQUENCE.iter().map(|(c, _)| *c).collect();
        assert_eq!(fx.bus.commands(), expected_cmds);

        let expected_data: Vec<Vec<u8>> =
            INIT_SEQUENCE.iter().map(|(_, d)| d.to_vec()).collect();
        assert_eq!(fx.bus.data_writes(), expected_data);
    }

    #[test]
    fn test_initialize_pulses_reset_and_powers_panel() {
        let (mut panel, fx) = fixture();
        panel.initialize().unwrap();

        assert_eq!(*fx.reset_trace.borrow(), [true, false, true]);
        assert_eq!(*fx.power_trace.borrow(), [true]);
        // Three reset pulse steps of 10 ms each
        assert!(fx.delay_ns.get() >= 3 * 10_000_000);
    }

    #[test]
    fn test_begin_frame_requires_configured() {
        let (mut panel, _fx) = fixture();
        assert_eq!(
            panel.begin_frame(),
            Err(PanelError::InvalidState(PanelState::Uninitialized))
        );
    }

    #[test]
    fn test_begin_frame_issues_data_start() {
        let (mut panel, fx) = fixture();
        panel.initialize().unwrap();
        panel.begin_frame().unwrap();

        assert_eq!(panel.state(), PanelState::FrameOpen);
        assert_eq!(*fx.bus.commands().last().unwrap(), cmd::DATA_START);
        assert_eq!(panel.frame_bytes(), 0);
    }

    #[test]
    fn test_send_chunk_splits_to_transaction_ceiling() {
        let (mut panel, fx) = fixture();
        panel.initialize().unwrap();
        panel.begin_frame().unwrap();

        let oversized = std::vec![0x12u8; CHUNK_BYTES + 100];
        panel.send_chunk(&oversized).unwrap();

        let writes = fx.bus.data_writes();
        let frame_writes = &writes[INIT_SEQUENCE.len()..];
        assert_eq!(frame_writes.len(), 2);
        assert_eq!(frame_writes[0].len(), CHUNK_BYTES);
        assert_eq!(frame_writes[1].len(), 100);
        assert_eq!(panel.frame_bytes(), CHUNK_BYTES + 100);
    }

    #[test]
    fn test_send_chunk_outside_frame_rejected() {
        let (mut panel, _fx) = fixture();
        panel.initialize().unwrap();
        assert_eq!(
            panel.send_chunk(&[0x00]),
            Err(PanelError::InvalidState(PanelState::Configured))
        );
    }

    #[test]
    fn test_frame_overrun_rejected() {
        let (mut panel, _fx) = fixture();
        panel.initialize().unwrap();
        panel.begin_frame().unwrap();

        let full = std::vec![0u8; PACKED_FRAME_BYTES];
        panel.send_chunk(&full).unwrap();
        assert_eq!(panel.frame_bytes(), PACKED_FRAME_BYTES);

        assert_eq!(panel.send_chunk(&[0x00, 0x00]), Err(PanelError::FrameOverrun));
    }

    #[test]
    fn test_begin_frame_restart_resets_counter() {
        let (mut panel, _fx) = fixture();
        panel.initialize().unwrap();
        panel.begin_frame().unwrap();
        panel.send_chunk(&[0x11; 64]).unwrap();

        // Failure path: re-open the frame for the fallback render
        panel.begin_frame().unwrap();
        assert_eq!(panel.frame_bytes(), 0);
        assert_eq!(panel.state(), PanelState::FrameOpen);
    }

    #[test]
    fn test_end_frame_runs_refresh_sequence() {
        let (mut panel, fx) = fixture();
        panel.initialize().unwrap();
        panel.begin_frame().unwrap();
        let full = std::vec![0u8; PACKED_FRAME_BYTES];
        panel.send_chunk(&full).unwrap();

        fx.busy_polls.set(3);
        let before_ns = fx.delay_ns.get();
        panel.end_frame().unwrap();

        assert_eq!(panel.state(), PanelState::FrameClosed);
        let cmds = fx.bus.commands();
        let tail = &cmds[cmds.len() - 3..];
        assert_eq!(tail, [cmd::POWER_ON, cmd::DISPLAY_REFRESH, cmd::POWER_OFF]);

        // Scripted 3 busy polls at the default interval
        let waited = fx.delay_ns.get() - before_ns;
        assert_eq!(waited, 3 * DEFAULT_POLL_INTERVAL_MS as u64 * 1_000_000);
    }

    #[test]
    fn test_end_frame_requires_open_frame() {
        let (mut panel, _fx) = fixture();
        panel.initialize().unwrap();
        assert_eq!(
            panel.end_frame(),
            Err(PanelError::InvalidState(PanelState::Configured))
        );
    }

    #[test]
    fn test_turn_off_idempotent_from_any_state() {
        let (mut panel, fx) = fixture();
        panel.turn_off();
        panel.turn_off();
        assert_eq!(panel.state(), PanelState::PoweredOff);
        assert_eq!(*fx.power_trace.borrow(), [false, false]);
    }

    #[test]
    fn test_reinitialize_after_power_off() {
        let (mut panel, _fx) = fixture();
        panel.initialize().unwrap();
        panel.turn_off();
        panel.initialize().unwrap();
        assert_eq!(panel.state(), PanelState::Configured);
    }

    // Session-level flows: a mock peer stream feeding the driver
    // through the byte-exact transport, the way the firmware
    // controller wires them together.

    use embassy_futures::block_on;
    use inkbridge_core::codec;
    use inkbridge_core::pattern::{EntropySource, FallbackPattern};
    use inkbridge_core::session::{FaultKind, SessionEvent, SessionState};
    use inkbridge_core::transport::{recv_exact, TransportError};

    /// Peer that delivers its first read in a scripted size, the rest
    /// however much is asked, then closes the stream.
    struct PeerStream {
        data: Vec<u8>,
        pos: usize,
        first_split: usize,
    }

    impl embedded_io_async::ErrorType for PeerStream {
        type Error = core::convert::Infallible;
    }

    impl embedded_io_async::Read for PeerStream {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let remaining = self.data.len() - self.pos;
            if remaining == 0 {
                return Ok(0);
            }
            let want = if self.pos == 0 { self.first_split } else { buf.len() };
            let n = want.min(buf.len()).min(remaining);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct XorShift(u32);

    impl EntropySource for XorShift {
        fn next_u32(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
    }

    #[test]
    fn test_arbitrary_peer_chunking_renders_full_frame() {
        let (mut panel, fx) = fixture();
        panel.initialize().unwrap();
        panel.begin_frame().unwrap();

        // Peer chunk sizes are its own business: 1 byte first, then
        // whatever the stack hands over. The device still reads fixed
        // transaction chunks.
        let frame: Vec<u8> = (0..PACKED_FRAME_BYTES)
            .map(|i| ((i % 7) << 4 | (i / 7) % 7) as u8)
            .collect();
        let mut peer = PeerStream {
            data: frame.clone(),
            pos: 0,
            first_split: 1,
        };

        let mut chunk = std::vec![0u8; CHUNK_BYTES];
        for _ in 0..PACKED_FRAME_BYTES / CHUNK_BYTES {
            block_on(recv_exact(&mut peer, &mut chunk)).unwrap();
            panel.send_chunk(&chunk).unwrap();
        }
        assert_eq!(panel.frame_bytes(), PACKED_FRAME_BYTES);

        // Zero bytes dropped or duplicated end to end
        let streamed: Vec<u8> = fx.bus.data_writes()[INIT_SEQUENCE.len()..].concat();
        assert_eq!(streamed, frame);

        panel.end_frame().unwrap();
        assert_eq!(panel.state(), PanelState::FrameClosed);
    }

    #[test]
    fn test_midstream_disconnect_falls_back_and_powers_off() {
        let (mut panel, _fx) = fixture();
        panel.initialize().unwrap();
        panel.begin_frame().unwrap();

        // Peer dies after 100000 of 192000 bytes
        let mut peer = PeerStream {
            data: std::vec![0x11; 100_000],
            pos: 0,
            first_split: 4096,
        };

        let mut state = SessionState::Streaming;
        let mut chunk = std::vec![0u8; CHUNK_BYTES];
        let mut fault = None;
        for _ in 0..PACKED_FRAME_BYTES / CHUNK_BYTES {
            if let Err(err) = block_on(recv_exact(&mut peer, &mut chunk)) {
                assert_eq!(err, TransportError::Closed);
                fault = Some(FaultKind::Transport);
                break;
            }
            panel.send_chunk(&chunk).unwrap();
        }
        state = state.transition(SessionEvent::Fault(fault.unwrap()));
        assert!(state.is_failed());

        // Fallback re-opens the frame and streams the pattern through
        // the same chunk path
        panel.begin_frame().unwrap();
        let pattern = FallbackPattern::generate(&mut XorShift(3));
        let mut pixels = pattern.pixels();
        loop {
            let n = codec::pack_iter(&mut pixels, &mut chunk).unwrap();
            if n == 0 {
                break;
            }
            panel.send_chunk(&chunk[..n]).unwrap();
        }
        assert_eq!(panel.frame_bytes(), PACKED_FRAME_BYTES);
        panel.end_frame().unwrap();
        panel.turn_off();

        state = state.transition(SessionEvent::FallbackComplete);
        assert!(state.is_terminal());
        assert_eq!(panel.state(), PanelState::PoweredOff);
    }
}
