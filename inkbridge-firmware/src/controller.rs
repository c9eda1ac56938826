//! Wake-cycle orchestrator
//!
//! Drives one session from wake to sleep: connect to the frame server,
//! exchange greetings, stream the packed frame straight into the panel
//! chunk by chunk, refresh, report the terminal state. Any fault along
//! the network path reroutes to the procedural fallback render so the
//! panel never keeps stale content across a failed cycle.

use defmt::*;
use embassy_futures::yield_now;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpEndpoint, Stack};
use embassy_time::Timer;

use inkbridge_core::codec;
use inkbridge_core::frame::{CHUNK_BYTES, PACKED_FRAME_BYTES};
use inkbridge_core::pattern::FallbackPattern;
use inkbridge_core::session::{
    check_greeting_reply, FaultKind, SessionEvent, SessionState, GREETING, GREETING_REPLY,
    RECONNECT_ATTEMPTS, RECONNECT_DELAY_MS,
};
use inkbridge_core::transport::{recv_exact, send_exact};

use crate::config;
use crate::entropy::RoscEntropy;
use crate::led::StatusLed;
use crate::panel_io::Panel;

const FRAME_CHUNKS: usize = PACKED_FRAME_BYTES / CHUNK_BYTES;

const RX_BUFFER: usize = 4096;
const TX_BUFFER: usize = 256;

fn advance(state: &mut SessionState, event: SessionEvent, led: &mut StatusLed<'_>) {
    *state = state.transition(event);
    led.show(*state);
}

/// Run one online wake cycle to its terminal state.
pub async fn run_cycle(
    stack: Stack<'static>,
    panel: &mut Panel<'_>,
    led: &mut StatusLed<'_>,
    rng: &mut RoscEntropy,
) -> SessionState {
    let mut state = SessionState::Idle;
    led.show(state);
    advance(&mut state, SessionEvent::Start, led);

    let mut rx_buf = [0u8; RX_BUFFER];
    let mut tx_buf = [0u8; TX_BUFFER];
    let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);
    socket.set_timeout(Some(config::SOCKET_TIMEOUT));

    match fetch_frame(&mut socket, panel, led, &mut state).await {
        Ok(()) => match panel.end_frame() {
            Ok(()) => advance(&mut state, SessionEvent::RenderComplete, led),
            Err(err) => {
                // The refresh sequence is not cancellable and there is
                // no point re-rendering on a wedged panel; give up on
                // this cycle.
                error!("refresh failed: {}", err);
                advance(&mut state, SessionEvent::RenderComplete, led);
            }
        },
        Err(kind) => {
            socket.abort();
            advance(&mut state, SessionEvent::Fault(kind), led);
            render_fallback(panel, led, rng, &mut state).await;
        }
    }

    state
}

/// Run a wake cycle that never had a network: straight to the
/// fallback render.
pub async fn run_offline_cycle(
    panel: &mut Panel<'_>,
    led: &mut StatusLed<'_>,
    rng: &mut RoscEntropy,
    kind: FaultKind,
) -> SessionState {
    let mut state = SessionState::Idle;
    led.show(state);
    advance(&mut state, SessionEvent::Start, led);
    advance(&mut state, SessionEvent::Fault(kind), led);
    render_fallback(panel, led, rng, &mut state).await;
    state
}

/// Connect, handshake, and stream one frame into the panel's RAM.
///
/// On success the panel holds a full frame and the session is in
/// `Rendering`; the caller runs the refresh.
async fn fetch_frame(
    socket: &mut TcpSocket<'_>,
    panel: &mut Panel<'_>,
    led: &mut StatusLed<'_>,
    state: &mut SessionState,
) -> Result<(), FaultKind> {
    let endpoint = IpEndpoint::new(config::SERVER_IP.into(), config::SERVER_PORT);

    let mut connected = false;
    for attempt in 1..=RECONNECT_ATTEMPTS {
        match socket.connect(endpoint).await {
            Ok(()) => {
                info!("connected to {} on attempt {}", endpoint, attempt);
                connected = true;
                break;
            }
            Err(err) => {
                warn!("connect attempt {} failed: {}", attempt, err);
                socket.abort();
                Timer::after_millis(RECONNECT_DELAY_MS).await;
            }
        }
    }
    if !connected {
        return Err(FaultKind::Transport);
    }

    send_exact(socket, GREETING).await.map_err(|err| {
        warn!("greeting send failed: {}", err);
        FaultKind::Transport
    })?;

    let mut reply = [0u8; GREETING_REPLY.len()];
    recv_exact(socket, &mut reply).await.map_err(|err| {
        warn!("greeting recv failed: {}", err);
        FaultKind::Transport
    })?;
    check_greeting_reply(&reply).map_err(|err| {
        warn!("handshake rejected: {}", err);
        FaultKind::Protocol
    })?;

    advance(state, SessionEvent::GreetingExchanged, led);

    panel.begin_frame().map_err(|err| {
        error!("panel refused frame start: {}", err);
        FaultKind::Panel
    })?;

    let mut chunk = [0u8; CHUNK_BYTES];
    for n in 0..FRAME_CHUNKS {
        recv_exact(socket, &mut chunk).await.map_err(|err| {
            warn!("frame truncated at chunk {}: {}", n, err);
            FaultKind::Transport
        })?;
        panel.send_chunk(&chunk).map_err(|err| {
            error!("panel rejected chunk {}: {}", n, err);
            FaultKind::Panel
        })?;
    }
    info!("frame received, {} bytes", panel.frame_bytes());

    socket.close();
    advance(state, SessionEvent::FrameReceived, led);
    Ok(())
}

/// Generate and render the procedural pattern after a fault.
async fn render_fallback(
    panel: &mut Panel<'_>,
    led: &mut StatusLed<'_>,
    rng: &mut RoscEntropy,
    state: &mut SessionState,
) {
    info!("rendering fallback pattern");
    let pattern = FallbackPattern::generate(rng);

    match stream_pattern(panel, &pattern).await {
        Ok(()) => advance(state, SessionEvent::FallbackComplete, led),
        Err(()) => {
            // No nested fallback; sleep with whatever is on the panel
            error!("fallback render failed");
            advance(state, SessionEvent::Fault(FaultKind::Panel), led);
        }
    }
}

async fn stream_pattern(panel: &mut Panel<'_>, pattern: &FallbackPattern) -> Result<(), ()> {
    panel.begin_frame().map_err(|_| ())?;

    let mut pixels = pattern.pixels();
    let mut chunk = [0u8; CHUNK_BYTES];
    loop {
        let n = codec::pack_iter(&mut pixels, &mut chunk).map_err(|_| ())?;
        if n == 0 {
            break;
        }
        panel.send_chunk(&chunk[..n]).map_err(|_| ())?;
        // Pattern generation is compute-bound; keep the radio and
        // network tasks serviced between chunks.
        yield_now().await;
    }

    panel.end_frame().map_err(|_| ())
}
