//! Wake-cycle session state machine
//!
//! One wake cycle is one sequential session: handshake with the frame
//! server, stream the frame, refresh the panel, sleep. Any network or
//! protocol failure shortcuts to a fallback render so the panel always
//! reflects device health. The firmware controller owns the state and
//! drives transitions; nothing else mutates it.

/// Greeting the device sends after connecting
pub const GREETING: &[u8; 6] = b"hii^_^";

/// Reply the frame server must answer with
pub const GREETING_REPLY: &[u8; 5] = b"hewwo";

/// Connection attempts before giving up on the server
pub const RECONNECT_ATTEMPTS: u32 = 5;

/// Delay between connection attempts, in milliseconds
pub const RECONNECT_DELAY_MS: u64 = 3000;

/// Handshake failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// The server's reply did not match [`GREETING_REPLY`]
    GreetingMismatch,
}

/// Verify the server's handshake reply.
pub fn check_greeting_reply(reply: &[u8; 5]) -> Result<(), ProtocolError> {
    if reply == GREETING_REPLY {
        Ok(())
    } else {
        Err(ProtocolError::GreetingMismatch)
    }
}

/// Where a session fault originated, for logging and LED status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Socket create/connect/send/recv failure, including clean close
    Transport,
    /// Handshake mismatch
    Protocol,
    /// Panel driver refused or failed an operation
    Panel,
}

/// Session states for one wake cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Powered up, panel configured, network not yet touched
    Idle,
    /// Connecting and exchanging greetings
    Handshaking,
    /// Receiving packed frame chunks and forwarding to the panel
    Streaming,
    /// Frame complete; panel refresh in progress
    Rendering,
    /// A fault routed the cycle to the fallback render
    Failed(FaultKind),
    /// Terminal for this wake cycle
    Sleeping,
}

/// Session events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// Network is up, begin the session
    Start,
    /// Connection made and greetings verified
    GreetingExchanged,
    /// Full frame received and forwarded
    FrameReceived,
    /// Panel refresh sequence finished
    RenderComplete,
    /// Fallback pattern rendered after a fault
    FallbackComplete,
    /// A fault occurred in the current phase
    Fault(FaultKind),
}

impl SessionState {
    /// True once the cycle is on the fallback path
    pub fn is_failed(&self) -> bool {
        matches!(self, SessionState::Failed(_))
    }

    /// True when nothing further happens this wake cycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Sleeping)
    }

    /// Process an event and return the next state.
    pub fn transition(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Idle, Start) => Handshaking,

            (Handshaking, GreetingExchanged) => Streaming,
            (Handshaking, Fault(kind)) => Failed(kind),

            (Streaming, FrameReceived) => Rendering,
            (Streaming, Fault(kind)) => Failed(kind),

            (Rendering, RenderComplete) => Sleeping,

            (Failed(_), FallbackComplete) => Sleeping,
            // A fault during the fallback render is unrecoverable;
            // there is no nested fallback.
            (Failed(_), Fault(_)) => Sleeping,

            // Default: stay in current state
            _ => self,
        }
    }
}
