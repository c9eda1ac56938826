//! Byte-exact stream transfer
//!
//! Stream sockets are free to transfer fewer bytes than asked. These
//! primitives loop until the full buffer has moved, so partial
//! transfers are invisible to every caller above this layer.
//!
//! There is no retry here: a zero-length read is the peer closing the
//! stream and is fatal, and any underlying error surfaces immediately.
//! Reconnect policy belongs to the session orchestrator.

use embedded_io_async::{Read, Write};

/// Stream transfer failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// Peer closed the stream before the transfer was satisfied
    Closed,
    /// Underlying stream error
    Io(E),
}

/// Receive exactly `buf.len()` bytes into `buf`.
pub async fn recv_exact<R: Read>(
    stream: &mut R,
    buf: &mut [u8],
) -> Result<(), TransportError<R::Error>> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]).await {
            Ok(0) => return Err(TransportError::Closed),
            Ok(n) => filled += n,
            Err(e) => return Err(TransportError::Io(e)),
        }
    }
    Ok(())
}

/// Send exactly `buf.len()` bytes from `buf`.
pub async fn send_exact<W: Write>(
    stream: &mut W,
    buf: &[u8],
) -> Result<(), TransportError<W::Error>> {
    let mut sent = 0;
    while sent < buf.len() {
        match stream.write(&buf[sent..]).await {
            Ok(0) => return Err(TransportError::Closed),
            Ok(n) => sent += n,
            Err(e) => return Err(TransportError::Io(e)),
        }
    }
    Ok(())
}
