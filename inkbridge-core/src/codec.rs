//! Pixel packing for the panel data phase
//!
//! The panel takes two 4-bit pixels per byte, high nibble first. The
//! codec only packs; the panel is write-only from this device, so
//! unpacking is never needed at runtime.
//!
//! An odd pixel count is a caller contract violation and is rejected
//! rather than silently dropping the trailing pixel.

use crate::color::Color;

/// Packing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Input pixel count is not a multiple of two
    OddPixelCount,
    /// Output buffer cannot hold the packed result
    BufferTooSmall,
}

/// Pack a pixel slice two per byte, high nibble first.
///
/// Returns the number of bytes written.
pub fn pack(pixels: &[Color], out: &mut [u8]) -> Result<usize, CodecError> {
    if pixels.len() % 2 != 0 {
        return Err(CodecError::OddPixelCount);
    }
    let nbytes = pixels.len() / 2;
    if out.len() < nbytes {
        return Err(CodecError::BufferTooSmall);
    }

    for (byte, pair) in out.iter_mut().zip(pixels.chunks_exact(2)) {
        *byte = pair[0].nibble() << 4 | pair[1].nibble();
    }

    Ok(nbytes)
}

/// Pack pixels from an iterator until it is exhausted or `out` is full.
///
/// Returns the number of bytes written; `0` means the iterator was
/// already empty. An iterator that ends on a half-filled byte is an
/// odd pixel count and is rejected.
///
/// This is the streaming entry point: the fallback generator feeds its
/// row-major pixel stream through here one transaction chunk at a time
/// without ever materializing the frame.
pub fn pack_iter<I>(pixels: &mut I, out: &mut [u8]) -> Result<usize, CodecError>
where
    I: Iterator<Item = Color>,
{
    let mut nbytes = 0;

    for byte in out.iter_mut() {
        let first = match pixels.next() {
            Some(p) => p,
            None => break,
        };
        let second = pixels.next().ok_or(CodecError::OddPixelCount)?;
        *byte = first.nibble() << 4 | second.nibble();
        nbytes += 1;
    }

    Ok(nbytes)
}
