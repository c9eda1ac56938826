//! Frame geometry and chunking constants
//!
//! A frame is never materialized in memory. It moves through the
//! pipeline as a row-major stream of pixels, packed two per byte and
//! carved into fixed-size transaction chunks.

/// Panel width in pixels
pub const WIDTH: usize = 800;

/// Panel height in pixels
pub const HEIGHT: usize = 480;

/// Total pixels per frame
pub const PIXEL_COUNT: usize = WIDTH * HEIGHT;

/// Packed bytes per full frame (two pixels per byte)
pub const PACKED_FRAME_BYTES: usize = PIXEL_COUNT / 2;

/// Transaction chunk size in packed bytes: 20 rows per chunk, 24
/// chunks per frame. Also the SPI max-transfer ceiling.
pub const CHUNK_BYTES: usize = WIDTH / 2 * 20;

/// Pixels carried by one transaction chunk
pub const CHUNK_PIXELS: usize = CHUNK_BYTES * 2;
