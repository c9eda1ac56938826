//! Procedural fallback pattern
//!
//! Rendered when no frame can be fetched, so a failed wake cycle is
//! visible on the panel instead of leaving stale content up. The image
//! is a Voronoi-style cell pattern: random colored nodes scattered
//! over the frame, every pixel taking the color of its nearest node
//! (dithered between the node's two colors in a checkerboard), with a
//! black border drawn along the bisector between neighboring cells.
//!
//! Pixels are computed on demand in row-major order, so the frame is
//! streamed into transaction chunks without ever being materialized.

use libm::sqrtf;

use crate::color::Color;
use crate::frame::{HEIGHT, PIXEL_COUNT, WIDTH};

/// Number of nodes scattered per invocation
pub const NODE_COUNT: usize = 40;

/// Half-width of the black border band around cell boundaries, in
/// pixel units. Independent of the node count.
const BORDER_HALF_WIDTH: f32 = 1.0;

/// Entropy seam for node placement. The firmware feeds this from the
/// RP2040 ring oscillator; tests use a seeded xorshift.
pub trait EntropySource {
    fn next_u32(&mut self) -> u32;
}

/// A pattern node: a point with a primary and an alternate color used
/// for the checkerboard dither of its cell.
#[derive(Debug, Clone, Copy)]
struct Node {
    x: f32,
    y: f32,
    primary: Color,
    alternate: Color,
}

impl Node {
    fn scatter(rng: &mut impl EntropySource) -> Self {
        let primary = pick_color(rng);
        // Half the nodes dither between two colors, half are solid
        let alternate = if rng.next_u32() % 2 == 0 {
            primary
        } else {
            pick_color(rng)
        };
        Self {
            x: uniform(rng) * WIDTH as f32,
            y: uniform(rng) * HEIGHT as f32,
            primary,
            alternate,
        }
    }
}

fn uniform(rng: &mut impl EntropySource) -> f32 {
    rng.next_u32() as f32 / u32::MAX as f32
}

fn pick_color(rng: &mut impl EntropySource) -> Color {
    Color::PALETTE[(rng.next_u32() % Color::PALETTE.len() as u32) as usize]
}

/// Find the indices of the two nearest nodes to `(x, y)`.
///
/// Linear scan; the first node encountered at a given minimum distance
/// wins ties, which keeps the output deterministic for a fixed node
/// order.
fn two_nearest(nodes: &[Node], x: f32, y: f32) -> (usize, usize) {
    debug_assert!(nodes.len() >= 2);

    let mut best = 0;
    let mut best_d2 = f32::INFINITY;
    let mut second = 0;
    let mut second_d2 = f32::INFINITY;

    for (i, node) in nodes.iter().enumerate() {
        // Squared distance preserves the Euclidean ordering
        let dx = x - node.x;
        let dy = y - node.y;
        let d2 = dx * dx + dy * dy;

        if d2 < best_d2 {
            second = best;
            second_d2 = best_d2;
            best = i;
            best_d2 = d2;
        } else if d2 < second_d2 {
            second = i;
            second_d2 = d2;
        }
    }

    (best, second)
}

/// A generated fallback frame, cheap to sample at any coordinate
pub struct FallbackPattern {
    nodes: [Node; NODE_COUNT],
}

impl FallbackPattern {
    /// Scatter a fresh set of nodes. Nothing persists across wake
    /// cycles; every invocation produces a new pattern.
    pub fn generate(rng: &mut impl EntropySource) -> Self {
        Self {
            nodes: core::array::from_fn(|_| Node::scatter(rng)),
        }
    }

    #[cfg(test)]
    fn from_nodes(nodes: [Node; NODE_COUNT]) -> Self {
        Self { nodes }
    }

    /// Color of the pixel at `(x, y)`
    pub fn color_at(&self, x: usize, y: usize) -> Color {
        let fx = x as f32;
        let fy = y as f32;

        let (nearest_idx, second_idx) = two_nearest(&self.nodes, fx, fy);
        let nearest = &self.nodes[nearest_idx];
        let second = &self.nodes[second_idx];

        // Signed distance from the pixel to the perpendicular bisector
        // of the two nearest nodes: project the offset from the
        // bisector midpoint onto the inter-node direction.
        let dx = second.x - nearest.x;
        let dy = second.y - nearest.y;
        let d = sqrtf(dx * dx + dy * dy);
        if d > 0.0 {
            let mx = (nearest.x + second.x) / 2.0;
            let my = (nearest.y + second.y) / 2.0;
            let signed = (fx - mx) * (dx / d) + (fy - my) * (dy / d);
            if signed > -BORDER_HALF_WIDTH && signed < BORDER_HALF_WIDTH {
                return Color::Black;
            }
        }

        // Checkerboard dither between the cell's two colors
        if (x + y) % 2 == 0 {
            nearest.primary
        } else {
            nearest.alternate
        }
    }

    /// Row-major pixel stream over the full frame
    pub fn pixels(&self) -> Pixels<'_> {
        Pixels {
            pattern: self,
            idx: 0,
        }
    }
}

/// Row-major iterator over a pattern's pixels
pub struct Pixels<'a> {
    pattern: &'a FallbackPattern,
    idx: usize,
}

impl Iterator for Pixels<'_> {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        if self.idx >= PIXEL_COUNT {
            return None;
        }
        let x = self.idx % WIDTH;
        let y = self.idx / WIDTH;
        self.idx += 1;
        Some(self.pattern.color_at(x, y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = PIXEL_COUNT - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Pixels<'_> {}
