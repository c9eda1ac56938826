//! Panel color set
//!
//! The AC073TC1 understands seven colors, each encoded in four bits
//! both on the wire and in the panel data phase. Anything outside this
//! set must be rejected before it can reach hardware.

/// A displayable color, with its 4-bit panel encoding as discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Color {
    Black = 0x0,
    White = 0x1,
    Green = 0x2,
    Blue = 0x3,
    Red = 0x4,
    Yellow = 0x5,
    Orange = 0x6,
}

/// Byte value outside the panel's 4-bit color set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidColor(pub u8);

impl Color {
    /// The drawable palette used by the fallback pattern. Black is
    /// excluded; it is reserved for cell borders.
    pub const PALETTE: [Color; 6] = [
        Color::Blue,
        Color::Green,
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::White,
    ];

    /// The 4-bit panel encoding
    pub const fn nibble(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Color {
    type Error = InvalidColor;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(Color::Black),
            0x1 => Ok(Color::White),
            0x2 => Ok(Color::Green),
            0x3 => Ok(Color::Blue),
            0x4 => Ok(Color::Red),
            0x5 => Ok(Color::Yellow),
            0x6 => Ok(Color::Orange),
            other => Err(InvalidColor(other)),
        }
    }
}
