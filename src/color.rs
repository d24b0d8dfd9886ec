//! Panel palette and color capabilities

use core::fmt::{Display, Formatter};
use core::str::FromStr;

/// A color the panel can show
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Color {
    /// Black
    Black,
    /// White
    White,
    /// Red, the chromatic color of the 3-color variant
    Red,
}

impl Color {
    /// Get the 4 bit code the panel expects for this color during a refresh
    ///
    /// Two codes are sent per byte, the first pixel in the high nibble.
    pub fn display_code(self) -> u8 {
        match self {
            Color::White => 0x03,
            Color::Black => 0x00,
            Color::Red => 0x04,
        }
    }

    /// RGB representation of the color, as produced by the quantizer
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Color::White => [0xff, 0xff, 0xff],
            Color::Black => [0x00, 0x00, 0x00],
            Color::Red => [0xff, 0x00, 0x00],
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(Color::White),
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            _ => Err(ParseColorError(())),
        }
    }
}

/// Error returned when parsing an unknown color name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(());

impl Display for ParseColorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str("expected one of `white`, `black` or `red`")
    }
}

impl std::error::Error for ParseColorError {}

/// Color capability of the connected panel
///
/// Fixed for the lifetime of a driver. Selects the palette, the bit packing
/// of a [`FrameBuffer`](crate::frame::FrameBuffer) and its size.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum ColorMode {
    /// Black and white, 1 bit per pixel
    #[default]
    Monochrome,
    /// Black, white and red, 2 bits per pixel
    TwoPlusOne,
}

impl ColorMode {
    /// Number of bits one pixel occupies in a frame buffer
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            ColorMode::Monochrome => 1,
            ColorMode::TwoPlusOne => 2,
        }
    }

    /// Number of pixels packed into one byte
    pub const fn pixels_per_byte(self) -> u32 {
        8 / self.bits_per_pixel()
    }

    /// Size of a frame buffer for a `width` x `height` panel
    ///
    /// A trailing partial byte is padded, so odd pixel counts still fit.
    pub const fn buffer_len(self, width: u32, height: u32) -> usize {
        (width * height).div_ceil(self.pixels_per_byte()) as usize
    }

    /// Colors the panel can show in this mode
    pub fn palette(self) -> &'static [Color] {
        match self {
            ColorMode::Monochrome => &[Color::Black, Color::White],
            ColorMode::TwoPlusOne => &[Color::Black, Color::White, Color::Red],
        }
    }

    /// Bit pattern of `color` inside a frame buffer
    ///
    /// Red can't be shown on a monochrome panel and is stored as black.
    pub fn pixel_bits(self, color: Color) -> u8 {
        match (self, color) {
            (ColorMode::Monochrome, Color::White) => 0b1,
            (ColorMode::Monochrome, _) => 0b0,
            (ColorMode::TwoPlusOne, Color::White) => 0b11,
            (ColorMode::TwoPlusOne, Color::Black) => 0b00,
            (ColorMode::TwoPlusOne, Color::Red) => 0b01,
        }
    }

    /// Color of a bit pattern read back from a frame buffer
    ///
    /// In 2 bit mode everything that is neither white nor black is red.
    pub fn color_of(self, bits: u8) -> Color {
        match (self, bits) {
            (ColorMode::Monochrome, 0) => Color::Black,
            (ColorMode::Monochrome, _) => Color::White,
            (ColorMode::TwoPlusOne, 0b11) => Color::White,
            (ColorMode::TwoPlusOne, 0b00) => Color::Black,
            (ColorMode::TwoPlusOne, _) => Color::Red,
        }
    }

    /// A byte of a frame buffer where every pixel is `color`
    pub fn fill_byte(self, color: Color) -> u8 {
        let bits = self.pixel_bits(color);
        let bpp = self.bits_per_pixel();
        (0..self.pixels_per_byte()).fold(0u8, |byte, _| (byte << bpp) | bits)
    }
}

impl FromStr for ColorMode {
    type Err = ParseColorModeError;

    /// Accepts the values used by settings files: `black_and_white`/`monochrome`
    /// and `colour`/`color`/`two_plus_one`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black_and_white" | "monochrome" | "bw" => Ok(ColorMode::Monochrome),
            "colour" | "color" | "two_plus_one" | "bwr" => Ok(ColorMode::TwoPlusOne),
            _ => Err(ParseColorModeError(())),
        }
    }
}

/// Error returned when parsing an unknown display type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorModeError(());

impl Display for ParseColorModeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str("expected `black_and_white` or `colour` as display type")
    }
}

impl std::error::Error for ParseColorModeError {}
