//! Packing images into the frame format of the panel
//!
//! A [`FrameBuffer`] holds one full frame, row-major, with the first pixel in the
//! most significant bits of a byte:
//!
//! - [`ColorMode::Monochrome`]: 1 bit per pixel, `1` white, `0` black
//! - [`ColorMode::TwoPlusOne`]: 2 bits per pixel, `11` white, `00` black, `01` red
//!
//! While transmitting, the controller expands every pixel into a 4 bit display code.

use std::borrow::Cow;

use bit_field::BitField;
use image::{imageops, RgbImage};
use log::debug;

use crate::color::{Color, ColorMode};
use crate::config::Thresholds;
use crate::error::DimensionMismatch;
use crate::quantize::{bilevel, luma};

/// Size of a panel in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PanelGeometry {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PanelGeometry {
    /// Creates a new geometry
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels of a full frame
    pub const fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// The same panel turned by 90 degrees
    pub const fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// A full frame, packed in the native format of the panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    mode: ColorMode,
    geometry: PanelGeometry,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// A frame where every pixel has the same color
    pub fn filled(mode: ColorMode, geometry: PanelGeometry, color: Color) -> Self {
        let len = mode.buffer_len(geometry.width, geometry.height);
        Self {
            mode,
            geometry,
            data: vec![mode.fill_byte(color); len],
        }
    }

    /// Color mode this frame was packed for
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Geometry this frame was packed for
    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// The packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of packed bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a frame of a zero sized panel
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Color of the pixel at (`x`, `y`)
    ///
    /// Panics if the position is outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        assert!(x < self.geometry.width && y < self.geometry.height);
        self.color_at((y * self.geometry.width + x) as usize)
    }

    /// Unpacks all pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Color> + '_ {
        (0..self.geometry.pixel_count() as usize).map(move |index| self.color_at(index))
    }

    /// Transcodes the frame into the stream the panel expects after
    /// `DataStartTransmission1`
    ///
    /// Every byte holds two pixels as 4 bit display codes (white `0x3`, black `0x0`,
    /// red `0x4`), the first one in the high nibble. The stream therefore always has
    /// `width * height / 2` bytes, no matter how the frame is packed.
    pub fn display_stream(&self) -> Vec<u8> {
        let mut stream = Vec::with_capacity(self.geometry.pixel_count() as usize / 2);
        let mut pixels = self.pixels();
        while let Some(first) = pixels.next() {
            let second = pixels.next().unwrap_or(Color::White);
            stream.push((first.display_code() << 4) | second.display_code());
        }
        stream
    }

    fn slot(&self, index: usize) -> (usize, core::ops::Range<usize>) {
        let bpp = self.mode.bits_per_pixel() as usize;
        let per_byte = self.mode.pixels_per_byte() as usize;
        let low = 8 - bpp * (index % per_byte + 1);
        (index / per_byte, low..low + bpp)
    }

    fn color_at(&self, index: usize) -> Color {
        let (byte, bits) = self.slot(index);
        self.mode.color_of(self.data[byte].get_bits(bits))
    }

    fn set_color(&mut self, index: usize, color: Color) {
        let (byte, bits) = self.slot(index);
        let value = self.mode.pixel_bits(color);
        self.data[byte].set_bits(bits, value);
    }
}

/// Packs `image` into a [`FrameBuffer`] for a panel of `geometry`
///
/// An image in the other orientation (height x width) is rotated by 270 degrees
/// (counter-clockwise) first. Any other size fails with [`DimensionMismatch`].
///
/// In monochrome mode the image is converted to gray and dithered, so true color
/// input is fine. In 3 color mode only pure black, and pixels that are pure red
/// in gray scale (luma equal to `thresholds.red_marker_luma`), stay dark; run the
/// image through [`quantize`](crate::quantize::quantize) first.
pub fn encode(
    image: &RgbImage,
    mode: ColorMode,
    geometry: PanelGeometry,
    thresholds: &Thresholds,
) -> Result<FrameBuffer, DimensionMismatch> {
    let image = orient(image, geometry)?;
    let mut frame = FrameBuffer::filled(mode, geometry, Color::Black);

    match mode {
        ColorMode::Monochrome => {
            for (index, pixel) in bilevel(&image).pixels().enumerate() {
                if pixel[0] != 0 {
                    frame.set_color(index, Color::White);
                }
            }
        }
        ColorMode::TwoPlusOne => {
            for (index, pixel) in image.pixels().enumerate() {
                let color = match luma(pixel) {
                    0 => Color::Black,
                    l if l == thresholds.red_marker_luma => Color::Red,
                    _ => Color::White,
                };
                frame.set_color(index, color);
            }
        }
    }

    Ok(frame)
}

fn orient(image: &RgbImage, geometry: PanelGeometry) -> Result<Cow<'_, RgbImage>, DimensionMismatch> {
    let size = PanelGeometry::new(image.width(), image.height());
    if size == geometry {
        Ok(Cow::Borrowed(image))
    } else if size == geometry.swapped() {
        debug!("rotating {}x{} image by 270 degrees", size.width, size.height);
        // 270 degrees counter-clockwise
        Ok(Cow::Owned(imageops::rotate90(image)))
    } else {
        Err(DimensionMismatch {
            expected: (geometry.width, geometry.height),
            actual: (size.width, size.height),
        })
    }
}
