//! A Driver for the 7.5" 640x384 E-Ink Displays (black/white and black/white/red) via SPI
//!
//! This driver was built using [`embedded-hal`] traits. Next to the register
//! protocol it takes care of getting an arbitrary image onto the panel: reducing
//! it to the panel palette ([`quantize`]), packing it into the native frame format
//! ([`frame`]) and streaming it to the display ([`epd7in5`]).
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/1.0.0
//!
//! # Requirements
//!
//! ### SPI
//!
//! - MISO is not connected/available
//! - SPI_MODE_0 is used (CPHL = 0, CPOL = 0)
//! - 8 bits per word, MSB first
//! - 4Mhz is known to work
//!
//! ### Other....
//!
//! - Frame buffers are always full frames: `width * height / 8` bytes for black/white
//!   panels and `width * height / 4` bytes for black/white/red panels
//! - There is a single owner of the panel at a time; every operation borrows the
//!   driver, the spi device and the delay mutably and runs to completion
//!
//! # Examples
//!
//! ```ignore
//! use epd7in5_panel::{epd7in5::Epd7in5, prelude::*};
//!
//! let mut epd = Epd7in5::new(busy, dc, rst, Config::new(ColorMode::Monochrome));
//!
//! // 640x384 or 384x640
//! let image = image::open("calendar.png")?.to_rgb8();
//! epd.show_image(&mut spi, &mut delay, &image, true)?;
//!
//! // wipe the screen later on
//! epd.clear(&mut spi, &mut delay, Color::White)?;
//! ```
//!
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod quantize;

mod traits;

/// Interface for the physical connection between display and the controlling device
mod interface;

pub mod epd7in5;

#[cfg(test)]
mod mock;

pub mod prelude {
    pub use crate::color::{Color, ColorMode};
    pub use crate::config::{Config, Thresholds};
    pub use crate::error::{DimensionMismatch, ErrorKind};
    pub use crate::frame::{FrameBuffer, PanelGeometry};
    pub use crate::SPI_MODE;
}

use embedded_hal::spi::{Mode, Phase, Polarity};

/// SPI mode -
/// For more infos see [Requirements: SPI](index.html#spi)
pub const SPI_MODE: Mode = Mode {
    phase: Phase::CaptureOnFirstTransition,
    polarity: Polarity::IdleLow,
};
