//! Reducing true color images to the panel palette
//!
//! Runs before [`encode`](crate::frame::encode) so that the encoder sees as few
//! ambiguous pixels as possible. Monochrome images are converted to gray and
//! dithered (Floyd-Steinberg) down to two levels. Images for 3 color panels go
//! through a per pixel heuristic on the red and green channels; pixels it can't
//! place are left untouched.

use image::{imageops, GrayImage, Luma, Rgb, RgbImage};

use crate::color::{Color, ColorMode};
use crate::config::Thresholds;

/// Reduces `image` to the palette of `mode`
///
/// Never fails: pixels that fit none of the rules keep their original color.
pub fn quantize(image: &RgbImage, mode: ColorMode, thresholds: &Thresholds) -> RgbImage {
    match mode {
        ColorMode::Monochrome => {
            let bilevel = bilevel(image);
            RgbImage::from_fn(image.width(), image.height(), |x, y| {
                if bilevel.get_pixel(x, y)[0] == 0 {
                    Rgb(Color::Black.rgb())
                } else {
                    Rgb(Color::White.rgb())
                }
            })
        }
        ColorMode::TwoPlusOne => {
            let mut out = image.clone();
            for pixel in out.pixels_mut() {
                if let Some(color) = classify(*pixel, thresholds) {
                    *pixel = Rgb(color.rgb());
                }
            }
            out
        }
    }
}

/// Classifies a single pixel for a black/white/red panel
///
/// The first matching rule wins:
/// - black: dark red channel and red about equal to green
/// - white: bright red and green
/// - red: bright red but little green
pub fn classify(pixel: Rgb<u8>, thresholds: &Thresholds) -> Option<Color> {
    let [r, g, _] = pixel.0;
    if r <= thresholds.black_max_red && r.abs_diff(g) <= thresholds.black_rg_tolerance {
        Some(Color::Black)
    } else if r >= thresholds.white_min && g >= thresholds.white_min {
        Some(Color::White)
    } else if r >= thresholds.white_min && g <= thresholds.red_max_green {
        Some(Color::Red)
    } else {
        None
    }
}

/// ITU-R 601-2 luma, the classic `L = R * 299/1000 + G * 587/1000 + B * 114/1000`
///
/// Pure red maps to 76, which the encoder uses as red marker.
pub(crate) fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0.map(u32::from);
    ((19_595 * r + 38_470 * g + 7_471 * b + 0x8000) >> 16) as u8
}

/// Gray conversion followed by Floyd-Steinberg dithering to 0 and 255
pub(crate) fn bilevel(image: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([luma(image.get_pixel(x, y))])
    });
    imageops::dither(&mut gray, &imageops::BiLevel);
    gray
}
