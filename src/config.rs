use crate::color::ColorMode;

/// Default interval between two reads of the busy line
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 100;
/// Default time the power rails get to settle before a frame is sent
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 5_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// EPD Configuration
pub struct Config {
    /// Color capability of the panel
    pub color_mode: ColorMode,
    /// Thresholds used when reducing images to the palette
    pub thresholds: Thresholds,
    /// Interval between two reads of the busy line
    pub poll_interval_ms: u32,
    /// Give up waiting on the busy line after this long.
    ///
    /// `None` waits forever: a stuck busy line blocks the caller indefinitely.
    pub busy_timeout_ms: Option<u32>,
    /// Delay between [`init`](crate::epd7in5::Epd7in5::init) and sending an image in
    /// [`show_image`](crate::epd7in5::Epd7in5::show_image)
    pub settle_delay_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::default(),
            thresholds: Thresholds::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            busy_timeout_ms: None,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl Config {
    /// Default configuration for the given color capability
    pub fn new(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            ..Self::default()
        }
    }
}

/// Empirical thresholds for mapping true color pixels onto the palette
///
/// The defaults work for typical calendar content; a different panel batch
/// or source material may need retuning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Thresholds {
    /// Highest red channel value of a pixel still considered black
    pub black_max_red: u8,
    /// Largest difference between red and green of a black pixel
    pub black_rg_tolerance: u8,
    /// Lowest red and green value of a white pixel, lowest red value of a red one
    pub white_min: u8,
    /// Highest green value of a red pixel
    pub red_max_green: u8,
    /// Gray level (ITU-R 601-2 luma) that marks a red pixel when encoding
    pub red_marker_luma: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            black_max_red: 180,
            black_rg_tolerance: 0,
            white_min: 150,
            red_max_green: 90,
            red_marker_luma: 76,
        }
    }
}
