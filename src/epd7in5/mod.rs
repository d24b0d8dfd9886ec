//! A simple Driver for the Waveshare 7.5" E-Ink Display (640x384) via SPI
//!
//! Drives both the black/white panel and the black/white/red (B/C) variant; the
//! [`ColorMode`] of the [`Config`] selects which one is connected.
//!
//! # References
//!
//! - [Datasheet](https://www.waveshare.com/wiki/7.5inch_e-Paper_HAT)
//! - [Waveshare C driver](https://github.com/waveshare/e-Paper/blob/702def06bcb75983c98b0f9d25d43c552c248eb0/RaspberryPi%26JetsonNano/c/lib/e-Paper/EPD_7in5.c)
//! - [Waveshare Python driver](https://github.com/waveshare/e-Paper/blob/702def06bcb75983c98b0f9d25d43c552c248eb0/RaspberryPi%26JetsonNano/python/lib/waveshare_epd/epd7in5.py)
//!
//! # Example
//!
//!```rust, no_run
//!# use epd7in5_panel::{epd7in5::Epd7in5, prelude::*};
//!# use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}, spi::SpiDevice};
//!# fn run<SPI, BUSY, DC, RST, DELAY>(mut spi: SPI, busy: BUSY, dc: DC, rst: RST, mut delay: DELAY)
//!# where SPI: SpiDevice, BUSY: InputPin, DC: OutputPin, RST: OutputPin, DELAY: DelayNs {
//!let mut epd = Epd7in5::new(busy, dc, rst, Config::new(ColorMode::TwoPlusOne));
//!
//!let image = image::RgbImage::from_pixel(640, 384, image::Rgb([255, 255, 255]));
//!let _ = epd.show_image(&mut spi, &mut delay, &image, true);
//!
//!let _ = epd.clear(&mut spi, &mut delay, Color::White);
//!# }
//!```

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use image::RgbImage;
use log::{debug, info, warn};

use crate::color::{Color, ColorMode};
use crate::config::Config;
use crate::error::{DimensionMismatch, ErrorKind};
use crate::frame::{encode, FrameBuffer, PanelGeometry};
use crate::interface::DisplayInterface;
use crate::quantize::quantize;

pub(crate) mod command;
use self::command::Command;

/// Width of the display
pub const WIDTH: u32 = 640;
/// Height of the display
pub const HEIGHT: u32 = 384;
/// Geometry of the display
pub const GEOMETRY: PanelGeometry = PanelGeometry::new(WIDTH, HEIGHT);

/// Time the reset line is held low, and the time given to the panel afterwards
const RESET_DURATION_MS: u32 = 200;
/// The panel needs a moment before it reports busy after a refresh was triggered
const REFRESH_DELAY_MS: u32 = 100;
/// Check code of the deep sleep command
const DEEP_SLEEP_CHECK_CODE: u8 = 0xA5;

const RESOLUTION: [u8; 4] = [
    (WIDTH >> 8) as u8,
    WIDTH as u8,
    (HEIGHT >> 8) as u8,
    HEIGHT as u8,
];

#[derive(Clone, Copy, Debug)]
enum InitStep {
    Write(Command, &'static [u8]),
    WaitUntilIdle,
}

/// Register setup after a reset, in the order the controller requires
const INIT_SEQUENCE: [InitStep; 12] = [
    InitStep::Write(Command::PowerSetting, &[0x37, 0x00]),
    // - 640 x 384
    // - Using LUT from external flash
    InitStep::Write(Command::PanelSetting, &[0xCF, 0x08]),
    InitStep::Write(Command::BoosterSoftStart, &[0xC7, 0xCC, 0x28]),
    InitStep::Write(Command::PowerOn, &[]),
    InitStep::WaitUntilIdle,
    // 50Hz
    InitStep::Write(Command::PllControl, &[0x3C]),
    // internal temperature sensor
    InitStep::Write(Command::TemperatureCalibration, &[0x00]),
    // Vcom and data interval 10, border white
    InitStep::Write(Command::VcomAndDataIntervalSetting, &[0x77]),
    InitStep::Write(Command::TconSetting, &[0x22]),
    InitStep::Write(Command::TconResolution, &RESOLUTION),
    // -1.5V, decided by the LUT
    InitStep::Write(Command::VcmDcSetting, &[0x1E]),
    InitStep::Write(Command::FlashMode, &[0x03]),
];

/// Physical state of the panel, as far as the driver knows it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelState {
    /// Nothing has been sent since the driver was created
    Uninitialized,
    /// The reset sequence ran
    Reset,
    /// The registers are set up and the panel is powered
    Initialized,
    /// Frame data is being sent
    Transmitting,
    /// A refresh was triggered and hasn't finished yet
    Refreshing,
    /// The last refresh finished
    Idle,
    /// Deep sleep, only a new [`init`](Epd7in5::init) wakes the panel up
    Sleeping,
}

/// Epd7in5 driver
///
/// Creating the driver doesn't touch the hardware, call [`init`](Epd7in5::init)
/// (or one of the self-initialising procedures) first.
pub struct Epd7in5<SPI, BUSY, DC, RST, DELAY> {
    /// Connection Interface
    interface: DisplayInterface<SPI, BUSY, DC, RST, DELAY>,
    /// Configuration, fixed for the lifetime of the driver
    config: Config,
    state: PanelState,
}

impl<SPI, BUSY, DC, RST, DELAY> Epd7in5<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Creates a new driver from the Busy InputPin, DC and RST
    pub fn new(busy: BUSY, dc: DC, rst: RST, config: Config) -> Self {
        let interface = DisplayInterface::new(
            busy,
            dc,
            rst,
            config.poll_interval_ms,
            config.busy_timeout_ms,
        );
        Epd7in5 {
            interface,
            config,
            state: PanelState::Uninitialized,
        }
    }

    /// Configuration of the driver
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Color capability the driver encodes for
    pub fn color_mode(&self) -> ColorMode {
        self.config.color_mode
    }

    /// Width of the display
    pub fn width(&self) -> u32 {
        WIDTH
    }

    /// Height of the display
    pub fn height(&self) -> u32 {
        HEIGHT
    }

    /// Last known state of the panel
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Resets the device.
    ///
    /// Always part of [`init`](Epd7in5::init).
    pub fn reset(&mut self, delay: &mut DELAY) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.reset(delay, RESET_DURATION_MS)?;
        self.state = PanelState::Reset;
        Ok(())
    }

    /// This initialises the EPD and powers it up
    ///
    /// Calls [`reset`](Epd7in5::reset) first, so this also wakes the panel up
    /// from deep sleep.
    pub fn init(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        info!("initialising display");
        self.reset(delay)?;

        for step in INIT_SEQUENCE.iter() {
            match *step {
                InitStep::Write(command, data) => {
                    debug!("init: {:?} {:02X?}", command, data);
                    self.interface.cmd_with_data(spi, command, data)?;
                }
                InitStep::WaitUntilIdle => self.interface.wait_until_idle(delay)?,
            }
        }

        self.state = PanelState::Initialized;
        Ok(())
    }

    /// Wakes the device up from sleep, same as [`init`](Epd7in5::init)
    pub fn wake_up(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.init(spi, delay)
    }

    /// Checks if the display is still busy, without waiting
    pub fn is_busy(&mut self) -> Result<bool, ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.is_busy()
    }

    /// Wait until the display has stopped processing data
    ///
    /// Polls the busy line every [`Config::poll_interval_ms`]. Unless
    /// [`Config::busy_timeout_ms`] is set this never gives up.
    pub fn wait_until_idle(&mut self, delay: &mut DELAY) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.wait_until_idle(delay)?;
        if self.state == PanelState::Refreshing {
            self.state = PanelState::Idle;
        }
        Ok(())
    }

    /// Packs `image` for this display, optionally reducing it to the palette first
    ///
    /// Doesn't touch the hardware.
    pub fn encode(&self, image: &RgbImage, reduce_colors: bool) -> Result<FrameBuffer, DimensionMismatch> {
        let thresholds = &self.config.thresholds;
        if reduce_colors {
            debug!("optimising image for the {:?} palette", self.color_mode());
            let reduced = quantize(image, self.color_mode(), thresholds);
            encode(&reduced, self.color_mode(), GEOMETRY, thresholds)
        } else {
            encode(image, self.color_mode(), GEOMETRY, thresholds)
        }
    }

    /// Transmit a full frame to the SRAM of the EPD
    ///
    /// The frame is transcoded into the 4 bit per pixel stream the panel expects.
    /// A frame packed for another mode or size is rejected before anything is sent.
    pub fn update_frame(
        &mut self,
        spi: &mut SPI,
        frame: &FrameBuffer,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        if frame.mode() != self.color_mode() {
            return Err(ErrorKind::ModeMismatch {
                expected: self.color_mode(),
                actual: frame.mode(),
            });
        }
        if frame.geometry() != GEOMETRY {
            let geometry = frame.geometry();
            return Err(ErrorKind::DimensionMismatch(DimensionMismatch {
                expected: (WIDTH, HEIGHT),
                actual: (geometry.width, geometry.height),
            }));
        }
        if matches!(self.state, PanelState::Uninitialized | PanelState::Sleeping) {
            warn!("sending a frame while the display is {:?}", self.state);
        }

        self.state = PanelState::Transmitting;
        self.interface.cmd(spi, Command::DataStartTransmission1)?;
        self.interface.data(spi, &frame.display_stream())
    }

    /// Displays the frame data from SRAM
    ///
    /// This function waits until the device isn't busy anymore
    pub fn display_frame(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        info!("refreshing display");
        self.interface.cmd(spi, Command::DisplayRefresh)?;
        self.state = PanelState::Refreshing;
        delay.delay_ms(REFRESH_DELAY_MS);
        self.wait_until_idle(delay)
    }

    /// Transmits `frame`, refreshes the display and waits for the refresh to finish
    pub fn update_and_display_frame(
        &mut self,
        spi: &mut SPI,
        frame: FrameBuffer,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.update_frame(spi, &frame)?;
        self.display_frame(spi, delay)
    }

    /// Let the device enter deep-sleep mode to save power.
    ///
    /// Only [`init`](Epd7in5::init) brings it back.
    pub fn sleep(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        info!("sending display to deep sleep");
        self.interface.cmd(spi, Command::PowerOff)?;
        self.wait_until_idle(delay)?;
        self.interface
            .cmd_with_data(spi, Command::DeepSleep, &[DEEP_SLEEP_CHECK_CODE])?;
        self.state = PanelState::Sleeping;
        Ok(())
    }

    /// Fills the whole display with `color`
    ///
    /// Initialises the display and puts it to sleep afterwards. Red only shows on a
    /// three color panel; a monochrome one draws it black.
    pub fn clear(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        color: Color,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.init(spi, delay)?;
        self.fill(spi, delay, color)?;
        self.sleep(spi, delay)
    }

    /// Cycles the panel through solid black, red (three color panels only) and
    /// white to condition the display after long idle periods or ghosting.
    ///
    /// Initialises the display once and puts it to sleep after the last cycle.
    pub fn calibrate(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        cycles: u32,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let colors: &[Color] = match self.color_mode() {
            ColorMode::Monochrome => &[Color::Black, Color::White],
            ColorMode::TwoPlusOne => &[Color::Black, Color::Red, Color::White],
        };

        self.init(spi, delay)?;
        info!("started calibration of the display");
        for cycle in 1..=cycles {
            for &color in colors {
                debug!("calibrating {:?}", color);
                self.fill(spi, delay, color)?;
            }
            info!("calibration cycle {} of {} complete", cycle, cycles);
        }
        info!("calibration complete");
        self.sleep(spi, delay)
    }

    /// Shows `image` on the display
    ///
    /// The image has to be 640x384, or 384x640 in which case it's rotated. It's
    /// encoded before the display is touched, so a wrong size fails without side
    /// effects. With `reduce_colors` the image is mapped onto the palette first.
    ///
    /// Initialises the display, gives the power rails
    /// [`Config::settle_delay_ms`] to settle, sends and refreshes the frame, then
    /// puts the display to sleep.
    pub fn show_image(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        image: &RgbImage,
        reduce_colors: bool,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let frame = self.encode(image, reduce_colors)?;

        self.init(spi, delay)?;
        delay.delay_ms(self.config.settle_delay_ms);

        self.update_and_display_frame(spi, frame, delay)?;
        self.sleep(spi, delay)
    }

    fn fill(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        color: Color,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let frame = FrameBuffer::filled(self.color_mode(), GEOMETRY, color);
        self.update_and_display_frame(spi, frame, delay)
    }
}
