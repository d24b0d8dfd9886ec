use core::fmt::{Debug, Display, Formatter};

use embedded_hal::{digital, spi};

use crate::color::ColorMode;

/// An image (or frame buffer) whose size fits neither orientation of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionMismatch {
    /// Panel size as `(width, height)`
    pub expected: (u32, u32),
    /// Size of the rejected input as `(width, height)`
    pub actual: (u32, u32),
}

impl Display for DimensionMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "image must be the same size as the display ({}x{} or {}x{}), got {}x{}",
            self.expected.0,
            self.expected.1,
            self.expected.1,
            self.expected.0,
            self.actual.0,
            self.actual.1
        )
    }
}

impl std::error::Error for DimensionMismatch {}

/// Epd error type
pub enum ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    BUSY: digital::ErrorType,
    DC: digital::ErrorType,
    RST: digital::ErrorType,
{
    /// Encountered an SPI error
    SpiError(SPI::Error),

    /// Encountered an error on Busy GPIO
    BusyError(BUSY::Error),

    /// Encountered an error on DC GPIO
    DcError(DC::Error),

    /// Encountered an error on RST GPIO
    RstError(RST::Error),

    /// The image or frame buffer doesn't fit the panel. Raised before anything is sent.
    DimensionMismatch(DimensionMismatch),

    /// The frame buffer was encoded for a different [`ColorMode`] than the driver runs in
    ModeMismatch {
        /// Mode of the driver
        expected: ColorMode,
        /// Mode the buffer was encoded with
        actual: ColorMode,
    },

    /// The busy line didn't release before the configured deadline
    BusyTimeout {
        /// Time spent polling in ms
        waited_ms: u32,
    },
}

impl<SPI, BUSY, DC, RST> From<DimensionMismatch> for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    BUSY: digital::ErrorType,
    DC: digital::ErrorType,
    RST: digital::ErrorType,
{
    fn from(err: DimensionMismatch) -> Self {
        Self::DimensionMismatch(err)
    }
}

impl<SPI, BUSY, DC, RST> Clone for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    SPI::Error: Clone,
    BUSY: digital::ErrorType,
    BUSY::Error: Clone,
    DC: digital::ErrorType,
    DC::Error: Clone,
    RST: digital::ErrorType,
    RST::Error: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::SpiError(err) => Self::SpiError(err.clone()),
            Self::BusyError(err) => Self::BusyError(err.clone()),
            Self::DcError(err) => Self::DcError(err.clone()),
            Self::RstError(err) => Self::RstError(err.clone()),
            Self::DimensionMismatch(err) => Self::DimensionMismatch(*err),
            Self::ModeMismatch { expected, actual } => Self::ModeMismatch {
                expected: *expected,
                actual: *actual,
            },
            Self::BusyTimeout { waited_ms } => Self::BusyTimeout {
                waited_ms: *waited_ms,
            },
        }
    }
}

impl<SPI, BUSY, DC, RST> Display for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    BUSY: digital::ErrorType,
    DC: digital::ErrorType,
    RST: digital::ErrorType,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        use digital::Error as _;
        use spi::Error as _;

        match self {
            Self::SpiError(err) => write!(f, "spi: {}", err.kind()),
            Self::BusyError(err) => write!(f, "busy pin: {}", err.kind()),
            Self::DcError(err) => write!(f, "dc pin: {}", err.kind()),
            Self::RstError(err) => write!(f, "rst pin: {}", err.kind()),
            Self::DimensionMismatch(err) => Display::fmt(err, f),
            Self::ModeMismatch { expected, actual } => write!(
                f,
                "frame buffer was encoded for {actual:?} but the display runs in {expected:?}"
            ),
            Self::BusyTimeout { waited_ms } => {
                write!(f, "display still busy after {waited_ms}ms")
            }
        }
    }
}

impl<SPI, BUSY, DC, RST> Debug for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    BUSY: digital::ErrorType,
    DC: digital::ErrorType,
    RST: digital::ErrorType,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpiError(err) => f.debug_tuple("SpiError").field(err).finish(),
            Self::BusyError(err) => f.debug_tuple("BusyError").field(err).finish(),
            Self::DcError(err) => f.debug_tuple("DcError").field(err).finish(),
            Self::RstError(err) => f.debug_tuple("RstError").field(err).finish(),
            Self::DimensionMismatch(err) => f.debug_tuple("DimensionMismatch").field(err).finish(),
            Self::ModeMismatch { expected, actual } => f
                .debug_struct("ModeMismatch")
                .field("expected", expected)
                .field("actual", actual)
                .finish(),
            Self::BusyTimeout { waited_ms } => f
                .debug_struct("BusyTimeout")
                .field("waited_ms", waited_ms)
                .finish(),
        }
    }
}

impl<SPI, BUSY, DC, RST> std::error::Error for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: spi::ErrorType,
    BUSY: digital::ErrorType,
    DC: digital::ErrorType,
    RST: digital::ErrorType,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Pin, Spi};

    type Error = ErrorKind<Spi, Pin, Pin, Pin>;

    #[test]
    fn dimension_mismatch_message() {
        let err: Error = DimensionMismatch {
            expected: (640, 384),
            actual: (100, 100),
        }
        .into();
        assert_eq!(
            format!("{err}"),
            "image must be the same size as the display (640x384 or 384x640), got 100x100"
        );
    }

    #[test]
    fn busy_timeout_message() {
        let err = Error::BusyTimeout { waited_ms: 300 };
        assert_eq!(format!("{err}"), "display still busy after 300ms");
        assert_eq!(
            format!("{err:?}"),
            "BusyTimeout { waited_ms: 300 }"
        );
    }
}
