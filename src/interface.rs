use crate::{error::ErrorKind, traits::Command};
use core::marker::PhantomData;
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use log::{debug, trace};

/// Linux spidev refuses transfers larger than this
const MAX_TRANSFER_LEN: usize = 4096;

/// The Connection Interface of the EPD
///
/// Owns the control lines; the SPI device and the delay are borrowed per call.
pub(crate) struct DisplayInterface<SPI, BUSY, DC, RST, DELAY> {
    /// SPI
    _spi: PhantomData<SPI>,
    /// DELAY
    _delay: PhantomData<DELAY>,
    /// Low for busy, Wait until display is ready!
    busy: BUSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Resetting
    rst: RST,
    /// number of ms the idle loop sleeps between two reads of the busy line
    poll_interval_ms: u32,
    /// give up waiting for the busy line after this many ms
    busy_timeout_ms: Option<u32>,
}

impl<SPI, BUSY, DC, RST, DELAY> DisplayInterface<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Creates a new `DisplayInterface` struct
    pub fn new(
        busy: BUSY,
        dc: DC,
        rst: RST,
        poll_interval_ms: u32,
        busy_timeout_ms: Option<u32>,
    ) -> Self {
        DisplayInterface {
            _spi: PhantomData,
            _delay: PhantomData,
            busy,
            dc,
            rst,
            poll_interval_ms,
            busy_timeout_ms,
        }
    }

    /// Basic function for sending [Commands](Command).
    ///
    /// Enables direct interaction with the device with the help of [data()](DisplayInterface::data())
    pub(crate) fn cmd<T: Command>(
        &mut self,
        spi: &mut SPI,
        command: T,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // low for commands
        self.dc.set_low().map_err(ErrorKind::DcError)?;

        // Transfer the command over spi
        self.write(spi, &[command.address()])
    }

    /// Basic function for sending an array of u8-values of data over spi
    pub(crate) fn data(
        &mut self,
        spi: &mut SPI,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // high for data
        self.dc.set_high().map_err(ErrorKind::DcError)?;

        self.write(spi, data)
    }

    /// Basic function for sending [Commands](Command) and the data belonging to it.
    pub(crate) fn cmd_with_data<T: Command>(
        &mut self,
        spi: &mut SPI,
        command: T,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.cmd(spi, command)?;
        if data.is_empty() {
            return Ok(());
        }
        self.data(spi, data)
    }

    // spi write helper/abstraction function
    fn write(&mut self, spi: &mut SPI, data: &[u8]) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // transfer spi data
        // Be careful!! Linux has a default limit of 4096 bytes per spi transfer
        // see https://raspberrypi.stackexchange.com/questions/65595/spi-transfer-fails-with-buffer-size-greater-than-4096
        if cfg!(target_os = "linux") {
            for data_chunk in data.chunks(MAX_TRANSFER_LEN) {
                spi.write(data_chunk).map_err(ErrorKind::SpiError)?;
            }
            Ok(())
        } else {
            spi.write(data).map_err(ErrorKind::SpiError)
        }
    }

    /// Waits until device isn't busy anymore (busy == HIGH)
    ///
    /// The busy line is read, and while it is low the loop sleeps for the poll interval
    /// before reading again. Without a configured timeout this never gives up, so a
    /// stuck busy line blocks forever. Every poll counts as at least 1ms towards the
    /// timeout, so a zero interval still reaches it.
    pub(crate) fn wait_until_idle(
        &mut self,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let step_ms = self.poll_interval_ms.max(1);
        let mut waited_ms: u32 = 0;
        while self.is_busy()? {
            if let Some(timeout) = self.busy_timeout_ms {
                if waited_ms >= timeout {
                    debug!("busy line still low after {}ms, giving up", waited_ms);
                    return Err(ErrorKind::BusyTimeout { waited_ms });
                }
            }
            delay.delay_ms(self.poll_interval_ms);
            waited_ms = waited_ms.saturating_add(step_ms);
        }
        if waited_ms > 0 {
            trace!("display idle after {}ms", waited_ms);
        }
        Ok(())
    }

    /// Checks if device is still busy
    ///
    /// The busy line is driven low by the panel while it works.
    pub(crate) fn is_busy(&mut self) -> Result<bool, ErrorKind<SPI, BUSY, DC, RST>> {
        self.busy.is_low().map_err(ErrorKind::BusyError)
    }

    /// Resets the device.
    ///
    /// Often used to awake the module from deep sleep. The reset line is held low
    /// for `duration_ms`, after that the panel gets `duration_ms` to come up again.
    pub(crate) fn reset(
        &mut self,
        delay: &mut DELAY,
        duration_ms: u32,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.rst.set_low().map_err(ErrorKind::RstError)?;
        delay.delay_ms(duration_ms);
        self.rst.set_high().map_err(ErrorKind::RstError)?;
        delay.delay_ms(duration_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epd7in5::command::Command;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
        spi::{Mock as SpiMock, Transaction as SpiTransaction},
    };

    type Interface = DisplayInterface<SpiMock<u8>, PinMock, PinMock, PinMock, NoopDelay>;

    #[test]
    fn command_then_data() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x30]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x3C]),
            SpiTransaction::transaction_end(),
        ]);
        let busy = PinMock::new(&[]);
        let dc = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let rst = PinMock::new(&[]);

        let mut interface: Interface = DisplayInterface::new(busy, dc, rst, 100, None);
        interface
            .cmd_with_data(&mut spi, Command::PllControl, &[0x3C])
            .unwrap();

        spi.done();
        interface.busy.done();
        interface.dc.done();
        interface.rst.done();
    }

    #[test]
    fn command_without_data_leaves_dc_low() {
        let mut spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x04]),
            SpiTransaction::transaction_end(),
        ]);
        let busy = PinMock::new(&[]);
        let dc = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let rst = PinMock::new(&[]);

        let mut interface: Interface = DisplayInterface::new(busy, dc, rst, 100, None);
        interface
            .cmd_with_data(&mut spi, Command::PowerOn, &[])
            .unwrap();

        spi.done();
        interface.busy.done();
        interface.dc.done();
        interface.rst.done();
    }

    #[test]
    fn reset_toggles_line() {
        let mut spi: SpiMock<u8> = SpiMock::new(&[]);
        let busy = PinMock::new(&[]);
        let dc = PinMock::new(&[]);
        let rst = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);

        let mut interface: Interface = DisplayInterface::new(busy, dc, rst, 100, None);
        interface.reset(&mut NoopDelay::new(), 200).unwrap();

        spi.done();
        interface.busy.done();
        interface.dc.done();
        interface.rst.done();
    }

    #[test]
    fn waits_for_busy_to_go_high() {
        let mut spi: SpiMock<u8> = SpiMock::new(&[]);
        let busy = PinMock::new(&[
            PinTransaction::get(PinState::Low),
            PinTransaction::get(PinState::Low),
            PinTransaction::get(PinState::High),
        ]);
        let dc = PinMock::new(&[]);
        let rst = PinMock::new(&[]);

        let mut interface: Interface = DisplayInterface::new(busy, dc, rst, 100, None);
        interface.wait_until_idle(&mut NoopDelay::new()).unwrap();

        spi.done();
        interface.busy.done();
        interface.dc.done();
        interface.rst.done();
    }

    #[test]
    fn long_data_is_split_on_linux() {
        let data = vec![0xAB; MAX_TRANSFER_LEN + 10];
        let mut expectations = vec![];
        let chunks: Vec<&[u8]> = if cfg!(target_os = "linux") {
            data.chunks(MAX_TRANSFER_LEN).collect()
        } else {
            vec![&data[..]]
        };
        for chunk in chunks {
            expectations.push(SpiTransaction::transaction_start());
            expectations.push(SpiTransaction::write_vec(chunk.to_vec()));
            expectations.push(SpiTransaction::transaction_end());
        }
        let mut spi = SpiMock::new(&expectations);
        let busy = PinMock::new(&[]);
        let dc = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let rst = PinMock::new(&[]);

        let mut interface: Interface = DisplayInterface::new(busy, dc, rst, 100, None);
        interface.data(&mut spi, &data).unwrap();

        spi.done();
        interface.busy.done();
        interface.dc.done();
        interface.rst.done();
    }
}
