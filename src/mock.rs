//! Recording doubles for the embedded-hal traits
//!
//! All parts share one [`Bus`] log, so a test can check the complete sequence of
//! commands, data, pin changes and delays a driver operation produced.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{self, InputPin, OutputPin},
    spi::{self, Operation, SpiDevice},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Command(u8),
    Data(u8),
    Reset(bool),
    BusyRead(bool),
    DelayMs(u32),
    DelayUs(u32),
    DelayNs(u32),
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    dc_high: bool,
    /// levels returned by the busy pin, high = idle; idle once exhausted
    busy_levels: VecDeque<bool>,
    stuck_busy: bool,
    /// number of bytes the spi accepts before failing
    fail_after: Option<usize>,
    written: usize,
}

#[derive(Clone, Default)]
pub(crate) struct Bus(Rc<RefCell<State>>);

impl Bus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn spi(&self) -> Spi {
        Spi(self.clone())
    }

    pub(crate) fn busy(&self) -> Pin {
        Pin {
            bus: self.clone(),
            role: Role::Busy,
        }
    }

    pub(crate) fn dc(&self) -> Pin {
        Pin {
            bus: self.clone(),
            role: Role::Dc,
        }
    }

    pub(crate) fn rst(&self) -> Pin {
        Pin {
            bus: self.clone(),
            role: Role::Rst,
        }
    }

    pub(crate) fn delay(&self) -> Delay {
        Delay(self.clone())
    }

    /// Report busy for the next `polls` reads of the busy pin
    pub(crate) fn busy_for(&self, polls: usize) {
        let mut state = self.0.borrow_mut();
        state.busy_levels.extend(core::iter::repeat(false).take(polls));
        state.busy_levels.push_back(true);
    }

    pub(crate) fn stuck_busy(&self) {
        self.0.borrow_mut().stuck_busy = true;
    }

    pub(crate) fn fail_after(&self, bytes: usize) {
        self.0.borrow_mut().fail_after = Some(bytes);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub(crate) fn clear_events(&self) {
        self.0.borrow_mut().events.clear();
    }

    /// Number of bytes that made it onto the spi bus
    pub(crate) fn bytes_sent(&self) -> usize {
        self.0.borrow().written
    }

    pub(crate) fn commands(&self) -> Vec<u8> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Command(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    /// Every command together with the data bytes following it
    pub(crate) fn trace(&self) -> Vec<(u8, Vec<u8>)> {
        let mut trace: Vec<(u8, Vec<u8>)> = Vec::new();
        for event in self.0.borrow().events.iter() {
            match event {
                Event::Command(cmd) => trace.push((*cmd, Vec::new())),
                Event::Data(byte) => {
                    if let Some((_, data)) = trace.last_mut() {
                        data.push(*byte);
                    }
                }
                _ => {}
            }
        }
        trace
    }

    pub(crate) fn delays_ms(&self) -> Vec<u32> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::DelayMs(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }
}

pub(crate) struct Spi(Bus);

impl spi::ErrorType for Spi {
    type Error = spi::ErrorKind;
}

impl SpiDevice for Spi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut state = (self.0).0.borrow_mut();
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                for &byte in bytes.iter() {
                    if state.fail_after.is_some_and(|limit| state.written >= limit) {
                        return Err(spi::ErrorKind::Other);
                    }
                    state.written += 1;
                    let event = if state.dc_high {
                        Event::Data(byte)
                    } else {
                        Event::Command(byte)
                    };
                    state.events.push(event);
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Busy,
    Dc,
    Rst,
}

pub(crate) struct Pin {
    bus: Bus,
    role: Role,
}

impl Pin {
    fn set(&mut self, high: bool) {
        let mut state = self.bus.0.borrow_mut();
        match self.role {
            Role::Dc => state.dc_high = high,
            Role::Rst => state.events.push(Event::Reset(high)),
            Role::Busy => panic!("busy is an input"),
        }
    }
}

impl digital::ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        assert!(self.role == Role::Busy, "only busy is an input");
        let mut state = self.bus.0.borrow_mut();
        let level = if state.stuck_busy {
            false
        } else {
            state.busy_levels.pop_front().unwrap_or(true)
        };
        state.events.push(Event::BusyRead(level));
        Ok(level)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

pub(crate) struct Delay(Bus);

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        (self.0).0.borrow_mut().events.push(Event::DelayNs(ns));
    }

    fn delay_us(&mut self, us: u32) {
        (self.0).0.borrow_mut().events.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        (self.0).0.borrow_mut().events.push(Event::DelayMs(ms));
    }
}
