//! Shared test doubles for the MS5611 driver tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use baro_ms5611::CalibrationCoefficients;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

/// Datasheet example coefficients C1..C6
pub const DATASHEET_PROM: [u16; 6] = [40127, 36924, 23317, 23282, 33464, 28312];
/// Datasheet example D1
pub const DATASHEET_D1: u32 = 9_085_466;
/// Datasheet example D2
pub const DATASHEET_D2: u32 = 8_569_150;

pub fn datasheet_calibration() -> CalibrationCoefficients {
    CalibrationCoefficients::from_words(DATASHEET_PROM)
}

/// Everything the driver did, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write { address: u8, bytes: Vec<u8> },
    Read { address: u8, len: usize },
    DelayUs(u32),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

/// Simulated MS5611 on the bus with an operation log and failure injection
pub struct ScriptedBus {
    log: EventLog,
    prom: [u16; 6],
    d1: u32,
    d2: u32,
    /// Last command written, decides what the next read returns
    last_command: Option<u8>,
    /// Last conversion started, decides what READ_ADC returns
    last_conversion: Option<u8>,
    bus_ops: usize,
    fail_at: Option<usize>,
}

impl ScriptedBus {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            prom: DATASHEET_PROM,
            d1: DATASHEET_D1,
            d2: DATASHEET_D2,
            last_command: None,
            last_conversion: None,
            bus_ops: 0,
            fail_at: None,
        }
    }

    pub fn with_adc(mut self, d1: u32, d2: u32) -> Self {
        self.d1 = d1;
        self.d2 = d2;
        self
    }

    /// Fail the bus operation with this zero-based index
    pub fn fail_at(mut self, op: usize) -> Self {
        self.fail_at = Some(op);
        self
    }

    fn next_op(&mut self) -> Result<(), ErrorKind> {
        let op = self.bus_ops;
        self.bus_ops += 1;
        if self.fail_at == Some(op) {
            return Err(ErrorKind::Other);
        }
        Ok(())
    }

    fn handle_write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ErrorKind> {
        self.log.borrow_mut().push(Event::Write {
            address,
            bytes: bytes.to_vec(),
        });
        self.next_op()?;

        let command = bytes[0];
        self.last_command = Some(command);
        if (0x40..=0x58).contains(&command) {
            self.last_conversion = Some(command);
        }
        Ok(())
    }

    fn handle_read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), ErrorKind> {
        self.log.borrow_mut().push(Event::Read {
            address,
            len: buf.len(),
        });
        self.next_op()?;

        match self.last_command {
            Some(command @ 0xA2..=0xAC) => {
                let word = self.prom[((command - 0xA2) / 2) as usize];
                buf.copy_from_slice(&word.to_be_bytes());
            }
            Some(0x00) => {
                let value = match self.last_conversion {
                    Some(0x40..=0x48) => self.d1,
                    Some(0x50..=0x58) => self.d2,
                    _ => 0,
                };
                buf.copy_from_slice(&value.to_be_bytes()[1..]);
            }
            _ => buf.fill(0),
        }
        Ok(())
    }
}

impl ErrorType for ScriptedBus {
    type Error = ErrorKind;
}

impl I2c for ScriptedBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.handle_write(address, bytes)?,
                Operation::Read(buf) => self.handle_read(address, buf)?,
            }
        }
        Ok(())
    }
}

/// Delay that records the requested time into the shared log
pub struct LoggingDelay {
    log: EventLog,
}

impl LoggingDelay {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl DelayNs for LoggingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::DelayUs(ns / 1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayUs(ms * 1000));
    }
}

/// A fresh log with a bus and delay attached to it
///
/// Also hooks up `env_logger`, so `RUST_LOG=debug` shows the driver trace of
/// a failing test.
pub fn scripted() -> (EventLog, ScriptedBus, LoggingDelay) {
    let _ = env_logger::builder().is_test(true).try_init();

    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let bus = ScriptedBus::new(log.clone());
    let delay = LoggingDelay::new(log.clone());
    (log, bus, delay)
}

/// Expected events for one conversion at `address`
pub fn conversion_events(address: u8, command: u8, settle_us: u32) -> Vec<Event> {
    vec![
        Event::Write {
            address,
            bytes: vec![command],
        },
        Event::DelayUs(settle_us),
        Event::Write {
            address,
            bytes: vec![0x00],
        },
        Event::Read { address, len: 3 },
    ]
}

/// Expected events for reset plus the PROM load at `address`, default delays
pub fn init_events(address: u8) -> Vec<Event> {
    let mut events = vec![
        Event::Write {
            address,
            bytes: vec![0x1E],
        },
        Event::DelayUs(50_000),
    ];
    for command in [0xA2, 0xA4, 0xA6, 0xA8, 0xAA, 0xAC] {
        events.push(Event::Write {
            address,
            bytes: vec![command],
        });
        events.push(Event::Read { address, len: 2 });
    }
    events
}
