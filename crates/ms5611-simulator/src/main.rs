//! Desktop simulator for the baro-ms5611 driver.
//!
//! Models an MS5611 behind an `embedded-hal` I2C bus and runs the real driver
//! against it. The simulated environment drifts slowly so successive readings
//! change, and the modelled ADC returns zero when it is read before the
//! conversion time has elapsed, just like the real part.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info ms5611-simulator [oversampling ratio] [samples]
//! ```
//!
//! Unsupported ratios fall back to 1024.

use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use log::{debug, error, info, warn};

use baro_ms5611::command::{Measurement, PROM_READ, READ_ADC, RESET};
use baro_ms5611::compensation::{offset, sensitivity, temperature_delta};
use baro_ms5611::sensors::{ALTITUDE, MAX_SENSORS, Ms5611Indexed, Ms5611Sensor, PRESSURE, TEMPERATURE};
use baro_ms5611::{CalibrationCoefficients, ConversionTiming, DriverConfig, OversamplingRate};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// Factory coefficients of the simulated part (datasheet example values).
const SIMULATED_PROM: [u16; 6] = [40127, 36924, 23317, 23282, 33464, 28312];

/// Interval between samples.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

const DEFAULT_SAMPLES: usize = 10;

// ---------------------------------------------------------------------------
// Environment model
// ---------------------------------------------------------------------------

/// Slowly varying temperature (0.01 °C) and pressure (0.01 mbar).
fn environment(elapsed_secs: f64) -> (i64, i64) {
    let t = elapsed_secs;
    let temperature = 2200.0 + 300.0 * (t / 20.0).sin();
    let pressure = 101_325.0 - 1200.0 * (t / 30.0).sin() + 50.0 * (t / 7.0).cos();
    (temperature as i64, pressure as i64)
}

/// ADC words that compensate back to the given temperature and pressure.
fn adc_words(cal: &CalibrationCoefficients, temperature: i64, pressure: i64) -> (u32, u32) {
    let dt = ((temperature - 2000) << 26) / cal.c6.max(1) as i64;
    let d2 = (((cal.c5 as i64) << 8) + dt).clamp(0, 0x00FF_FFFF) as u32;

    let dt = temperature_delta(cal.c5, d2);
    let off = offset(cal.c2, cal.c4, dt);
    let sens = sensitivity(cal.c1, cal.c3, dt).max(1);
    let d1 = ((((pressure << 15) + off) << 21) / sens).clamp(0, 0x00FF_FFFF) as u32;

    (d1, d2)
}

fn decode_conversion(command: u8) -> Option<(Measurement, OversamplingRate)> {
    OversamplingRate::ALL.into_iter().find_map(|rate| {
        [Measurement::Pressure, Measurement::Temperature]
            .into_iter()
            .find(|kind| rate.command(*kind) == command)
            .map(|kind| (kind, rate))
    })
}

// ---------------------------------------------------------------------------
// Simulated device
// ---------------------------------------------------------------------------

struct Conversion {
    measurement: Measurement,
    started: Instant,
    duration: Duration,
}

enum Pending {
    None,
    Prom(u16),
    Adc,
}

/// An MS5611 answering on `address`.
struct SimulatedMs5611 {
    address: u8,
    calibration: CalibrationCoefficients,
    boot: Instant,
    conversion: Option<Conversion>,
    pending: Pending,
}

impl SimulatedMs5611 {
    fn new(address: u8) -> Self {
        Self {
            address,
            calibration: CalibrationCoefficients::from_words(SIMULATED_PROM),
            boot: Instant::now(),
            conversion: None,
            pending: Pending::None,
        }
    }

    fn command(&mut self, command: u8) -> Result<(), ErrorKind> {
        self.pending = Pending::None;

        if command == RESET {
            debug!("sim: reset");
            self.conversion = None;
        } else if command == READ_ADC {
            self.pending = Pending::Adc;
        } else if let Some(slot) = PROM_READ.iter().position(|c| *c == command) {
            self.pending = Pending::Prom(self.calibration.words()[slot]);
        } else if let Some((measurement, rate)) = decode_conversion(command) {
            self.conversion = Some(Conversion {
                measurement,
                started: Instant::now(),
                duration: Duration::from_micros(rate.conversion_time_us() as u64),
            });
        } else {
            warn!("sim: unknown command {:#04x}", command);
            return Err(ErrorKind::Other);
        }
        Ok(())
    }

    fn sample(&self, measurement: Measurement) -> u32 {
        let (temperature, pressure) = environment(self.boot.elapsed().as_secs_f64());
        let (d1, d2) = adc_words(&self.calibration, temperature, pressure);
        match measurement {
            Measurement::Pressure => d1,
            Measurement::Temperature => d2,
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) {
        match self.pending {
            Pending::Prom(word) => {
                for (dst, src) in buf.iter_mut().zip(word.to_be_bytes()) {
                    *dst = src;
                }
            }
            Pending::Adc => {
                let value = match self.conversion.take() {
                    Some(c) if c.started.elapsed() >= c.duration => self.sample(c.measurement),
                    Some(_) => {
                        warn!("sim: ADC read before conversion finished");
                        0
                    }
                    None => 0,
                };
                for (dst, src) in buf.iter_mut().zip(&value.to_be_bytes()[1..]) {
                    *dst = *src;
                }
            }
            Pending::None => buf.fill(0),
        }
        self.pending = Pending::None;
    }
}

impl ErrorType for SimulatedMs5611 {
    type Error = ErrorKind;
}

impl I2c for SimulatedMs5611 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => match bytes.first() {
                    Some(command) => self.command(*command)?,
                    None => return Err(ErrorKind::Other),
                },
                Operation::Read(buf) => self.read_into(buf),
            }
        }
        Ok(())
    }
}

/// Blocking delay backed by `std::thread::sleep`.
struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let rate = args
        .next()
        .and_then(|arg| arg.parse::<u16>().ok())
        .map(OversamplingRate::from_ratio_or_default)
        .unwrap_or(OversamplingRate::Osr4096);
    let samples = args
        .next()
        .and_then(|arg| arg.parse::<usize>().ok())
        .unwrap_or(DEFAULT_SAMPLES);

    let config = DriverConfig::default()
        .with_rate(rate)
        .with_timing(ConversionTiming::Datasheet)
        .with_reset_delay_ms(3);
    let device = SimulatedMs5611::new(config.address.value());

    info!(
        "Simulating MS5611 at {:#04x}, OSR {}, {} samples",
        config.address.value(),
        rate.ratio(),
        samples
    );

    let mut sensor: Ms5611Indexed<_, _> = Ms5611Sensor::new(device, StdDelay, config).into();
    let mut values = [0i32; MAX_SENSORS];

    for n in 0..samples {
        if let Err(e) = sensor.read_into(&mut values) {
            error!("Sample {} failed: {}", n, e);
            continue;
        }

        info!(
            "#{:<3} T = {:>6.2} °C  P = {:>7.2} mbar  alt = {:>7.2} m",
            n,
            values[TEMPERATURE] as f32 / 100.0,
            values[PRESSURE] as f32 / 100.0,
            values[ALTITUDE] as f32 / 1000.0,
        );

        thread::sleep(SAMPLE_INTERVAL);
    }

    if let Some(cal) = sensor.sensor().driver().calibration() {
        info!("Calibration: {:?}", cal.words());
    }
}
