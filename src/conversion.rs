//! Conversion sequencing
//!
//! One reading is two conversions, pressure first:
//!
//! 1. write the conversion command for (measurement, rate)
//! 2. wait for the conversion to settle
//! 3. write [`READ_ADC`]
//! 4. read three bytes, big-endian
//!
//! Reading the ADC before the conversion finishes returns zero or stale data,
//! so the delay is never skipped.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::command::{Measurement, OversamplingRate, READ_ADC};
use crate::config::ConversionTiming;
use crate::error::Error;

/// Raw 24-bit ADC words from one conversion cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawReading {
    /// D1, digital pressure value
    pub d1: u32,
    /// D2, digital temperature value
    pub d2: u32,
}

/// Decode a 24-bit big-endian ADC result
pub const fn decode_adc(bytes: [u8; 3]) -> u32 {
    ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
}

/// Run one conversion and return its ADC word
pub fn convert<I: I2c, D: DelayNs>(
    i2c: &mut I,
    delay: &mut D,
    address: u8,
    measurement: Measurement,
    rate: OversamplingRate,
    timing: ConversionTiming,
) -> Result<u32, Error<I::Error>> {
    i2c.write(address, &[rate.command(measurement)])
        .map_err(Error::Bus)?;

    delay.delay_us(timing.settle_us(rate));

    let mut buf = [0u8; 3];
    i2c.write(address, &[READ_ADC]).map_err(Error::Bus)?;
    i2c.read(address, &mut buf).map_err(Error::Bus)?;

    let word = decode_adc(buf);
    debug!(
        "MS5611: {} = {} (OSR {})",
        measurement.label(),
        word,
        rate.ratio()
    );
    Ok(word)
}

/// Read D1 then D2 at `rate`
pub fn read_raw<I: I2c, D: DelayNs>(
    i2c: &mut I,
    delay: &mut D,
    address: u8,
    rate: OversamplingRate,
    timing: ConversionTiming,
) -> Result<RawReading, Error<I::Error>> {
    let d1 = convert(i2c, delay, address, Measurement::Pressure, rate, timing)?;
    let d2 = convert(i2c, delay, address, Measurement::Temperature, rate, timing)?;
    Ok(RawReading { d1, d2 })
}
