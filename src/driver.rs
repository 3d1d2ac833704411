//! MS5611 driver
//!
//! [`Ms5611`] owns the bus, the delay source and the calibration
//! coefficients of one sensor. Several sensors (for example one per address
//! strap) are simply several driver values.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::calibration::CalibrationCoefficients;
use crate::command::{OversamplingRate, RESET};
use crate::compensation::{CompensatedReading, compensate};
use crate::config::DriverConfig;
use crate::conversion::{self, RawReading};
use crate::error::Error;

/// Blocking MS5611 driver
pub struct Ms5611<I, D> {
    i2c: I,
    delay: D,
    config: DriverConfig,
    calibration: Option<CalibrationCoefficients>,
}

impl<I: I2c, D: DelayNs> Ms5611<I, D> {
    /// Create a driver without touching the bus.
    ///
    /// Call [`Self::init`] before reading; until then every reading returns
    /// [`Error::Uninitialized`].
    pub const fn new(i2c: I, delay: D, config: DriverConfig) -> Self {
        Self {
            i2c,
            delay,
            config,
            calibration: None,
        }
    }

    /// Create a driver, reset the sensor and load its calibration PROM
    pub fn initialize(i2c: I, delay: D, config: DriverConfig) -> Result<Self, Error<I::Error>> {
        let mut driver = Self::new(i2c, delay, config);
        driver.init()?;
        Ok(driver)
    }

    /// Reset the sensor and (re)load the calibration PROM.
    ///
    /// Any previously loaded coefficients are dropped first, so a failed
    /// init leaves the driver uninitialized.
    pub fn init(&mut self) -> Result<(), Error<I::Error>> {
        self.calibration = None;
        self.reset()?;

        let address = self.address();
        let calibration = CalibrationCoefficients::load(&mut self.i2c, address)?;
        info!(
            "MS5611 at {:#04x} initialized: C1..C6 = {:?}",
            address,
            calibration.words()
        );

        self.calibration = Some(calibration);
        Ok(())
    }

    /// Send the reset command and wait for the PROM reload
    pub fn reset(&mut self) -> Result<(), Error<I::Error>> {
        debug!("MS5611: reset");
        let address = self.address();
        self.i2c.write(address, &[RESET]).map_err(Error::Bus)?;
        self.delay.delay_ms(self.config.reset_delay_ms);
        Ok(())
    }

    /// Read D1 and D2 without compensation
    pub fn read_raw(&mut self, rate: OversamplingRate) -> Result<RawReading, Error<I::Error>> {
        conversion::read_raw(
            &mut self.i2c,
            &mut self.delay,
            self.config.address.value(),
            rate,
            self.config.timing,
        )
    }

    /// Read and compensate temperature, pressure and altitude
    pub fn read(&mut self, rate: OversamplingRate) -> Result<CompensatedReading, Error<I::Error>> {
        let calibration = self.calibration.ok_or(Error::Uninitialized)?;
        let raw = self.read_raw(rate)?;
        let reading = compensate(&calibration, &raw);
        debug!(
            "MS5611: TEMP = {} P = {} alt = {} m",
            reading.temperature, reading.pressure, reading.altitude
        );
        Ok(reading)
    }

    /// [`Self::read`] at the configured default rate
    pub fn read_default(&mut self) -> Result<CompensatedReading, Error<I::Error>> {
        self.read(self.config.default_rate)
    }

    /// Read with the datasheet low-temperature correction applied
    #[cfg(feature = "second-order")]
    pub fn read_second_order(
        &mut self,
        rate: OversamplingRate,
    ) -> Result<CompensatedReading, Error<I::Error>> {
        let calibration = self.calibration.ok_or(Error::Uninitialized)?;
        let raw = self.read_raw(rate)?;
        let reading = crate::compensation::compensate_second_order(&calibration, &raw);
        debug!(
            "MS5611: TEMP = {} P = {} alt = {} m (second order)",
            reading.temperature, reading.pressure, reading.altitude
        );
        Ok(reading)
    }

    /// Temperature in °C
    pub fn read_temperature(&mut self, rate: OversamplingRate) -> Result<f32, Error<I::Error>> {
        Ok(self.read(rate)?.temperature_celsius())
    }

    /// Pressure in 0.01 mbar and altitude in meters
    pub fn read_pressure_and_altitude(
        &mut self,
        rate: OversamplingRate,
    ) -> Result<(i32, f32), Error<I::Error>> {
        let reading = self.read(rate)?;
        Ok((reading.pressure, reading.altitude))
    }

    /// Loaded coefficients, if [`Self::init`] has succeeded
    pub const fn calibration(&self) -> Option<&CalibrationCoefficients> {
        self.calibration.as_ref()
    }

    pub const fn is_initialized(&self) -> bool {
        self.calibration.is_some()
    }

    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// 7-bit bus address in use
    pub const fn address(&self) -> u8 {
        self.config.address.value()
    }

    /// Consume the driver and return the bus and delay
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}
