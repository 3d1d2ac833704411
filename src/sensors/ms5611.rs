use crate::sensors::{SensorError, SensorReadings};

use super::Sensor;
use crate::{DriverConfig, Error, Ms5611};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{error, info, warn};

const SENSOR_NAME: &str = "MS5611";

/// Typed readings from the MS5611 sensor.
pub struct Ms5611Readings {
    pub temperature_centi_celsius: i32,
    pub pressure_centi_mbar: i32,
    pub altitude_millimeters: i32,
}

impl SensorReadings<3> for Ms5611Readings {
    fn to_array(self) -> [i32; 3] {
        [
            self.temperature_centi_celsius,
            self.pressure_centi_mbar,
            self.altitude_millimeters,
        ]
    }
}

pub struct Ms5611Sensor<I, D> {
    sensor: Ms5611<I, D>,
}

impl<I: I2c, D: DelayNs> Ms5611Sensor<I, D> {
    pub fn new(i2c: I, delay: D, config: DriverConfig) -> Self {
        Self {
            sensor: Ms5611::new(i2c, delay, config),
        }
    }

    pub fn driver(&self) -> &Ms5611<I, D> {
        &self.sensor
    }

    /// Reset and load calibration. Called on the first read if needed.
    fn initialize(&mut self) -> Result<(), SensorError> {
        self.sensor.init().map_err(|e| {
            error!("MS5611 init failed: {:?}", e);
            SensorError::InitializationFailed {
                sensor: SENSOR_NAME,
                details: "Failed to reset the sensor or read the calibration PROM",
            }
        })?;

        info!("MS5611: calibration loaded");
        Ok(())
    }
}

impl<I: I2c, D: DelayNs> Sensor<3> for Ms5611Sensor<I, D> {
    type Readings = Ms5611Readings;

    fn read(&mut self) -> Result<Ms5611Readings, SensorError> {
        if !self.sensor.is_initialized() {
            self.initialize()?;
        }

        let rate = self.sensor.config().default_rate;
        let reading = self.sensor.read(rate).map_err(|e| {
            error!("MS5611 read at OSR {} failed: {:?}", rate.ratio(), e);
            SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "convert pressure/temperature",
                details: match e {
                    Error::Uninitialized => "Calibration not loaded",
                    _ => "I2C communication error or sensor not responding",
                },
            }
        })?;

        // Non-positive pressure has no altitude; don't let it land as 0 mm
        if !reading.altitude.is_finite() {
            warn!(
                "MS5611: pressure {} out of range, no altitude",
                reading.pressure
            );
            return Err(SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "compute altitude",
                details: "Pressure out of range",
            });
        }

        Ok(Ms5611Readings {
            temperature_centi_celsius: reading.temperature,
            pressure_centi_mbar: reading.pressure,
            // Altitude is stored with millimeter precision in the sample array
            altitude_millimeters: (reading.altitude * 1000.0) as i32,
        })
    }
}
