//! Blocking driver for the MS5611 barometric pressure sensor
//!
//! The MS5611 is read over I2C through the `embedded-hal` 1.0 traits: any
//! `embedded_hal::i2c::I2c` implementation is the bus transport and any
//! `embedded_hal::delay::DelayNs` implementation provides the conversion
//! settling delay.
//!
//! A reading is a fixed request/response sequence: start a pressure
//! conversion, wait, read the 24-bit ADC, then the same for temperature. The
//! raw words are turned into calibrated values with the factory coefficients
//! stored in the sensor PROM.
//!
//! ```ignore
//! use baro_ms5611::{DriverConfig, Ms5611, OversamplingRate};
//!
//! let mut baro = Ms5611::initialize(i2c, delay, DriverConfig::default())?;
//! let celsius = baro.read_temperature(OversamplingRate::Osr4096)?;
//! let (pressure_centi_mbar, altitude_m) =
//!     baro.read_pressure_and_altitude(OversamplingRate::Osr4096)?;
//! ```
//!
//! It is `#![no_std]` so it builds for embedded targets and desktop hosts
//! (for the simulator and tests) alike.

#![no_std]

pub mod calibration;
pub mod command;
pub mod compensation;
pub mod config;
pub mod conversion;
pub mod driver;
pub mod error;

#[cfg(feature = "sensor")]
pub mod sensors;

pub use calibration::CalibrationCoefficients;
pub use command::OversamplingRate;
pub use compensation::{CompensatedReading, CompensationTerms, altitude_from_pressure, compensate};
#[cfg(feature = "second-order")]
pub use compensation::compensate_second_order;
pub use config::{Address, ConversionTiming, DriverConfig};
pub use conversion::RawReading;
pub use driver::Ms5611;
pub use error::{ConfigError, Error, InvalidRate};

/// I2C address when the CSB pin is tied low (0x77)
pub const I2C_ADDRESS_CSB_LOW: u8 = 0x77;

/// I2C address when the CSB pin is tied high (0x76)
pub const I2C_ADDRESS_CSB_HIGH: u8 = 0x76;
