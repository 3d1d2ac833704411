//! Error types for the MS5611 driver

use thiserror_no_std::Error;

/// Driver errors
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    /// Bus write or read failed (includes bus timeouts)
    #[error("I2C bus error: {0:?}")]
    Bus(E),

    /// A reading was requested before the calibration PROM was loaded
    #[error("Sensor not initialized (calibration coefficients not loaded)")]
    Uninitialized,

    /// Numeric oversampling ratio is not one the sensor supports
    #[error("Unsupported oversampling ratio: {0}")]
    InvalidRate(u16),
}

/// A numeric oversampling ratio the sensor does not support
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unsupported oversampling ratio: {0}")]
pub struct InvalidRate(pub u16);

impl<E> From<InvalidRate> for Error<E> {
    fn from(error: InvalidRate) -> Self {
        Self::InvalidRate(error.0)
    }
}

/// Errors when encoding or decoding a stored [`DriverConfig`](crate::DriverConfig)
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The output buffer is too small for the encoded configuration
    #[error("Configuration buffer too small")]
    BufferTooSmall,

    /// The stored bytes are not a valid configuration
    #[error("Configuration could not be decoded")]
    Malformed,
}

impl From<postcard::Error> for ConfigError {
    fn from(error: postcard::Error) -> Self {
        match error {
            postcard::Error::SerializeBufferFull => Self::BufferTooSmall,
            _ => Self::Malformed,
        }
    }
}
