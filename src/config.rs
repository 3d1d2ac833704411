//! Driver configuration
//!
//! The configuration is plain data so it can be stored alongside other
//! device settings; [`DriverConfig::to_slice`] and [`DriverConfig::from_bytes`]
//! use postcard for that.

use serde::{Deserialize, Serialize};

use crate::command::OversamplingRate;
use crate::error::ConfigError;
use crate::{I2C_ADDRESS_CSB_HIGH, I2C_ADDRESS_CSB_LOW};

/// Fixed settling delay used by [`ConversionTiming::Reference`]
pub const REFERENCE_CONVERSION_DELAY_MS: u32 = 50;

/// Delay after the reset command before the PROM is read
pub const DEFAULT_RESET_DELAY_MS: u32 = 50;

/// Largest encoded [`DriverConfig`], in bytes
pub const MAX_ENCODED_LEN: usize = 16;

/// I2C address strap of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Address {
    /// CSB pin low, 0x77
    #[default]
    CsbLow,
    /// CSB pin high, 0x76
    CsbHigh,
}

impl Address {
    /// 7-bit bus address
    pub const fn value(self) -> u8 {
        match self {
            Self::CsbLow => I2C_ADDRESS_CSB_LOW,
            Self::CsbHigh => I2C_ADDRESS_CSB_HIGH,
        }
    }
}

/// How long to wait between starting a conversion and reading the ADC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConversionTiming {
    /// Fixed 50 ms per conversion regardless of rate
    #[default]
    Reference,
    /// The datasheet maximum conversion time of the selected rate
    Datasheet,
}

impl ConversionTiming {
    /// Settling delay for a conversion at `rate`, in microseconds
    pub const fn settle_us(self, rate: OversamplingRate) -> u32 {
        match self {
            Self::Reference => REFERENCE_CONVERSION_DELAY_MS * 1000,
            Self::Datasheet => rate.conversion_time_us(),
        }
    }
}

/// MS5611 driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub address: Address,
    /// Rate used by [`Ms5611::read_default`](crate::Ms5611::read_default) and the sensor adapter
    pub default_rate: OversamplingRate,
    pub timing: ConversionTiming,
    pub reset_delay_ms: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: Address::default(),
            default_rate: OversamplingRate::default(),
            timing: ConversionTiming::default(),
            reset_delay_ms: DEFAULT_RESET_DELAY_MS,
        }
    }
}

impl DriverConfig {
    pub const fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub const fn with_rate(mut self, rate: OversamplingRate) -> Self {
        self.default_rate = rate;
        self
    }

    pub const fn with_timing(mut self, timing: ConversionTiming) -> Self {
        self.timing = timing;
        self
    }

    pub const fn with_reset_delay_ms(mut self, reset_delay_ms: u32) -> Self {
        self.reset_delay_ms = reset_delay_ms;
        self
    }

    /// Encode into `buf`, returning the used prefix
    pub fn to_slice<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        Ok(postcard::to_slice(self, buf)?)
    }

    /// Decode a configuration written by [`Self::to_slice`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        Ok(postcard::from_bytes(bytes)?)
    }
}
