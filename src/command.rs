//! MS5611 command set
//!
//! The sensor has no register map; every transaction starts with a single
//! command byte. Conversion commands encode both the measurement kind and the
//! oversampling rate, so they are looked up from [`OversamplingRate`].

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::InvalidRate;

/// Reset the sensor and reload the PROM into its internal register
pub const RESET: u8 = 0x1E;

/// Read the result of the last conversion (24 bits, big-endian)
pub const READ_ADC: u8 = 0x00;

/// PROM read commands for C1..C6, in coefficient order
pub const PROM_READ: [u8; 6] = [0xA2, 0xA4, 0xA6, 0xA8, 0xAA, 0xAC];

/// What a conversion command measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measurement {
    /// Digital pressure value (D1)
    Pressure,
    /// Digital temperature value (D2)
    Temperature,
}

impl Measurement {
    /// Short label used in log output
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pressure => "D1",
            Self::Temperature => "D2",
        }
    }
}

/// Per-rate entry of the conversion table
#[derive(Clone, Copy)]
struct RateEntry {
    ratio: u16,
    pressure_command: u8,
    temperature_command: u8,
    conversion_time_us: u32,
}

/// Indexed by `OversamplingRate as usize`
const RATE_TABLE: [RateEntry; 5] = [
    RateEntry {
        ratio: 256,
        pressure_command: 0x40,
        temperature_command: 0x50,
        conversion_time_us: 600,
    },
    RateEntry {
        ratio: 512,
        pressure_command: 0x42,
        temperature_command: 0x52,
        conversion_time_us: 1170,
    },
    RateEntry {
        ratio: 1024,
        pressure_command: 0x44,
        temperature_command: 0x54,
        conversion_time_us: 2280,
    },
    RateEntry {
        ratio: 2048,
        pressure_command: 0x46,
        temperature_command: 0x56,
        conversion_time_us: 4540,
    },
    RateEntry {
        ratio: 4096,
        pressure_command: 0x48,
        temperature_command: 0x58,
        conversion_time_us: 9040,
    },
];

/// ADC oversampling rate
///
/// Higher rates lower the noise floor at the cost of a longer conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OversamplingRate {
    /// 256 samples, 0.60 ms conversion
    Osr256 = 0,
    /// 512 samples, 1.17 ms conversion
    Osr512 = 1,
    /// 1024 samples, 2.28 ms conversion
    #[default]
    Osr1024 = 2,
    /// 2048 samples, 4.54 ms conversion
    Osr2048 = 3,
    /// 4096 samples, 9.04 ms conversion
    Osr4096 = 4,
}

impl OversamplingRate {
    /// All rates, lowest first
    pub const ALL: [Self; 5] = [
        Self::Osr256,
        Self::Osr512,
        Self::Osr1024,
        Self::Osr2048,
        Self::Osr4096,
    ];

    /// Rate used when a numeric ratio is not recognized
    pub const FALLBACK: Self = Self::Osr1024;

    const fn entry(self) -> RateEntry {
        RATE_TABLE[self as usize]
    }

    /// Number of samples averaged per conversion
    pub const fn ratio(self) -> u16 {
        self.entry().ratio
    }

    /// Conversion-start command for the given measurement at this rate
    pub const fn command(self, measurement: Measurement) -> u8 {
        match measurement {
            Measurement::Pressure => self.entry().pressure_command,
            Measurement::Temperature => self.entry().temperature_command,
        }
    }

    /// Maximum conversion time from the datasheet, in microseconds
    pub const fn conversion_time_us(self) -> u32 {
        self.entry().conversion_time_us
    }

    /// Look up a rate by its numeric ratio (256, 512, ... 4096)
    pub fn from_ratio(ratio: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|rate| rate.ratio() == ratio)
    }

    /// Look up a rate by its numeric ratio, falling back to [`Self::FALLBACK`]
    ///
    /// Unknown ratios never produce a mismatched command/delay pair; they are
    /// logged and read at 1024 instead.
    pub fn from_ratio_or_default(ratio: u16) -> Self {
        Self::from_ratio(ratio).unwrap_or_else(|| {
            warn!(
                "MS5611: unsupported oversampling ratio {}, using {}",
                ratio,
                Self::FALLBACK.ratio()
            );
            Self::FALLBACK
        })
    }
}

impl TryFrom<u16> for OversamplingRate {
    type Error = InvalidRate;

    fn try_from(ratio: u16) -> Result<Self, Self::Error> {
        Self::from_ratio(ratio).ok_or(InvalidRate(ratio))
    }
}
