//! Factory calibration coefficients
//!
//! Every MS5611 is calibrated at two temperatures and two pressures at the
//! factory. The six resulting coefficients live in the PROM and are needed to
//! turn the raw ADC words into engineering units.

use embedded_hal::i2c::I2c;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::command::PROM_READ;
use crate::error::Error;

/// The six PROM coefficients C1..C6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalibrationCoefficients {
    /// C1, pressure sensitivity SENS_T1
    pub c1: u16,
    /// C2, pressure offset OFF_T1
    pub c2: u16,
    /// C3, temperature coefficient of pressure sensitivity TCS
    pub c3: u16,
    /// C4, temperature coefficient of pressure offset TCO
    pub c4: u16,
    /// C5, reference temperature T_REF
    pub c5: u16,
    /// C6, temperature coefficient of the temperature TEMPSENS
    pub c6: u16,
}

impl CalibrationCoefficients {
    /// Build the coefficients from C1..C6 in order
    pub const fn from_words(words: [u16; 6]) -> Self {
        Self {
            c1: words[0],
            c2: words[1],
            c3: words[2],
            c4: words[3],
            c5: words[4],
            c6: words[5],
        }
    }

    /// C1..C6 in order
    pub const fn words(&self) -> [u16; 6] {
        [self.c1, self.c2, self.c3, self.c4, self.c5, self.c6]
    }

    /// Read C1..C6 from the sensor PROM.
    ///
    /// Each coefficient is one PROM read command followed by a separate
    /// 2-byte big-endian read. The first bus error aborts the load and is
    /// returned unchanged.
    pub fn load<I: I2c>(i2c: &mut I, address: u8) -> Result<Self, Error<I::Error>> {
        let mut words = [0u16; 6];

        for (word, command) in words.iter_mut().zip(PROM_READ) {
            let mut buf = [0u8; 2];
            i2c.write(address, &[command]).map_err(Error::Bus)?;
            i2c.read(address, &mut buf).map_err(Error::Bus)?;
            *word = u16::from_be_bytes(buf);
            debug!("MS5611: PROM {:#04x} = {}", command, *word);
        }

        Ok(Self::from_words(words))
    }
}
