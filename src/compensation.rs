//! Compensation of raw ADC words into temperature, pressure and altitude
//!
//! All of the fixed-point math runs on `i64` with power-of-two divisions done
//! as arithmetic shifts. The intermediate terms are clamped to the envelope
//! the sensor can physically produce, which keeps noisy or corrupted input
//! words from overflowing the later steps.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationCoefficients;
use crate::conversion::RawReading;

/// Lower bound of dT
pub const DT_MIN: i64 = -16_776_960;
/// Upper bound of dT
pub const DT_MAX: i64 = 16_777_216;
/// Lower bound of OFF
pub const OFF_MIN: i64 = -8_589_672_450;
/// Upper bound of OFF
pub const OFF_MAX: i64 = 12_884_705_280;
/// Lower bound of SENS
pub const SENS_MIN: i64 = -4_294_836_225;
/// Upper bound of SENS
pub const SENS_MAX: i64 = 6_442_352_640;

/// Standard sea-level pressure in mbar
pub const SEA_LEVEL_PRESSURE_MBAR: f32 = 1013.25;

/// Temperature at which TEMP is zero-referenced, in 0.01 °C
const REFERENCE_TEMPERATURE: i64 = 2000;

/// dT = D2 - C5 * 2^8, clamped
pub fn temperature_delta(c5: u16, d2: u32) -> i64 {
    (d2 as i64 - ((c5 as i64) << 8)).clamp(DT_MIN, DT_MAX)
}

/// TEMP = 2000 + dT * C6 / 2^26, in 0.01 °C
pub fn temperature(c6: u16, dt: i64) -> i64 {
    REFERENCE_TEMPERATURE + ((dt * c6 as i64) >> 26)
}

/// OFF = C2 * 2^16 + C4 * dT / 2^7, clamped
pub fn offset(c2: u16, c4: u16, dt: i64) -> i64 {
    (((c2 as i64) << 16) + ((c4 as i64 * dt) >> 7)).clamp(OFF_MIN, OFF_MAX)
}

/// SENS = C1 * 2^15 + C3 * dT / 2^8, clamped
pub fn sensitivity(c1: u16, c3: u16, dt: i64) -> i64 {
    (((c1 as i64) << 15) + ((c3 as i64 * dt) >> 8)).clamp(SENS_MIN, SENS_MAX)
}

/// P = (D1 * SENS / 2^21 - OFF) / 2^15, in 0.01 mbar
///
/// The shifts round toward negative infinity. Compared with truncating
/// division this is at most one LSB lower for positive pressures.
pub fn pressure(d1: u32, sens: i64, off: i64) -> i64 {
    // D1 * SENS can exceed i64 when D1 carries more than 24 bits
    let scaled = ((d1 as i128 * sens as i128) >> 21) as i64;
    (scaled - off) >> 15
}

/// Altitude in meters from pressure in 0.01 mbar, using the international
/// barometric formula referenced to 1013.25 mbar.
///
/// Non-positive pressures yield NaN.
pub fn altitude_from_pressure(pressure_centi_mbar: i32) -> f32 {
    let mbar = pressure_centi_mbar as f32 / 100.0;
    (1.0 - libm::powf(mbar / SEA_LEVEL_PRESSURE_MBAR, 0.190284)) * 44307.7
}

/// Intermediate terms of the compensation for one D2 word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompensationTerms {
    /// Difference between actual and reference temperature
    pub dt: i64,
    /// Actual temperature, 0.01 °C
    pub temp: i64,
    /// Offset at actual temperature
    pub off: i64,
    /// Sensitivity at actual temperature
    pub sens: i64,
}

impl CompensationTerms {
    pub fn new(cal: &CalibrationCoefficients, d2: u32) -> Self {
        let dt = temperature_delta(cal.c5, d2);
        Self {
            dt,
            temp: temperature(cal.c6, dt),
            off: offset(cal.c2, cal.c4, dt),
            sens: sensitivity(cal.c1, cal.c3, dt),
        }
    }

    /// Apply the datasheet low-temperature correction (below 20 °C)
    #[cfg(feature = "second-order")]
    pub fn second_order(self) -> Self {
        if self.temp >= REFERENCE_TEMPERATURE {
            return self;
        }

        let t2 = (self.dt * self.dt) >> 31;
        let cold = (self.temp - REFERENCE_TEMPERATURE).pow(2);
        let mut off2 = (5 * cold) >> 1;
        let mut sens2 = (5 * cold) >> 2;

        if self.temp < -1500 {
            let very_cold = (self.temp + 1500).pow(2);
            off2 += 7 * very_cold;
            sens2 += (11 * very_cold) >> 1;
        }

        Self {
            dt: self.dt,
            temp: self.temp - t2,
            off: self.off - off2,
            sens: self.sens - sens2,
        }
    }

    /// Finish the computation with the D1 word
    pub fn reading(&self, d1: u32) -> CompensatedReading {
        let pressure = pressure(d1, self.sens, self.off) as i32;
        CompensatedReading {
            temperature: self.temp as i32,
            pressure,
            altitude: altitude_from_pressure(pressure),
        }
    }
}

/// Calibrated output of one reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompensatedReading {
    /// Temperature in 0.01 °C
    pub temperature: i32,
    /// Pressure in 0.01 mbar
    pub pressure: i32,
    /// Altitude in meters
    pub altitude: f32,
}

impl CompensatedReading {
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    pub fn pressure_mbar(&self) -> f32 {
        self.pressure as f32 / 100.0
    }
}

/// First-order compensation of one raw reading
pub fn compensate(cal: &CalibrationCoefficients, raw: &RawReading) -> CompensatedReading {
    CompensationTerms::new(cal, raw.d2).reading(raw.d1)
}

/// Compensation including the low-temperature correction
#[cfg(feature = "second-order")]
pub fn compensate_second_order(
    cal: &CalibrationCoefficients,
    raw: &RawReading,
) -> CompensatedReading {
    CompensationTerms::new(cal, raw.d2)
        .second_order()
        .reading(raw.d1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASHEET_CAL: CalibrationCoefficients =
        CalibrationCoefficients::from_words([40127, 36924, 23317, 23282, 33464, 28312]);

    const DATASHEET_RAW: RawReading = RawReading {
        d1: 9_085_466,
        d2: 8_569_150,
    };

    #[test]
    fn test_datasheet_terms() {
        let terms = CompensationTerms::new(&DATASHEET_CAL, DATASHEET_RAW.d2);

        assert_eq!(terms.dt, 2366);
        assert_eq!(terms.off, 2_420_281_617);
        assert_eq!(terms.sens, 1_315_097_036);
        assert_eq!(terms.temp, 2000);
    }

    #[test]
    fn test_datasheet_pressure() {
        let reading = compensate(&DATASHEET_CAL, &DATASHEET_RAW);

        assert_eq!(reading.pressure, 100_009);
        assert_eq!(reading.temperature, 2000);
        assert!((reading.pressure_mbar() - 1000.09).abs() < 0.01);
        assert!((reading.temperature_celsius() - 20.0).abs() < 0.01);
        assert!((reading.altitude - 110.08).abs() < 0.1);
    }

    #[test]
    fn test_compensate_is_deterministic() {
        let first = compensate(&DATASHEET_CAL, &DATASHEET_RAW);
        let second = compensate(&DATASHEET_CAL, &DATASHEET_RAW);
        assert_eq!(first, second);
    }

    #[test]
    fn test_temperature_tracks_c6() {
        // dT = 2^20, C6 = 2^10 => dT * C6 / 2^26 = 16
        let cal = CalibrationCoefficients::from_words([0, 0, 0, 0, 0, 1024]);
        let terms = CompensationTerms::new(&cal, 1 << 20);
        assert_eq!(terms.dt, 1 << 20);
        assert_eq!(terms.temp, 2016);
    }

    #[test]
    fn test_dt_clamped_high() {
        assert_eq!(temperature_delta(0, u32::MAX), DT_MAX);
        assert_eq!(temperature_delta(0, 0x00FF_FFFF), 16_777_215);
    }

    #[test]
    fn test_dt_lowest_reachable_is_bound() {
        assert_eq!(temperature_delta(u16::MAX, 0), DT_MIN);
    }

    #[test]
    fn test_off_clamped() {
        assert_eq!(offset(u16::MAX, u16::MAX, 1 << 30), OFF_MAX);
        assert_eq!(offset(0, u16::MAX, -(1 << 30)), OFF_MIN);
        assert_eq!(offset(1, 0, 0), 65_536);
    }

    #[test]
    fn test_sens_clamped() {
        assert_eq!(sensitivity(u16::MAX, u16::MAX, 1 << 30), SENS_MAX);
        assert_eq!(sensitivity(0, u16::MAX, -(1 << 30)), SENS_MIN);
        assert_eq!(sensitivity(1, 0, 0), 32_768);
    }

    #[test]
    fn test_clamped_dt_feeds_later_terms() {
        let cal = CalibrationCoefficients::from_words([0, 0, 256, 128, 0, 0]);
        let terms = CompensationTerms::new(&cal, u32::MAX);

        assert_eq!(terms.dt, DT_MAX);
        assert_eq!(terms.off, DT_MAX);
        assert_eq!(terms.sens, DT_MAX);
    }

    #[test]
    fn test_pressure_shift_rounds_down() {
        assert_eq!(pressure(0, 0, 1), -1);
        assert_eq!(pressure(0, 0, -(1 << 15)), 1);
        assert_eq!(pressure(1 << 21, 1 << 15, 0), 1);
    }

    #[test]
    fn test_stored_reading_decodes() {
        let reading = compensate(&DATASHEET_CAL, &DATASHEET_RAW);
        let mut buf = [0u8; 32];

        let used = postcard::to_slice(&reading, &mut buf).unwrap().len();
        let decoded: CompensatedReading = postcard::from_bytes(&buf[..used]).unwrap();

        assert_eq!(decoded, reading);
    }

    #[test]
    fn test_altitude_at_sea_level_is_zero() {
        assert!(altitude_from_pressure(101_325).abs() < 1e-3);
    }

    #[test]
    fn test_altitude_decreases_with_pressure() {
        let low = altitude_from_pressure(101_000);
        let high = altitude_from_pressure(90_000);
        assert!(low > 0.0);
        assert!(high > low);
        assert!(altitude_from_pressure(102_000) < 0.0);
    }

    #[cfg(feature = "second-order")]
    #[test]
    fn test_second_order_leaves_warm_readings_alone() {
        let terms = CompensationTerms::new(&DATASHEET_CAL, DATASHEET_RAW.d2);
        assert_eq!(terms.second_order(), terms);
    }

    #[cfg(feature = "second-order")]
    #[test]
    fn test_second_order_corrects_cold_readings() {
        let terms = CompensationTerms {
            dt: -1 << 16,
            temp: -2000,
            off: 1 << 32,
            sens: 1 << 31,
        };
        let corrected = terms.second_order();

        // T2 = 2^32 / 2^31 = 2
        assert_eq!(corrected.temp, -2002);
        // OFF2 = 5 * 4000^2 / 2 + 7 * 500^2
        assert_eq!(corrected.off, (1 << 32) - 40_000_000 - 1_750_000);
        // SENS2 = 5 * 4000^2 / 4 + 11 * 500^2 / 2
        assert_eq!(corrected.sens, (1 << 31) - 20_000_000 - 1_375_000);
    }
}
