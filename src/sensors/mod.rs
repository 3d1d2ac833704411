mod ms5611;

use core::marker::PhantomData;
use thiserror_no_std::Error;

/// Maximum number of sensor values stored per sample
pub const MAX_SENSORS: usize = 20;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} initialization failed: {details}")]
    InitializationFailed {
        sensor: &'static str,
        details: &'static str,
    },
    #[error("{sensor} {operation} failed: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
}

/// Trait for sensor reading data structures.
/// Provides compile-time guarantees about the number of values and their conversion to arrays.
pub trait SensorReadings<const COUNT: usize> {
    /// Convert the readings into a fixed-size array.
    fn to_array(self) -> [i32; COUNT];
}

/// Trait for sensors that produce typed readings.
pub trait Sensor<const COUNT: usize> {
    /// The type of readings this sensor produces.
    type Readings: SensorReadings<COUNT>;

    /// Read the sensor and return typed readings. Blocks for the whole measurement.
    fn read(&mut self) -> Result<Self::Readings, SensorError>;
}

// Type-level index markers
pub struct Idx<const N: usize>;

pub struct IndexedSensor<S, const START: usize, const COUNT: usize>
where
    S: Sensor<COUNT>,
{
    sensor: S,
    _marker: PhantomData<Idx<START>>,
}

impl<S, const START: usize, const COUNT: usize> From<S> for IndexedSensor<S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    fn from(value: S) -> Self {
        Self::new(value)
    }
}

impl<S, const START: usize, const COUNT: usize> IndexedSensor<S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    pub const fn new(sensor: S) -> Self {
        Self {
            sensor,
            _marker: PhantomData,
        }
    }

    /// Read and write to the values array at the correct indices.
    /// On error the values array is left untouched.
    pub fn read_into(&mut self, values: &mut [i32; MAX_SENSORS]) -> Result<(), SensorError> {
        let readings = self.sensor.read()?;
        let data = readings.to_array();
        values[START..START + COUNT].copy_from_slice(&data);
        Ok(())
    }

    pub const fn start_index() -> usize {
        START
    }

    pub const fn value_count() -> usize {
        COUNT
    }

    /// Absolute index for a specific reading within this sensor.
    pub const fn reading_index(offset: usize) -> usize {
        START + offset
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn into_inner(self) -> S {
        self.sensor
    }
}

pub mod indices {
    use crate::sensors::IndexedSensor;
    use crate::sensors::ms5611::Ms5611Sensor;

    // These indices are the only link between a sensor's readings and its
    // slots in the sample array. Keep them in step with the IndexedSensor
    // type below.
    pub type Ms5611Indexed<I, D> = IndexedSensor<Ms5611Sensor<I, D>, 0, 3>;

    pub const TEMPERATURE: usize = 0;
    pub const PRESSURE: usize = 1;
    pub const ALTITUDE: usize = 2;
}

pub use indices::*;
pub use ms5611::{Ms5611Readings, Ms5611Sensor};
