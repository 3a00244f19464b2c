//! Sensor drivers.  Each implements [`PresenceSensor`] and never blocks
//! longer than its own bounded poll budget.

pub mod vl53l0x;

use crate::app::ports::PresenceSensor;
use crate::error::SensorError;

/// A sensor that may have failed to probe at boot.  `None` reads as
/// [`SensorError::NotPresent`], which the presence task treats as "no one
/// there".
impl<S: PresenceSensor> PresenceSensor for Option<S> {
    fn read_distance_mm(&mut self) -> Result<u16, SensorError> {
        match self {
            Some(sensor) => sensor.read_distance_mm(),
            None => Err(SensorError::NotPresent),
        }
    }
}
