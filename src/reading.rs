use crate::constants::CM_TO_INCHES;
use nix::time::{clock_gettime, ClockId};
use std::sync::{Mutex, PoisonError};

/// One completed acquisition.
///
/// Distance and velocity always come from the same cycle. Before the first
/// cycle completes every field is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    /// Distance in centimeters, assembled high byte first.
    pub distance_cm: u16,
    /// Change in distance since the previous measurement, in sensor units.
    /// Negative while the target approaches.
    pub velocity: i8,
    /// Successful cycles since the driver was created. Zero means none yet.
    pub sequence: u64,
    /// CLOCK_MONOTONIC seconds at which the reading was published.
    pub timestamp: f64,
}

impl Reading {
    pub(crate) fn from_registers(distance: [u8; 2], velocity: [u8; 1]) -> Self {
        Reading {
            distance_cm: u16::from_be_bytes(distance),
            velocity: i8::from_be_bytes(velocity),
            ..Reading::default()
        }
    }

    pub fn distance_inches(&self) -> f64 {
        f64::from(self.distance_cm) * CM_TO_INCHES
    }

    pub fn is_valid(&self) -> bool {
        self.sequence > 0
    }
}

/// Latest published reading, shared between the poller and any number of readers.
#[derive(Debug, Default)]
pub(crate) struct ReadingCell {
    latest: Mutex<Reading>,
}

impl ReadingCell {
    /// Stamp and store `reading` as the next in sequence.
    pub(crate) fn publish(&self, mut reading: Reading) -> Reading {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        reading.sequence = latest.sequence + 1;
        reading.timestamp = get_monotime();
        *latest = reading;
        reading
    }

    pub(crate) fn load(&self) -> Reading {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn get_monotime() -> f64 {
    match clock_gettime(ClockId::CLOCK_MONOTONIC) {
        Ok(ts) => ts.tv_sec() as f64 + (ts.tv_nsec() as f64 / 1_000_000_000.0),
        Err(_) => 0.0, // never expecting this
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_big_endian() {
        assert_eq!(Reading::from_registers([0x01, 0x2c], [0]).distance_cm, 300);
        assert_eq!(Reading::from_registers([0x00, 0x00], [0]).distance_cm, 0);
        assert_eq!(Reading::from_registers([0xff, 0xff], [0]).distance_cm, 65535);
    }

    #[test]
    fn test_velocity_is_signed() {
        assert_eq!(Reading::from_registers([0, 0], [0x05]).velocity, 5);
        assert_eq!(Reading::from_registers([0, 0], [0xfb]).velocity, -5);
        assert_eq!(Reading::from_registers([0, 0], [0x80]).velocity, -128);
    }

    #[test]
    fn test_inches() {
        let reading = Reading {
            distance_cm: 100,
            ..Reading::default()
        };
        assert!((reading.distance_inches() - 39.3701).abs() < 1e-9);
    }

    #[test]
    fn test_cell_starts_zeroed() {
        let cell = ReadingCell::default();
        let reading = cell.load();
        assert_eq!(reading, Reading::default());
        assert!(!reading.is_valid());
    }

    #[test]
    fn test_publish_sequences_and_stamps() {
        let cell = ReadingCell::default();
        let first = cell.publish(Reading::from_registers([0x00, 0x0a], [0x01]));
        let second = cell.publish(Reading::from_registers([0x00, 0x0b], [0x02]));

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(second.timestamp >= first.timestamp);
        assert!(first.timestamp > 0.0);

        let latest = cell.load();
        assert_eq!(latest, second);
        assert_eq!(latest.distance_cm, 11);
        assert_eq!(latest.velocity, 2);
    }
}
