use crate::constants::{acquisition_latency, DEFAULT_I2C_BUS, DEFAULT_POLL_PERIOD, LIDAR_ADDR};
use crate::error::LidarError;
use std::time::Duration;
use thread_priority::ThreadPriority;

/// Where the sensor lives and how often to poll it.
///
/// The defaults match a LIDAR-Lite v3 on `/dev/i2c-1` at its factory address,
/// polled at 10 Hz from a maximum-priority thread.
#[derive(Debug, Clone)]
pub struct LidarConfig {
    pub bus_path: String,
    pub address: u8,
    pub period: Duration,
    pub priority: ThreadPriority,
}

impl Default for LidarConfig {
    fn default() -> Self {
        LidarConfig {
            bus_path: bus_path(DEFAULT_I2C_BUS),
            address: LIDAR_ADDR,
            period: DEFAULT_POLL_PERIOD,
            priority: ThreadPriority::Max,
        }
    }
}

impl LidarConfig {
    pub fn bus(mut self, bus: u8) -> Self {
        self.bus_path = bus_path(bus);
        self
    }

    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn priority(mut self, priority: ThreadPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn validate(&self) -> Result<(), LidarError> {
        if self.address > 0x7f {
            return Err(LidarError::InvalidAddress(self.address));
        }
        if self.period < acquisition_latency() {
            return Err(LidarError::InvalidPeriod(self.period));
        }
        Ok(())
    }
}

fn bus_path(bus: u8) -> String {
    format!("/dev/i2c-{}", bus)
}
