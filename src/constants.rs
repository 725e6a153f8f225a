use std::time::Duration;

/// Factory-default 7-bit I2C address of the LIDAR-Lite v3.
pub const LIDAR_ADDR: u8 = 0x62;

/// Acquisition command register.
pub(crate) const LIDAR_CONFIG_REGISTER: u8 = 0x00;
/// Velocity register, one signed byte.
pub(crate) const LIDAR_VELOCITY_REGISTER: u8 = 0x04;
/// Distance register pair, high byte first. Bit 7 set requests auto-increment.
pub(crate) const LIDAR_DISTANCE_REGISTER: u8 = 0x8f;

/// Take a measurement with receiver bias correction.
pub(crate) const LIDAR_CMD_ACQUIRE_WITH_BIAS: u8 = 0x04;

/// Time the sensor needs between the acquire command and a valid result.
pub(crate) const MEASUREMENT_DELAY: Duration = Duration::from_millis(40);
/// Quiet time after reading results before the next acquire command.
pub(crate) const SETTLE_DELAY: Duration = Duration::from_millis(5);
/// Minimum gap between the end of one cycle and the start of the next.
pub(crate) const MIN_TICK_YIELD: Duration = Duration::from_millis(10);

/// 10 Hz polling.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_millis(100);

pub const DEFAULT_I2C_BUS: u8 = 1;

pub(crate) const CM_TO_INCHES: f64 = 0.393701;

pub(crate) const POLLER_THREAD_NAME: &str = "lidarlite_poller";

/// Fixed latency of one acquisition cycle; no poll period may be shorter.
pub(crate) fn acquisition_latency() -> Duration {
    MEASUREMENT_DELAY + SETTLE_DELAY
}
