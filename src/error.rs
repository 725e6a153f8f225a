use linux_embedded_hal::i2cdev::linux::LinuxI2CError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LidarError {
    /// The I2C character device could not be opened. The driver is not created.
    #[error("Failed to open I2C bus {path}: {source}")]
    BusUnavailable {
        path: String,
        #[source]
        source: LinuxI2CError,
    },

    #[error("Invalid I2C address {0:#04x}: must be a 7-bit address")]
    InvalidAddress(u8),

    #[error(
        "Invalid poll period {0:?}: must be at least the {min:?} acquisition latency",
        min = crate::constants::acquisition_latency()
    )]
    InvalidPeriod(Duration),

    /// A register write or read failed partway through a cycle.
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Failed to spawn poller thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

impl LidarError {
    pub(crate) fn acquisition<E: std::fmt::Debug>(step: &str, e: E) -> Self {
        LidarError::Acquisition(format!("{}: {:?}", step, e))
    }
}
