use crate::bus::{I2cRegisters, RegisterBus};
use crate::config::LidarConfig;
use crate::error::LidarError;
use crate::poller::PollWorker;
use crate::reading::{Reading, ReadingCell};
use linux_embedded_hal::I2cdev;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

/// LIDAR-Lite v3 rangefinder, polled in the background.
///
/// Created idle. [`start`](LidarLite::start) spawns a poller thread that
/// acquires a fresh reading every period; the accessors return whatever was
/// last published and never touch the bus. All methods take `&self`, so the
/// driver can be shared between threads behind an `Arc`.
pub struct LidarLite<B: RegisterBus = I2cRegisters<I2cdev>> {
    bus: Arc<Mutex<B>>,
    latest: Arc<ReadingCell>,
    worker: Mutex<Option<PollWorker>>,
    config: LidarConfig,
}

impl LidarLite {
    /// Open the sensor at its factory address on `/dev/i2c-<bus>`.
    pub fn new(bus: u8) -> Result<Self, LidarError> {
        Self::with_config(LidarConfig::default().bus(bus))
    }

    pub fn with_config(config: LidarConfig) -> Result<Self, LidarError> {
        config.validate()?;
        let i2c = I2cdev::new(&config.bus_path).map_err(|e| LidarError::BusUnavailable {
            path: config.bus_path.clone(),
            source: e,
        })?;
        let bus = I2cRegisters::new(i2c, config.address);
        Self::from_bus(bus, config)
    }
}

impl<B: RegisterBus> LidarLite<B> {
    /// Drive the sensor through an already open bus. `config.bus_path` is
    /// ignored; the bus is assumed to address the right device.
    pub fn from_bus(bus: B, config: LidarConfig) -> Result<Self, LidarError> {
        config.validate()?;
        Ok(LidarLite {
            bus: Arc::new(Mutex::new(bus)),
            latest: Arc::new(ReadingCell::default()),
            worker: Mutex::new(None),
            config,
        })
    }

    /// Begin polling. Does nothing if already polling.
    pub fn start(&self) -> Result<(), LidarError> {
        let mut worker = self.worker();
        if worker.is_some() {
            return Ok(());
        }

        *worker = Some(PollWorker::spawn(
            Arc::clone(&self.bus),
            Arc::clone(&self.latest),
            self.config.period,
            self.config.priority,
        )?);
        info!(
            "Polling LIDAR-Lite at {:#04x} every {:?}",
            self.config.address, self.config.period
        );
        Ok(())
    }

    /// Stop polling and wait for the poller thread to exit.
    ///
    /// A cycle already in progress is allowed to finish and publish; none
    /// starts after this returns. Does nothing if not polling.
    ///
    /// The caller blocks for at most one acquisition cycle, about 45 ms.
    pub fn stop(&self) {
        let mut worker = self.worker();
        if let Some(worker) = worker.take() {
            worker.stop();
            info!("Stopped polling LIDAR-Lite at {:#04x}", self.config.address);
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker().is_some()
    }

    pub fn get_distance_centimeters(&self) -> i32 {
        i32::from(self.latest.load().distance_cm)
    }

    pub fn get_distance_inches(&self) -> f64 {
        self.latest.load().distance_inches()
    }

    pub fn get_velocity(&self) -> i8 {
        self.latest.load().velocity
    }

    /// Latest distance and velocity together, from the same cycle.
    pub fn get_reading(&self) -> Reading {
        self.latest.load()
    }

    pub fn config(&self) -> &LidarConfig {
        &self.config
    }

    fn worker(&self) -> MutexGuard<'_, Option<PollWorker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: RegisterBus> Drop for LidarLite<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
