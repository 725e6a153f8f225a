//! Driver for the Garmin LIDAR-Lite v3 laser rangefinder on Linux I2C.
//!
//! The sensor is polled from a background thread at a fixed rate (10 Hz by
//! default). Each cycle sends the acquire command, waits for the
//! measurement, reads distance and velocity, and publishes them together.
//! Readers always see the latest complete reading without waiting on the bus.
//!
//! ```no_run
//! use lidarlite::LidarLite;
//!
//! let lidar = LidarLite::new(1)?;
//! lidar.start()?;
//! std::thread::sleep(std::time::Duration::from_millis(250));
//! println!("{} cm", lidar.get_distance_centimeters());
//! lidar.stop();
//! # Ok::<(), lidarlite::LidarError>(())
//! ```

mod bus;
mod config;
mod constants;
mod driver;
mod error;
mod poller;
#[cfg(feature = "python")]
mod python;
mod reading;

pub use crate::bus::{I2cRegisters, RegisterBus};
pub use crate::config::LidarConfig;
pub use crate::constants::{DEFAULT_I2C_BUS, DEFAULT_POLL_PERIOD, LIDAR_ADDR};
pub use crate::driver::LidarLite;
pub use crate::error::LidarError;
pub use crate::reading::Reading;
pub use thread_priority::ThreadPriority;
