use crate::{LidarConfig, LidarError, LidarLite};
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

impl From<LidarError> for PyErr {
    fn from(e: LidarError) -> PyErr {
        match e {
            LidarError::InvalidAddress(_) | LidarError::InvalidPeriod(_) => {
                PyErr::new::<PyValueError, _>(e.to_string())
            }
            LidarError::ThreadSpawn(_) => PyErr::new::<PyRuntimeError, _>(e.to_string()),
            LidarError::BusUnavailable { .. } | LidarError::Acquisition(_) => {
                PyErr::new::<PyIOError, _>(e.to_string())
            }
        }
    }
}

#[pyclass(name = "LidarLite")]
#[doc = "Garmin LIDAR-Lite v3 rangefinder polled at 10 Hz in a background thread.\n\n\
         Readings are cached: the getters return the latest sample and never\n\
         block on the bus. Call start() to begin polling and stop() to end it."]
struct PyLidarLite {
    inner: LidarLite,
}

#[pymethods]
impl PyLidarLite {
    #[new]
    #[pyo3(signature = (bus, address=None))]
    fn new(bus: u8, address: Option<u8>) -> PyResult<Self> {
        let mut config = LidarConfig::default().bus(bus);
        if let Some(address) = address {
            config = config.address(address);
        }
        Ok(PyLidarLite {
            inner: LidarLite::with_config(config)?,
        })
    }

    fn start(&self) -> PyResult<()> {
        Ok(self.inner.start()?)
    }

    fn stop(&self, py: Python<'_>) {
        // Joining the poller can take a full cycle.
        py.allow_threads(|| self.inner.stop());
    }

    fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    fn get_distance_centimeters(&self) -> i32 {
        self.inner.get_distance_centimeters()
    }

    fn get_distance_inches(&self) -> f64 {
        self.inner.get_distance_inches()
    }

    fn get_velocity(&self) -> i8 {
        self.inner.get_velocity()
    }

    /// (timestamp, distance_cm, velocity, sequence) of the latest reading.
    fn get_reading(&self) -> (f64, u16, i8, u64) {
        let r = self.inner.get_reading();
        (r.timestamp, r.distance_cm, r.velocity, r.sequence)
    }
}

#[pymodule]
fn lidarlite(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyLidarLite>()?;
    Ok(())
}
