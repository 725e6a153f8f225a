use crate::bus::RegisterBus;
use crate::constants::{
    LIDAR_CMD_ACQUIRE_WITH_BIAS, LIDAR_CONFIG_REGISTER, LIDAR_DISTANCE_REGISTER,
    LIDAR_VELOCITY_REGISTER, MEASUREMENT_DELAY, MIN_TICK_YIELD, POLLER_THREAD_NAME, SETTLE_DELAY,
};
use crate::error::LidarError;
use crate::reading::{Reading, ReadingCell};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thread_priority::{ThreadBuilder, ThreadPriority};
use tracing::{debug, error, warn};

/// Run one measurement on the sensor and return the raw result.
///
/// Blocks for the full protocol: acquire command, measurement delay, result
/// reads, settle delay. Nothing is returned until the settle delay has
/// passed, so the caller cannot issue the next command early.
pub(crate) fn acquire<B: RegisterBus>(bus: &mut B) -> Result<Reading, LidarError> {
    bus.write_register(LIDAR_CONFIG_REGISTER, LIDAR_CMD_ACQUIRE_WITH_BIAS)
        .map_err(|e| LidarError::acquisition("write acquire command", e))?;
    thread::sleep(MEASUREMENT_DELAY);

    let mut distance = [0u8; 2];
    bus.read_registers(LIDAR_DISTANCE_REGISTER, &mut distance)
        .map_err(|e| LidarError::acquisition("read distance", e))?;
    let mut velocity = [0u8; 1];
    bus.read_registers(LIDAR_VELOCITY_REGISTER, &mut velocity)
        .map_err(|e| LidarError::acquisition("read velocity", e))?;

    thread::sleep(SETTLE_DELAY);
    Ok(Reading::from_registers(distance, velocity))
}

/// Handle to a running poller thread. Stopping (or dropping) it joins the thread.
pub(crate) struct PollWorker {
    stop_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl PollWorker {
    pub(crate) fn spawn<B: RegisterBus>(
        bus: Arc<Mutex<B>>,
        cell: Arc<ReadingCell>,
        period: Duration,
        priority: ThreadPriority,
    ) -> Result<Self, LidarError> {
        let (stop_tx, stop_rx) = bounded(1);

        let thread = ThreadBuilder::default()
            .name(POLLER_THREAD_NAME.to_string())
            .priority(priority)
            .spawn(move |priority_set| {
                if let Err(e) = priority_set {
                    warn!("Failed to set poller thread priority, using default: {:?}", e);
                }
                polling_loop(bus, cell, period, stop_rx);
            })
            .map_err(LidarError::ThreadSpawn)?;

        Ok(PollWorker {
            stop_tx,
            thread_handle: Some(thread),
        })
    }

    /// Signal the thread and wait for it. A cycle already under way finishes first.
    pub(crate) fn stop(mut self) {
        self.join();
    }

    fn join(&mut self) {
        // Full only if already signalled; either way the thread will see it.
        let _ = self.stop_tx.try_send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                error!("Poller thread panicked");
            }
        }
    }
}

impl Drop for PollWorker {
    fn drop(&mut self) {
        self.join();
    }
}

// Fixed-rate loop: cycle starts are anchored to `period`, with at least
// MIN_TICK_YIELD between the end of one cycle and the start of the next.
fn polling_loop<B: RegisterBus>(
    bus: Arc<Mutex<B>>,
    cell: Arc<ReadingCell>,
    period: Duration,
    stop_rx: Receiver<()>,
) {
    let mut next_tick = Instant::now();

    loop {
        match stop_rx.try_recv() {
            Err(TryRecvError::Empty) => {}
            Ok(()) | Err(TryRecvError::Disconnected) => return,
        }

        {
            // Held for the whole cycle so bus traffic of two cycles never interleaves.
            let mut bus = bus.lock().unwrap_or_else(PoisonError::into_inner);
            match acquire(&mut *bus) {
                Ok(reading) => {
                    let reading = cell.publish(reading);
                    debug!(
                        "reading #{}: {} cm, velocity {}",
                        reading.sequence, reading.distance_cm, reading.velocity
                    );
                }
                Err(e) => warn!("{}; keeping previous reading", e),
            }
        }

        next_tick += period;
        let now = Instant::now();
        let wait = next_tick.saturating_duration_since(now).max(MIN_TICK_YIELD);
        if next_tick < now {
            // Overran: start again right after the yield and re-anchor there.
            next_tick = now + wait;
        }

        match stop_rx.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::I2cRegisters;
    use crate::constants::LIDAR_ADDR;
    use embedded_hal_mock::eh0::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    fn one_cycle(distance: [u8; 2], velocity: u8) -> Vec<I2cTrans> {
        vec![
            I2cTrans::write(LIDAR_ADDR, vec![0x00, 0x04]),
            I2cTrans::write_read(LIDAR_ADDR, vec![0x8f], distance.to_vec()),
            I2cTrans::write_read(LIDAR_ADDR, vec![0x04], vec![velocity]),
        ]
    }

    #[test]
    fn test_acquire_transactions() {
        let mut regs = I2cRegisters::new(I2cMock::new(&one_cycle([0x01, 0x2c], 0xfd)), LIDAR_ADDR);

        let reading = acquire(&mut regs).unwrap();
        assert_eq!(reading.distance_cm, 300);
        assert_eq!(reading.velocity, -3);
        // Not published yet.
        assert_eq!(reading.sequence, 0);

        regs.release().done();
    }

    #[test]
    fn test_acquire_waits_for_measurement_and_settle() {
        let mut regs = I2cRegisters::new(I2cMock::new(&one_cycle([0, 0], 0)), LIDAR_ADDR);

        let started = Instant::now();
        acquire(&mut regs).unwrap();
        assert!(started.elapsed() >= MEASUREMENT_DELAY + SETTLE_DELAY);

        regs.release().done();
    }

    struct FailingBus;

    impl RegisterBus for FailingBus {
        type Error = &'static str;

        fn write_register(&mut self, _: u8, _: u8) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read_registers(&mut self, _: u8, _: &mut [u8]) -> Result<(), Self::Error> {
            Err("nack")
        }
    }

    #[test]
    fn test_acquire_reports_failed_step() {
        match acquire(&mut FailingBus) {
            Err(LidarError::Acquisition(msg)) => assert_eq!(msg, "read distance: \"nack\""),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_worker_publishes_and_stops() {
        let mut expectations = one_cycle([0x00, 0x64], 0x02);
        expectations.extend(one_cycle([0x00, 0x65], 0x03));
        let mock = I2cMock::new(&expectations);
        let bus = Arc::new(Mutex::new(I2cRegisters::new(mock.clone(), LIDAR_ADDR)));
        let cell = Arc::new(ReadingCell::default());

        let worker = PollWorker::spawn(
            bus,
            cell.clone(),
            Duration::from_millis(200),
            ThreadPriority::Min,
        )
        .unwrap();
        // Second cycle publishes at ~245 ms, a third would start at 400 ms.
        thread::sleep(Duration::from_millis(300));
        worker.stop();

        let reading = cell.load();
        assert_eq!(reading.sequence, 2);
        assert_eq!(reading.distance_cm, 101);
        assert_eq!(reading.velocity, 3);

        let mut mock = mock;
        mock.done();
    }
}
