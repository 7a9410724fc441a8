//! Background ticking for a shared `ChessClock`.
//!
//! Ticks and user actions take the same lock, so a tick never lands in the
//! middle of an action. The stop flag is read under that lock: once `stop`
//! returns, no further tick is applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::time::TimeSource;
use super::{ChessClock, ClockEvent};

/// Periodically ticks a shared clock on its own thread.
///
/// Tick cadence only affects how fresh the displayed time is; the amount
/// charged always comes from the time source.
pub struct ClockTicker {
    clock: Arc<Mutex<ChessClock>>,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClockTicker {
    /// Spawn the ticking thread.
    ///
    /// `on_event` runs on the ticker thread, outside the clock lock.
    pub fn spawn<T, F>(
        clock: Arc<Mutex<ChessClock>>,
        time: T,
        interval: Duration,
        mut on_event: F,
    ) -> Self
    where
        T: TimeSource + 'static,
        F: FnMut(ClockEvent) + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_clock = Arc::clone(&clock);
        let thread_flag = Arc::clone(&stop_flag);

        let handle = thread::spawn(move || loop {
            let events = {
                let mut clock = thread_clock.lock();
                if thread_flag.load(Ordering::Acquire) {
                    break;
                }
                clock.tick(time.now_ms())
            };
            for event in events {
                trace!(?event, "clock event");
                on_event(event);
            }
            thread::park_timeout(interval);
            if thread_flag.load(Ordering::Acquire) {
                break;
            }
        });
        debug!(?interval, "clock ticker started");

        Self {
            clock,
            stop_flag,
            handle: Some(handle),
        }
    }

    /// The shared clock, for user actions.
    pub fn clock(&self) -> &Arc<Mutex<ChessClock>> {
        &self.clock
    }

    /// Cancel ticking and wait for the thread to exit.
    pub fn stop(&mut self) {
        {
            let _guard = self.clock.lock();
            self.stop_flag.store(true, Ordering::Release);
        }
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                debug!("clock ticker thread panicked");
            }
            debug!("clock ticker stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
