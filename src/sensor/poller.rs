//! Background polling thread shared by the sysfs and replay sources

use super::traits::{SampleCallback, SourceEvent};
use crate::domain::SensorSample;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Result of one poll
pub(crate) enum Poll {
    Sample(SensorSample),
    /// Nothing this tick (transient read failure)
    Skip,
    Finished,
}

/// Owns a thread that polls at a fixed interval and pushes to a callback
pub(crate) struct Poller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub(crate) fn spawn<F>(
        name: &str,
        interval: Duration,
        mut poll: F,
        mut callback: SampleCallback,
    ) -> io::Result<Self>
    where
        F: FnMut() -> Poll + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(format!("magscan-{}", name))
            .spawn(move || {
                while !stop_flag.load(Ordering::Acquire) {
                    match poll() {
                        Poll::Sample(sample) => callback(SourceEvent::Sample(sample)),
                        Poll::Skip => {}
                        Poll::Finished => {
                            callback(SourceEvent::Ended);
                            break;
                        }
                    }
                    thread::sleep(interval);
                }
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit
    pub(crate) fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Sensor polling thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
