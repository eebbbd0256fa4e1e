//! Dispatch pacing
//!
//! The registry tolerates bursts poorly, so the driver pauses after every
//! batch of dispatches. The pause is a cooperative yield, not a lock.

use std::future::Future;
use std::time::Duration;

/// Something the driver can wait on between dispatch batches
pub trait Throttle {
    fn pause(&self) -> impl Future<Output = ()> + Send;
}

/// Sleeps for a fixed duration
#[derive(Debug, Clone, Copy)]
pub struct SleepThrottle {
    duration: Duration,
}

impl SleepThrottle {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Throttle for SleepThrottle {
    fn pause(&self) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(self.duration)
    }
}
