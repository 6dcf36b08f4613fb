// Fetch statistics: attempt/success/failure counters and the last fetch timing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

#[derive(Debug, Clone, Default)]
pub struct FetchSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub bytes_written: u64,
    pub last_duration: Option<Duration>,
    pub last_success_at: Option<SystemTime>,
}

#[derive(Default)]
struct LastFetch {
    duration: Option<Duration>,
    success_at: Option<SystemTime>,
}

#[derive(Default)]
pub struct FetchStats {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    bytes_written: AtomicU64,
    last: Mutex<LastFetch>,
}

impl FetchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self, bytes: u64, duration: Duration) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        let mut last = self.last.lock();
        last.duration = Some(duration);
        last.success_at = Some(SystemTime::now());
    }

    pub fn record_failure(&self, duration: Duration) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.last.lock().duration = Some(duration);
    }

    pub fn snapshot(&self) -> FetchSnapshot {
        let last = self.last.lock();
        FetchSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            last_duration: last.duration,
            last_success_at: last.success_at,
        }
    }
}
