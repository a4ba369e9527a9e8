use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Ephemeral per-session counters. Reset each process start; never
/// persisted. Every executor outcome is individually observable here.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub followed_today: u32,
    pub unfollowed_today: u32,
    pub skipped_whitelisted: u32,
    pub skipped_already_followed: u32,
    pub rate_limited: u32,
    pub failed: u32,
    pub start_followers: u64,
    pub current_followers: u64,
    pub followers_gained: i64,
}

/// Shared run state: the cooperative cancellation flag plus the stats
/// accumulator. The engine worker is the only writer; external readers get
/// stale snapshots via `stats()` and must tolerate that.
pub struct RunContext {
    running: AtomicBool,
    stats: Mutex<SessionStats>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            stats: Mutex::new(SessionStats::default()),
        }
    }

    /// Polled between candidates/records. Cancellation is cooperative:
    /// an in-flight action always completes before the flag is honored.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn update_stats(&self, f: impl FnOnce(&mut SessionStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }
}
