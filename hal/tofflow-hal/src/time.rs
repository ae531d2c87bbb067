//! Timestamps and elapsed time

/// Monotonic timestamp in microseconds
pub type Timestamp = u64;

/// Monotonic time source
pub trait Timebase {
    /// Current timestamp
    fn timestamp(&self) -> Timestamp;

    /// Seconds elapsed since `since`
    ///
    /// Returns the current timestamp alongside the delta so callers can
    /// chain measurements without a second clock read.
    fn elapsed(&self, since: Timestamp) -> (Timestamp, f32) {
        let now = self.timestamp();
        let delta_us = now.saturating_sub(since);
        (now, delta_us as f32 / 1_000_000.0)
    }
}
