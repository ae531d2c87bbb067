//! Sample clock quantization
//!
//! Host-mode ticks come from an embassy ticker running off the 1 MHz
//! timer, so only whole-microsecond periods are achievable.

/// Timer ticks per second
pub const TIMER_HZ: f32 = 1_000_000.0;

/// Slowest period the ticker is asked for (0.01 Hz)
pub const MAX_PERIOD_US: u64 = 100_000_000;

/// Nearest achievable period for a requested rate
///
/// Returns the period in microseconds and the rate it really gives.
/// Rates that are not positive and finite give `None`.
pub fn tick_period(hz: f32) -> Option<(u64, f32)> {
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    let period = ((TIMER_HZ / hz) + 0.5) as u64;
    let period = period.clamp(1, MAX_PERIOD_US);
    Some((period, TIMER_HZ / period as f32))
}
