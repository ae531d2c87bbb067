//! Sample clock abstraction
//!
//! In host sampling mode the measurement cycle is paced by a board timer.
//! The timer only has a finite set of achievable periods, so programming a
//! rate reports back what was actually set.

/// Periodic tick source for host-mode sampling
pub trait SampleClock {
    /// Start or stop the tick
    fn clock_enable(&mut self, enable: bool);

    /// Program the tick rate in Hz
    ///
    /// Returns the achievable rate closest to `hz`.
    fn clock_set(&mut self, hz: f32) -> f32;
}
