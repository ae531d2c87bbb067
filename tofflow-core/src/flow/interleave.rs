//! TOF/temperature interleave policy
//!
//! A positive ratio N runs one temperature measurement every N cycles,
//! a negative ratio runs one TOF measurement every |N| cycles and zero
//! never interleaves. The secondary measurement closes each window.

use crate::traits::TdcCommand;

/// Measurements the sequencer alternates between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Measurement {
    TofDiff,
    Temperature,
}

impl Measurement {
    pub const fn command(self) -> TdcCommand {
        match self {
            Measurement::TofDiff => TdcCommand::TofDiff,
            Measurement::Temperature => TdcCommand::Temperature,
        }
    }
}

/// Interleave counter
///
/// The count stays within `[min(0, ratio), max(0, ratio))` and returns to
/// zero whenever it reaches the ratio or the ratio changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interleaver {
    ratio: i16,
    count: i16,
}

impl Interleaver {
    pub const fn new(ratio: i16) -> Self {
        Self { ratio, count: 0 }
    }

    pub const fn ratio(&self) -> i16 {
        self.ratio
    }

    pub const fn count(&self) -> i16 {
        self.count
    }

    /// Change the ratio and restart the window
    pub fn set_ratio(&mut self, ratio: i16) {
        self.ratio = ratio;
        self.count = 0;
    }

    /// Step the counter; true when the window closed
    pub fn advance(&mut self) -> bool {
        if self.ratio > 0 {
            self.count += 1;
            if self.count >= self.ratio {
                self.count = 0;
                return true;
            }
        } else if self.ratio < 0 {
            self.count -= 1;
            if self.count <= self.ratio {
                self.count = 0;
                return true;
            }
        }
        false
    }

    /// Measurement run on ordinary cycles
    pub const fn primary(&self) -> Measurement {
        if self.ratio < 0 {
            Measurement::Temperature
        } else {
            Measurement::TofDiff
        }
    }

    /// Measurement run once per window
    pub const fn secondary(&self) -> Measurement {
        if self.ratio < 0 {
            Measurement::TofDiff
        } else {
            Measurement::Temperature
        }
    }

    /// Advance and pick this cycle's measurement
    pub fn decide(&mut self) -> Measurement {
        if self.ratio == 0 {
            return Measurement::TofDiff;
        }
        if self.advance() {
            self.secondary()
        } else {
            self.primary()
        }
    }
}
