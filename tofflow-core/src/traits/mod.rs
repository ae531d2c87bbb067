//! Hardware abstraction traits
//!
//! The measurement chip is the only collaborator the core drives directly
//! that is not part of the board; its contract lives here.

pub mod tdc;

pub use tdc::{ChipVariant, EventTimingMode, TdcChip, TdcCommand};
