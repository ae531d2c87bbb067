//! Sampling-mode state machine and measurement sequencer
//!
//! The controller decides which chip command to issue next, interleaves
//! TOF and temperature acquisitions and turns chip interrupts into results.

pub mod controller;
pub mod events;
pub mod interleave;
pub mod mode;

pub use controller::{FlowController, FlowOutput, MeasurementResult, TemperatureSample};
pub use events::FlowEvents;
pub use interleave::{Interleaver, Measurement};
pub use mode::{SamplingMode, SosMethod};
