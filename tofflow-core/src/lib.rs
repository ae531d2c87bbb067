//! Board-agnostic measurement control for a MAX3510x flow meter
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - TDC chip contract and MAX3510x register model
//! - Sampling-mode state machine and measurement sequencer
//! - Persisted configuration record
//! - Serial console command interpreter and result reporting
//! - The dispatcher tying them to one chip and one board

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod chip;
pub mod config;
pub mod console;
pub mod flow;
pub mod instrument;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use instrument::Instrument;
