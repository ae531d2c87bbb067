//! MAX3510x register model
//!
//! Addresses, bitfields, value encodings and result decoding shared by the
//! chip driver, the flow controller and the console.

pub mod registers;
pub mod results;
pub mod status;

pub use registers::{field, reg, ConfigRegisters, Field, CLOCK_HZ, MAX_HITCOUNT};
pub use results::{
    calibration_factor, input_frequency, Fixed, RawTempResults, RawTofDirection, RawTofResults,
    TempResults, TofDirection, TofResults,
};
pub use status::InterruptStatus;
