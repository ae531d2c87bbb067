//! RP2040-specific HAL for the flow meter firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `tofflow-hal` traits:
//!
//! - Flash storage in the last erase sector (implements `tofflow_hal::FlashStorage`)
//! - Status LEDs on plain GPIO outputs
//! - SPI device with software chip select for the TDC
//! - Console UART halves
//! - Sample clock period quantization

#![no_std]

pub mod clock;
pub mod flash;
pub mod gpio;
pub mod spi;
pub mod uart;

// Re-export shared traits from tofflow-hal for convenience
pub use tofflow_hal::{FlashStorage as FlashStorageTrait, OutputPin as OutputPinTrait};
