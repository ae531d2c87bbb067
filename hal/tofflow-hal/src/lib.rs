//! tofflow Hardware Abstraction Layer
//!
//! This crate defines the board collaborator that the measurement core
//! talks to. Chip-specific HALs implement the individual traits; the
//! firmware composes them into one [`Board`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tofflow-core (flow, config, console)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tofflow-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ tofflow-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Fixed-offset persistent storage
//! - [`clock::SampleClock`] - Host-mode sampling tick source
//! - [`time::Timebase`] - Timestamps and elapsed time
//! - [`gpio::OutputPin`] - Digital outputs (status LEDs)
//! - [`uart::UartTx`], [`uart::UartRx`] - Console transmit and receive
//! - [`board::Board`] - Everything above plus CRC, reset and delays

#![no_std]
#![deny(unsafe_code)]

pub mod board;
pub mod clock;
pub mod flash;
pub mod gpio;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use board::{Board, Led, CONFIG_CRC};
pub use clock::SampleClock;
pub use flash::{FlashError, FlashStorage};
pub use gpio::OutputPin;
pub use time::{Timebase, Timestamp};
pub use uart::{UartRx, UartTx, UartWriter};
