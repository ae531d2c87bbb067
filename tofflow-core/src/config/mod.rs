//! Persisted configuration
//!
//! One fixed-size record holding the flow controller settings and the
//! chip register image, guarded by a size and CRC16 header.

pub mod record;
pub mod store;

pub use record::{ConfigRecord, PAYLOAD_LEN, RECORD_LEN};
pub use store::{ConfigStore, LoadOutcome, RECORD_OFFSET};

use tofflow_hal::FlashError;

/// Reasons a stored record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Storage access failed
    Flash(FlashError),
    /// Header size does not match this record layout
    Size { found: u16, expected: u16 },
    /// Payload checksum mismatch
    Checksum { stored: u16, computed: u16 },
    /// A field holds a value outside its enumeration
    Encoding,
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}
