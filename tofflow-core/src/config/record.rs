//! Binary layout of the configuration record
//!
//! ```text
//! offset  size  field
//!      0     2  size      payload length (44)
//!      2     2  checksum  CRC16 over bytes 4..48
//!      4     1  sampling mode
//!      5     1  sound-speed method
//!      6     4  sampling frequency (f32)
//!     10     2  tof/temp ratio (i16)
//!     12     1  event timing mode
//!     13    32  register image, 16 x u16
//!     45     3  zero padding
//! ```
//!
//! All multi-byte fields are little-endian.

use super::ConfigError;
use crate::chip::registers::{ConfigRegisters, CONFIG_REGISTER_COUNT};
use crate::flow::{SamplingMode, SosMethod};
use crate::traits::EventTimingMode;

/// Size and checksum
pub const HEADER_LEN: usize = 4;

const IMAGE_OFFSET: usize = 9;
const IMAGE_LEN: usize = CONFIG_REGISTER_COUNT * 2;

/// Payload rounded up to a whole number of 32-bit words
pub const PAYLOAD_LEN: usize = (IMAGE_OFFSET + IMAGE_LEN + 3) & !3;

/// Header plus payload
pub const RECORD_LEN: usize = HEADER_LEN + PAYLOAD_LEN;

/// Settings restored at boot
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigRecord {
    pub mode: SamplingMode,
    pub sos: SosMethod,
    /// Host-mode sampling rate in Hz
    pub frequency: f32,
    pub tof_temp: i16,
    pub event_timing: EventTimingMode,
    pub registers: ConfigRegisters,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ConfigRecord {
    /// Factory settings: idle, direct, 20 Hz, one temperature per TOF
    pub const fn defaults() -> Self {
        Self {
            mode: SamplingMode::Idle,
            sos: SosMethod::Direct,
            frequency: 20.0,
            tof_temp: 1,
            event_timing: EventTimingMode::Tof,
            registers: ConfigRegisters::transducer_defaults(),
        }
    }

    /// Serialize the payload, padding included
    pub fn encode_payload(&self) -> [u8; PAYLOAD_LEN] {
        let mut out = [0u8; PAYLOAD_LEN];
        out[0] = self.mode as u8;
        out[1] = self.sos as u8;
        out[2..6].copy_from_slice(&self.frequency.to_le_bytes());
        out[6..8].copy_from_slice(&self.tof_temp.to_le_bytes());
        out[8] = self.event_timing as u8;
        for (chunk, value) in out[IMAGE_OFFSET..IMAGE_OFFSET + IMAGE_LEN]
            .chunks_exact_mut(2)
            .zip(self.registers.values().iter())
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }

    /// Parse a payload whose checksum has already been verified
    pub fn decode_payload(payload: &[u8; PAYLOAD_LEN]) -> Result<Self, ConfigError> {
        let mode = SamplingMode::from_u8(payload[0]).ok_or(ConfigError::Encoding)?;
        let sos = SosMethod::from_u8(payload[1]).ok_or(ConfigError::Encoding)?;
        let frequency = f32::from_le_bytes([payload[2], payload[3], payload[4], payload[5]]);
        let tof_temp = i16::from_le_bytes([payload[6], payload[7]]);
        let event_timing = EventTimingMode::from_u8(payload[8]).ok_or(ConfigError::Encoding)?;

        let mut values = [0u16; CONFIG_REGISTER_COUNT];
        for (value, chunk) in values
            .iter_mut()
            .zip(payload[IMAGE_OFFSET..IMAGE_OFFSET + IMAGE_LEN].chunks_exact(2))
        {
            *value = u16::from_le_bytes([chunk[0], chunk[1]]);
        }

        Ok(Self {
            mode,
            sos,
            frequency,
            tof_temp,
            event_timing,
            registers: ConfigRegisters::from_values(values),
        })
    }

    /// Serialize header and payload; `crc16` covers the payload only
    pub fn encode(&self, crc16: impl FnOnce(&[u8]) -> u16) -> [u8; RECORD_LEN] {
        let payload = self.encode_payload();
        let mut out = [0u8; RECORD_LEN];
        out[0..2].copy_from_slice(&(PAYLOAD_LEN as u16).to_le_bytes());
        out[2..4].copy_from_slice(&crc16(&payload).to_le_bytes());
        out[HEADER_LEN..].copy_from_slice(&payload);
        out
    }

    /// Validate size, then checksum, then decode the payload
    pub fn decode(
        bytes: &[u8; RECORD_LEN],
        crc16: impl FnOnce(&[u8]) -> u16,
    ) -> Result<Self, ConfigError> {
        let size = u16::from_le_bytes([bytes[0], bytes[1]]);
        if size as usize != PAYLOAD_LEN {
            return Err(ConfigError::Size {
                found: size,
                expected: PAYLOAD_LEN as u16,
            });
        }

        let mut payload = [0u8; PAYLOAD_LEN];
        payload.copy_from_slice(&bytes[HEADER_LEN..]);
        let stored = u16::from_le_bytes([bytes[2], bytes[3]]);
        let computed = crc16(&payload);
        if stored != computed {
            return Err(ConfigError::Checksum { stored, computed });
        }

        Self::decode_payload(&payload)
    }
}
