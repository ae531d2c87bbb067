//! Composite board collaborator
//!
//! Everything the measurement core needs from the board that is not the
//! TDC chip itself.

use crc::{Crc, CRC_16_IBM_3740};

use crate::clock::SampleClock;
use crate::flash::FlashStorage;
use crate::time::Timebase;

/// CRC used for the persisted configuration record (CCITT-FALSE)
pub const CONFIG_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Reference resistor fitted opposite the thermistor, in ohms
pub const REFERENCE_RESISTOR_OHMS: f32 = 1000.0;

/// Status indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Led {
    /// Lit while the TOF channel times out (transducer disconnected)
    Tof = 0,
    /// Lit while the temperature channel times out (sensor disconnected)
    Temperature = 1,
}

/// Board collaborator
///
/// Object safe so the console command table can hold plain function
/// pointers taking `&mut dyn Board`.
pub trait Board: FlashStorage + SampleClock + Timebase {
    /// Drive a status LED
    fn set_led(&mut self, led: Led, on: bool);

    /// Reset the whole board
    fn reset(&mut self);

    /// Busy-wait for `ms` milliseconds
    fn wait_ms(&mut self, ms: u32);

    /// 16-bit checksum used by the configuration record
    fn crc16(&self, data: &[u8]) -> u16 {
        CONFIG_CRC.checksum(data)
    }

    /// Thermistor resistance from the thermistor and reference discharge times
    fn temp_sensor_resistance(&self, therm: f32, reference: f32) -> f32 {
        if reference == 0.0 {
            return 0.0;
        }
        REFERENCE_RESISTOR_OHMS * therm / reference
    }
}
