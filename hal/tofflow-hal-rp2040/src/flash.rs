//! Flash storage driver for RP2040
//!
//! The configuration record lives in the last erase sector of the 2 MiB
//! QSPI flash. Writes read the sector back, patch it and reprogram it, so
//! offsets need no alignment.
//!
//! Implements the `FlashStorage` trait from `tofflow-hal`.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

pub use tofflow_hal::flash::FlashError;

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const CONFIG_PARTITION_SIZE: usize = ERASE_SIZE;
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

/// Bounds check an access against the partition
pub fn partition_range(offset: u32, len: usize) -> Result<core::ops::Range<usize>, FlashError> {
    let start = offset as usize;
    let end = start.checked_add(len).ok_or(FlashError::OutOfBounds)?;
    if end > CONFIG_PARTITION_SIZE {
        return Err(FlashError::OutOfBounds);
    }
    Ok(start..end)
}

/// RP2040 flash storage implementation
pub struct Rp2040Flash<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> Rp2040Flash<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }

    /// Get the raw flash peripheral for low-level access
    pub fn flash(&mut self) -> &mut Flash<'d, FLASH, Blocking, FLASH_SIZE> {
        &mut self.flash
    }
}

impl tofflow_hal::FlashStorage for Rp2040Flash<'_> {
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), FlashError> {
        let range = partition_range(offset, buffer.len())?;
        self.flash
            .blocking_read((CONFIG_PARTITION_START + range.start) as u32, buffer)
            .map_err(|_| FlashError::Flash)
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        let range = partition_range(offset, data.len())?;
        let start = CONFIG_PARTITION_START as u32;
        let end = FLASH_SIZE as u32;

        let mut sector = [0u8; CONFIG_PARTITION_SIZE];
        self.flash
            .blocking_read(start, &mut sector)
            .map_err(|_| FlashError::Flash)?;
        sector[range].copy_from_slice(data);

        self.flash
            .blocking_erase(start, end)
            .map_err(|_| FlashError::Flash)?;
        self.flash
            .blocking_write(start, &sector)
            .map_err(|_| FlashError::Flash)
    }

    fn capacity(&self) -> u32 {
        CONFIG_PARTITION_SIZE as u32
    }
}
