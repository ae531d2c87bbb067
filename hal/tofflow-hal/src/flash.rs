//! Flash storage abstractions
//!
//! The configuration record lives at a fixed offset inside a board-owned
//! flash region. Implementations map offsets onto their own partition and
//! take care of erasing before programming.

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Access falls outside the storage region
    OutOfBounds,
    /// Offset or length violates the device's write granularity
    Unaligned,
}

/// Flash storage trait
///
/// Offsets are relative to the start of the region reserved for the
/// instrument. Both operations are blocking; the measurement loop is
/// single-threaded and saves are rare.
pub trait FlashStorage {
    /// Read `buffer.len()` bytes starting at `offset`
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), FlashError>;

    /// Replace the bytes starting at `offset` with `data`
    ///
    /// Implementations erase whatever sectors they need first.
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError>;

    /// Size of the storage region in bytes
    fn capacity(&self) -> u32;
}
