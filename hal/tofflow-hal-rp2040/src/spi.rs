//! SPI device with a GPIO chip select
//!
//! Wraps any blocking `SpiBus` (the RP2040 SPI peripheral in blocking
//! mode) and a chip-select output into an `embedded_hal::spi::SpiDevice`.
//! The bus is owned outright; the TDC is the only device on it.

use embassy_time::{block_for, Duration};
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{self, ErrorKind, ErrorType, Operation, SpiBus, SpiDevice};

/// Errors from a chip-selected transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<B> {
    /// The bus reported an error
    Bus(B),
    /// Driving chip select failed
    ChipSelect,
}

impl<B: spi::Error> spi::Error for DeviceError<B> {
    fn kind(&self) -> ErrorKind {
        match self {
            DeviceError::Bus(e) => e.kind(),
            DeviceError::ChipSelect => ErrorKind::ChipSelectFault,
        }
    }
}

/// Exclusive bus plus active-low chip select
pub struct CsDevice<BUS, CS> {
    bus: BUS,
    cs: CS,
}

impl<BUS: SpiBus, CS: OutputPin> CsDevice<BUS, CS> {
    /// Take the bus and deassert chip select
    pub fn new(bus: BUS, mut cs: CS) -> Result<Self, DeviceError<BUS::Error>> {
        cs.set_high().map_err(|_| DeviceError::ChipSelect)?;
        Ok(Self { bus, cs })
    }

    fn run(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BUS::Error> {
        for op in operations {
            match op {
                Operation::Read(buf) => self.bus.read(buf)?,
                Operation::Write(buf) => self.bus.write(buf)?,
                Operation::Transfer(read, write) => self.bus.transfer(read, write)?,
                Operation::TransferInPlace(buf) => self.bus.transfer_in_place(buf)?,
                Operation::DelayNs(ns) => {
                    self.bus.flush()?;
                    block_for(Duration::from_nanos(u64::from(*ns)));
                }
            }
        }
        self.bus.flush()
    }
}

impl<BUS: SpiBus, CS: OutputPin> ErrorType for CsDevice<BUS, CS> {
    type Error = DeviceError<BUS::Error>;
}

impl<BUS: SpiBus, CS: OutputPin> SpiDevice for CsDevice<BUS, CS> {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(|_| DeviceError::ChipSelect)?;
        let result = self.run(operations);
        // release chip select even if the bus failed
        let deselect = self.cs.set_high();
        result.map_err(DeviceError::Bus)?;
        deselect.map_err(|_| DeviceError::ChipSelect)
    }
}
