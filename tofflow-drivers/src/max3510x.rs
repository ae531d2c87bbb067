//! MAX3510x time-to-digital converter (SPI)
//!
//! Every transaction starts with a one-byte opcode. Commands are the bare
//! opcode; register writes send the register address followed by the
//! value big-endian; register reads send the address with bit 7 set and
//! clock out 16-bit words. Result registers already live above 0x80 and
//! are addressed by their read opcode. Reads auto-increment, so result
//! blocks come back in one burst.
//!
//! # Errors
//!
//! [`TdcChip`] access is infallible. A failed transfer is counted, logged
//! and otherwise ignored; reads that failed return zero.

use embedded_hal::spi::{Operation, SpiDevice};
use tofflow_core::chip::InterruptStatus;
use tofflow_core::traits::{ChipVariant, EventTimingMode, TdcChip, TdcCommand};

/// Command opcodes
pub mod opcode {
    pub const TOF_UP: u8 = 0x00;
    pub const TOF_DOWN: u8 = 0x01;
    pub const TOF_DIFF: u8 = 0x02;
    pub const TEMPERATURE: u8 = 0x03;
    pub const RESET: u8 = 0x04;
    pub const INITIALIZE: u8 = 0x05;
    /// Event timing: TOF_DIFF sequence
    pub const EVTMG1: u8 = 0x07;
    /// Event timing: temperature sequence
    pub const EVTMG2: u8 = 0x08;
    /// Event timing: both
    pub const EVTMG3: u8 = 0x09;
    pub const HALT: u8 = 0x0A;
    pub const CALIBRATE: u8 = 0x0E;
    pub const BPCAL: u8 = 0x0F;

    /// Set on a register address to read it
    pub const READ: u8 = 0x80;
}

/// Status polls before giving up on the power-on-reset flag
const RESET_POLLS: u32 = 10_000;

/// Words per burst read
const BURST_WORDS: usize = 16;

/// Opcode for a chip command
pub const fn command_opcode(command: TdcCommand) -> u8 {
    match command {
        TdcCommand::TofUp => opcode::TOF_UP,
        TdcCommand::TofDown => opcode::TOF_DOWN,
        TdcCommand::TofDiff => opcode::TOF_DIFF,
        TdcCommand::Temperature => opcode::TEMPERATURE,
        TdcCommand::Calibrate => opcode::CALIBRATE,
        TdcCommand::BandpassCalibrate => opcode::BPCAL,
        TdcCommand::Halt => opcode::HALT,
        TdcCommand::Initialize => opcode::INITIALIZE,
        TdcCommand::EventTiming(EventTimingMode::Tof) => opcode::EVTMG1,
        TdcCommand::EventTiming(EventTimingMode::Temperature) => opcode::EVTMG2,
        TdcCommand::EventTiming(EventTimingMode::TofTemperature) => opcode::EVTMG3,
    }
}

/// MAX3510x on an SPI device
///
/// The device owns chip select; the chip wants SPI mode 1.
pub struct Max3510x<SPI> {
    spi: SPI,
    variant: ChipVariant,
    bus_errors: u32,
}

impl<SPI: SpiDevice> Max3510x<SPI> {
    pub fn new(spi: SPI, variant: ChipVariant) -> Self {
        Self {
            spi,
            variant,
            bus_errors: 0,
        }
    }

    /// Failed transfers since construction
    pub fn bus_errors(&self) -> u32 {
        self.bus_errors
    }

    /// Give back the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }

    fn transact(&mut self, operations: &mut [Operation<'_, u8>]) -> bool {
        match self.spi.transaction(operations) {
            Ok(()) => true,
            Err(_e) => {
                self.bus_errors = self.bus_errors.wrapping_add(1);
                #[cfg(feature = "defmt")]
                defmt::warn!("max3510x: spi error ({} total)", self.bus_errors);
                false
            }
        }
    }
}

impl<SPI: SpiDevice> TdcChip for Max3510x<SPI> {
    fn variant(&self) -> ChipVariant {
        self.variant
    }

    fn reset(&mut self) {
        self.transact(&mut [Operation::Write(&[opcode::RESET])]);
    }

    fn wait_for_reset(&mut self) {
        for _ in 0..RESET_POLLS {
            if self.interrupt_status().contains(InterruptStatus::POR) {
                return;
            }
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("max3510x: no power-on reset flag");
    }

    fn command(&mut self, command: TdcCommand) {
        self.transact(&mut [Operation::Write(&[command_opcode(command)])]);
    }

    fn read_register(&mut self, addr: u8) -> u16 {
        let mut word = [0u8; 2];
        if !self.transact(&mut [
            Operation::Write(&[opcode::READ | addr]),
            Operation::Read(&mut word),
        ]) {
            return 0;
        }
        u16::from_be_bytes(word)
    }

    fn write_register(&mut self, addr: u8, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.transact(&mut [Operation::Write(&[addr, hi, lo])]);
    }

    fn read_registers(&mut self, addr: u8, buf: &mut [u16]) {
        let mut addr = addr;
        for chunk in buf.chunks_mut(BURST_WORDS) {
            let mut bytes = [0u8; BURST_WORDS * 2];
            let bytes = &mut bytes[..chunk.len() * 2];
            if !self.transact(&mut [
                Operation::Write(&[opcode::READ | addr]),
                Operation::Read(&mut *bytes),
            ]) {
                bytes.fill(0);
            }
            for (word, pair) in chunk.iter_mut().zip(bytes.chunks_exact(2)) {
                *word = u16::from_be_bytes([pair[0], pair[1]]);
            }
            addr = addr.wrapping_add(chunk.len() as u8);
        }
    }
}
