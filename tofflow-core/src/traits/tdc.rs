//! Time-to-digital converter contract

use crate::chip::registers::{
    field, reg, stop_hits, ConfigRegisters, Field, MAX_HITCOUNT, TEMP_RESULT_REGISTERS,
    TOF_RESULT_REGISTERS,
};
use crate::chip::results::{Fixed, RawTempResults, RawTofResults};
use crate::chip::status::InterruptStatus;

/// Members of the MAX3510x family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipVariant {
    Max35101,
    Max35102,
    Max35103,
    /// Adds the boost switcher and analog front end
    Max35104,
}

impl ChipVariant {
    /// Whether the part carries the switcher/AFE register set
    pub const fn has_afe(self) -> bool {
        matches!(self, ChipVariant::Max35104)
    }
}

/// Autonomous measurement sequence armed by event timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum EventTimingMode {
    /// Repeated TOF_DIFF measurements
    #[default]
    Tof = 0,
    /// Repeated temperature measurements
    Temperature = 1,
    /// Both, interleaved by the chip
    TofTemperature = 2,
}

impl EventTimingMode {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Tof),
            1 => Some(Self::Temperature),
            2 => Some(Self::TofTemperature),
            _ => None,
        }
    }

    /// Console tag
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Tof => "tof",
            Self::Temperature => "temp",
            Self::TofTemperature => "both",
        }
    }
}

/// Chip commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TdcCommand {
    /// Single upstream TOF
    TofUp,
    /// Single downstream TOF
    TofDown,
    /// Upstream then downstream TOF with difference
    TofDiff,
    /// Single temperature measurement over all ports
    Temperature,
    /// Measure the 4 MHz reference against the 32 kHz crystal
    Calibrate,
    /// Tune the AFE bandpass filter to the launch frequency
    BandpassCalibrate,
    /// Stop any event timing sequence
    Halt,
    /// Load the configuration registers into the measurement engine
    Initialize,
    /// Arm an event timing sequence
    EventTiming(EventTimingMode),
}

/// MAX3510x time-to-digital converter
///
/// Register access is infallible at this level; the driver owns bus error
/// accounting. The trait is object safe so console commands can be plain
/// function pointers over `&mut dyn TdcChip`.
pub trait TdcChip {
    /// Which family member is fitted
    fn variant(&self) -> ChipVariant;

    /// Issue a software reset
    fn reset(&mut self);

    /// Block until the chip reports power-on reset complete
    fn wait_for_reset(&mut self);

    /// Issue a command opcode
    fn command(&mut self, command: TdcCommand);

    /// Read one register
    fn read_register(&mut self, addr: u8) -> u16;

    /// Write one register
    fn write_register(&mut self, addr: u8, value: u16);

    /// Read consecutive registers starting at `addr`
    ///
    /// Drivers with burst reads should override this.
    fn read_registers(&mut self, addr: u8, buf: &mut [u16]) {
        for (i, word) in buf.iter_mut().enumerate() {
            *word = self.read_register(addr.wrapping_add(i as u8));
        }
    }

    /// Initialize the measurement engine from the loaded configuration
    fn initialize(&mut self) {
        self.command(TdcCommand::Initialize);
    }

    /// Read and clear the interrupt status
    fn interrupt_status(&mut self) -> InterruptStatus {
        InterruptStatus::from_raw(self.read_register(reg::INTERRUPT_STATUS))
    }

    /// Program every configuration register from an image
    fn write_config(&mut self, config: &ConfigRegisters) {
        for (addr, value) in config.iter() {
            self.write_register(addr, value);
        }
    }

    /// Read every configuration register into an image
    fn read_config(&mut self, config: &mut ConfigRegisters) {
        let mut values = *config.values();
        for (value, (addr, _)) in values.iter_mut().zip(config.iter()) {
            *value = self.read_register(addr);
        }
        *config = ConfigRegisters::from_values(values);
    }

    /// Read one bitfield
    fn read_field(&mut self, field: Field) -> u16 {
        field.get(self.read_register(field.reg))
    }

    /// Read-modify-write one bitfield
    fn write_field(&mut self, field: Field, value: u16) {
        let raw = self.read_register(field.reg);
        self.write_register(field.reg, field.set(raw, value));
    }

    /// Read an INT/FRAC register pair
    fn read_fixed(&mut self, addr: u8) -> Fixed {
        let mut words = [0u16; 2];
        self.read_registers(addr, &mut words);
        Fixed::new(words[0], words[1])
    }

    /// Read the TOF result block
    fn read_tof_results(&mut self) -> RawTofResults {
        let mut words = [0u16; TOF_RESULT_REGISTERS];
        self.read_registers(reg::WVRUP, &mut words);
        RawTofResults::from_registers(&words)
    }

    /// Read the temperature result block
    fn read_temp_results(&mut self) -> RawTempResults {
        let mut words = [0u16; TEMP_RESULT_REGISTERS];
        self.read_registers(reg::T1INT, &mut words);
        RawTempResults::from_registers(&words)
    }

    /// Read the last calibration result
    fn read_calibration(&mut self) -> Fixed {
        self.read_fixed(reg::CALIBRATIONINT)
    }

    /// Wave numbers selected for each hit
    fn hitwaves(&mut self) -> [u8; MAX_HITCOUNT] {
        let mut waves = [0u8; MAX_HITCOUNT];
        for (wave, field) in waves.iter_mut().zip(field::HITWV.iter()) {
            *wave = self.read_field(*field) as u8;
        }
        waves
    }

    /// Select the wave number for each hit
    fn set_hitwaves(&mut self, waves: &[u8; MAX_HITCOUNT]) {
        for (wave, field) in waves.iter().zip(field::HITWV.iter()) {
            self.write_field(*field, *wave as u16);
        }
    }

    /// Hits captured per direction
    fn hitcount(&mut self) -> u8 {
        stop_hits(self.read_field(field::STOP))
    }
}
