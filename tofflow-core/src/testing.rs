//! Test doubles for the chip and board collaborators

use heapless::Vec;
use tofflow_hal::{Board, FlashError, FlashStorage, Led, SampleClock, Timebase, Timestamp};

use crate::chip::{ConfigRegisters, Field, Fixed, InterruptStatus};
use crate::config::ConfigStore;
use crate::console::{Console, Shell};
use crate::flow::FlowController;
use crate::traits::{ChipVariant, TdcChip, TdcCommand};

/// Register-file backed chip
pub struct MockChip {
    pub variant: ChipVariant,
    pub regs: [u16; 256],
    pub status: InterruptStatus,
    pub commands: Vec<TdcCommand, 64>,
    pub resets: usize,
    pub writes: usize,
    /// Bits that always read back as zero
    pub stuck_low: u16,
}

impl MockChip {
    pub fn new() -> Self {
        Self {
            variant: ChipVariant::Max35104,
            regs: [0; 256],
            status: InterruptStatus::empty(),
            commands: Vec::new(),
            resets: 0,
            writes: 0,
            stuck_low: 0,
        }
    }

    /// Latch status bits for the next status read
    pub fn raise(&mut self, status: InterruptStatus) {
        self.status |= status;
    }

    /// Preload an INT/FRAC result pair
    pub fn set_fixed(&mut self, addr: u8, value: Fixed) {
        self.regs[addr as usize] = value.integer;
        self.regs[addr as usize + 1] = value.fraction;
    }

    pub fn last_command(&self) -> Option<TdcCommand> {
        self.commands.last().copied()
    }

    /// Forget recorded commands and writes
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.writes = 0;
    }
}

impl TdcChip for MockChip {
    fn variant(&self) -> ChipVariant {
        self.variant
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.status = InterruptStatus::POR;
    }

    fn wait_for_reset(&mut self) {
        self.status.remove(InterruptStatus::POR);
    }

    fn command(&mut self, command: TdcCommand) {
        let _ = self.commands.push(command);
    }

    fn read_register(&mut self, addr: u8) -> u16 {
        if addr == crate::chip::reg::INTERRUPT_STATUS {
            let status = self.status;
            self.status = InterruptStatus::empty();
            return status.bits();
        }
        self.regs[addr as usize] & !self.stuck_low
    }

    fn write_register(&mut self, addr: u8, value: u16) {
        self.writes += 1;
        self.regs[addr as usize] = value;
    }
}

/// In-memory board with a manual clock
pub struct MockBoard {
    pub flash: [u8; 256],
    pub flash_writes: usize,
    pub fail_flash: bool,
    pub clock_enabled: bool,
    pub clock_hz: f32,
    pub now: Timestamp,
    pub leds: [bool; 2],
    pub resets: usize,
    pub waited_ms: u32,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            flash: [0xFF; 256],
            flash_writes: 0,
            fail_flash: false,
            clock_enabled: false,
            clock_hz: 0.0,
            now: 0,
            leds: [false; 2],
            resets: 0,
            waited_ms: 0,
        }
    }

    pub fn led(&self, led: Led) -> bool {
        self.leds[led as usize]
    }
}

impl FlashStorage for MockBoard {
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), FlashError> {
        let start = offset as usize;
        let end = start + buffer.len();
        if self.fail_flash {
            return Err(FlashError::Flash);
        }
        if end > self.flash.len() {
            return Err(FlashError::OutOfBounds);
        }
        buffer.copy_from_slice(&self.flash[start..end]);
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        let start = offset as usize;
        let end = start + data.len();
        if self.fail_flash {
            return Err(FlashError::Flash);
        }
        if end > self.flash.len() {
            return Err(FlashError::OutOfBounds);
        }
        self.flash[start..end].copy_from_slice(data);
        self.flash_writes += 1;
        Ok(())
    }

    fn capacity(&self) -> u32 {
        self.flash.len() as u32
    }
}

impl SampleClock for MockBoard {
    fn clock_enable(&mut self, enable: bool) {
        self.clock_enabled = enable;
    }

    fn clock_set(&mut self, hz: f32) -> f32 {
        self.clock_hz = hz;
        hz
    }
}

impl Timebase for MockBoard {
    fn timestamp(&self) -> Timestamp {
        self.now
    }
}

impl Board for MockBoard {
    fn set_led(&mut self, led: Led, on: bool) {
        self.leds[led as usize] = on;
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn wait_ms(&mut self, ms: u32) {
        self.waited_ms += ms;
    }
}

/// Fixed-capacity text sink
pub type Output = heapless::String<8192>;

/// A console wired to mocks, programmed with the transducer defaults
pub struct Harness {
    pub console: Console,
    pub flow: FlowController,
    pub config: ConfigStore,
    pub chip: MockChip,
    pub board: MockBoard,
    pub out: Output,
}

impl Harness {
    pub fn new() -> Self {
        let mut chip = MockChip::new();
        chip.write_config(&ConfigRegisters::transducer_defaults());
        chip.clear_log();
        Self {
            console: Console::new(),
            flow: FlowController::new(),
            config: ConfigStore::new(),
            chip,
            board: MockBoard::new(),
            out: Output::new(),
        }
    }

    /// Run a closure against a shell over the harness state
    pub fn with_shell<R>(&mut self, f: impl FnOnce(&mut Shell<'_>) -> R) -> R {
        let mut shell = Shell {
            session: self.console.session_mut(),
            flow: &mut self.flow,
            config: &mut self.config,
            chip: &mut self.chip,
            board: &mut self.board,
            out: &mut self.out,
        };
        f(&mut shell)
    }

    /// Type characters into the console
    pub fn type_str(&mut self, text: &str) {
        for byte in text.bytes() {
            self.console.handle_byte(
                byte,
                &mut self.flow,
                &mut self.config,
                &mut self.chip,
                &mut self.board,
                &mut self.out,
            );
        }
    }

    /// Current value of a field in the chip's register file
    pub fn chip_field(&self, field: Field) -> u16 {
        field.get(self.chip.regs[field.reg as usize])
    }

    pub fn take_output(&mut self) -> Output {
        core::mem::take(&mut self.out)
    }
}
