//! Flow controller
//!
//! Mode changes requested while a measurement is in flight are latched and
//! committed at the next transition, so a chip transaction is never cut
//! short. All work happens inside [`FlowController::handle_event`].

use tofflow_hal::{Board, Led, Timestamp};

use super::events::FlowEvents;
use super::interleave::{Interleaver, Measurement};
use super::mode::{SamplingMode, SosMethod};
use crate::chip::registers::{
    dpl_khz, field, ConfigRegisters, AFE_BP_DISABLED, BP_BYPASS_DISABLED, DPL_1MHZ, MAX_HITCOUNT,
};
use crate::chip::InterruptStatus;
use crate::traits::{EventTimingMode, TdcChip, TdcCommand};

/// Bandpass calibration settling time
pub const BANDPASS_CALIBRATE_MS: u32 = 3;

/// One completed TOF acquisition
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementResult {
    up: [f32; MAX_HITCOUNT],
    down: [f32; MAX_HITCOUNT],
    hitcount: u8,
    /// Seconds since the previous sample
    pub elapsed: f32,
}

impl MeasurementResult {
    pub fn new(up: &[f32], down: &[f32], elapsed: f32) -> Self {
        let hitcount = up.len().min(down.len()).min(MAX_HITCOUNT);
        let mut result = Self {
            hitcount: hitcount as u8,
            elapsed,
            ..Self::default()
        };
        result.up[..hitcount].copy_from_slice(&up[..hitcount]);
        result.down[..hitcount].copy_from_slice(&down[..hitcount]);
        result
    }

    /// Upstream hit times in seconds
    pub fn up(&self) -> &[f32] {
        &self.up[..self.hitcount as usize]
    }

    /// Downstream hit times in seconds
    pub fn down(&self) -> &[f32] {
        &self.down[..self.hitcount as usize]
    }

    pub fn hitcount(&self) -> u8 {
        self.hitcount
    }
}

/// Thermistor reading from a temperature interrupt
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureSample {
    /// Thermistor resistance in ohms
    pub resistance: f32,
    /// Taken from event timing averages rather than a single shot
    pub averaged: bool,
}

/// What one event produced
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowOutput {
    pub measurement: Option<MeasurementResult>,
    pub temperature: Option<TemperatureSample>,
    /// Raw status handed to the one-shot reporter in idle mode
    pub idle_status: Option<InterruptStatus>,
    /// A channel timed out and the cycle was restarted
    pub timed_out: bool,
}

/// Sampling-mode state machine
#[derive(Debug)]
pub struct FlowController {
    mode: SamplingMode,
    last_mode: SamplingMode,
    requested: Option<SamplingMode>,
    response_pending: bool,
    staged: Option<Measurement>,
    hitcount: u8,
    interleave: Interleaver,
    sampling_hz: f32,
    sos: SosMethod,
    event_timing: EventTimingMode,
    last_sample: Timestamp,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    pub const fn new() -> Self {
        Self {
            mode: SamplingMode::Invalid,
            last_mode: SamplingMode::Invalid,
            requested: None,
            response_pending: false,
            staged: None,
            hitcount: 0,
            interleave: Interleaver::new(0),
            sampling_hz: 0.0,
            sos: SosMethod::Direct,
            event_timing: EventTimingMode::Tof,
            last_sample: 0,
        }
    }

    /// Change mode now, or at the next transition if a response is pending
    pub fn set_sampling_mode(
        &mut self,
        mode: SamplingMode,
        chip: &mut dyn TdcChip,
        board: &mut dyn Board,
    ) {
        if self.response_pending {
            self.requested = Some(mode);
        } else {
            self.mode = mode;
            self.start_next(true, chip, board);
        }
    }

    /// The mode that is or will next be in effect
    pub fn sampling_mode(&self) -> SamplingMode {
        self.requested.unwrap_or(self.mode)
    }

    /// The mode currently driving the chip
    pub fn current_mode(&self) -> SamplingMode {
        self.mode
    }

    pub fn response_pending(&self) -> bool {
        self.response_pending
    }

    /// Program the sample clock; stores the rate the board achieved
    pub fn set_sampling_frequency(&mut self, hz: f32, board: &mut dyn Board) {
        self.sampling_hz = board.clock_set(hz);
    }

    pub fn sampling_frequency(&self) -> f32 {
        self.sampling_hz
    }

    pub fn set_sos_method(&mut self, method: SosMethod) {
        self.sos = method;
    }

    pub fn sos_method(&self) -> SosMethod {
        self.sos
    }

    /// Set the TOF/temperature ratio and restart the interleave window
    pub fn set_tof_temp_ratio(&mut self, ratio: i16) {
        self.interleave.set_ratio(ratio);
    }

    pub fn tof_temp_ratio(&self) -> i16 {
        self.interleave.ratio()
    }

    pub fn interleaver(&self) -> &Interleaver {
        &self.interleave
    }

    pub fn set_event_timing_mode(&mut self, mode: EventTimingMode) {
        self.event_timing = mode;
    }

    pub fn event_timing_mode(&self) -> EventTimingMode {
        self.event_timing
    }

    /// Hits per direction latched when sampling started
    pub fn hitcount(&self) -> u8 {
        self.hitcount
    }

    /// Reset and program the chip, then start sampling
    pub fn init(
        &mut self,
        config: &ConfigRegisters,
        chip: &mut dyn TdcChip,
        board: &mut dyn Board,
    ) {
        chip.reset();
        chip.wait_for_reset();
        chip.write_config(config);

        if chip.variant().has_afe() && Self::needs_bandpass_calibration(config) {
            info!("bandpass calibration");
            chip.command(TdcCommand::BandpassCalibrate);
            board.wait_ms(BANDPASS_CALIBRATE_MS);
        }
        self.start_next(true, chip, board);
    }

    fn needs_bandpass_calibration(config: &ConfigRegisters) -> bool {
        let dpl = config.field(field::DPL);
        config.field(field::AFE_BP) == AFE_BP_DISABLED
            && config.field(field::BP_BYPASS) == BP_BYPASS_DISABLED
            && dpl >= DPL_1MHZ
            && dpl_khz(dpl) >= 1000
    }

    /// Process tick and/or chip interrupt events
    pub fn handle_event(
        &mut self,
        events: FlowEvents,
        chip: &mut dyn TdcChip,
        board: &mut dyn Board,
    ) -> FlowOutput {
        let mut output = FlowOutput::default();

        if events.contains(FlowEvents::TICK) && self.mode == SamplingMode::Host {
            self.start_next(true, chip, board);
        }

        if events.contains(FlowEvents::CHIP_INTERRUPT) {
            let status = chip.interrupt_status();
            self.response_pending = false;
            if Self::timeout_check(status, board) {
                warn!("measurement timeout: {}", status);
                output.timed_out = true;
                self.start_next(false, chip, board);
            } else {
                self.process(status, chip, board, &mut output);
            }
        }

        output
    }

    /// Drive the status LEDs from the timeout bits; true if a channel timed out
    fn timeout_check(status: InterruptStatus, board: &mut dyn Board) -> bool {
        if !status.contains(InterruptStatus::TO) {
            board.set_led(Led::Tof, false);
            board.set_led(Led::Temperature, false);
            return false;
        }
        // transducer possibly disconnected
        let tof = status.contains(InterruptStatus::TOF);
        // temperature sensor possibly disconnected
        let temp = status.contains(InterruptStatus::TE);
        board.set_led(Led::Tof, tof);
        board.set_led(Led::Temperature, temp);
        tof || temp
    }

    fn process(
        &mut self,
        status: InterruptStatus,
        chip: &mut dyn TdcChip,
        board: &mut dyn Board,
        output: &mut FlowOutput,
    ) {
        if self.mode == SamplingMode::Idle {
            output.idle_status = Some(status);
            return;
        }
        if !status.measurement_complete() {
            trace!("no result in {}", status);
            return;
        }

        if status.contains(InterruptStatus::TOF) {
            let tof = chip.read_tof_results().decode();
            let n = self.hitcount as usize;
            let (now, elapsed) = board.elapsed(self.last_sample);
            self.last_sample = now;
            self.start_next(false, chip, board);
            output.measurement = Some(MeasurementResult::new(
                &tof.up.hits[..n],
                &tof.down.hits[..n],
                elapsed,
            ));
        }

        if status.contains(InterruptStatus::TEMP_EVTMG) {
            let temp = chip.read_temp_results().decode();
            self.start_next(false, chip, board);
            let resistance = board.temp_sensor_resistance(temp.averages[0], temp.averages[2]);
            debug!("thermistor {} ohm (averaged)", resistance);
            output.temperature = Some(TemperatureSample {
                resistance,
                averaged: true,
            });
        } else if status.contains(InterruptStatus::TE) {
            let temp = chip.read_temp_results().decode();
            self.start_next(false, chip, board);
            let resistance = board.temp_sensor_resistance(temp.temps[0], temp.temps[2]);
            debug!("thermistor {} ohm", resistance);
            let (now, _) = board.elapsed(self.last_sample);
            self.last_sample = now;
            output.temperature = Some(TemperatureSample {
                resistance,
                averaged: false,
            });
        }
    }

    /// Commit any latched mode and issue the next chip command
    fn start_next(&mut self, is_tick: bool, chip: &mut dyn TdcChip, board: &mut dyn Board) {
        if let Some(mode) = self.requested.take() {
            debug!("sampling mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
        if self.mode != SamplingMode::Host && self.last_mode == SamplingMode::Host {
            board.clock_enable(false);
        }
        if self.last_mode == SamplingMode::Event && self.mode != SamplingMode::Event {
            chip.command(TdcCommand::Halt);
        }

        match self.mode {
            SamplingMode::Max => {
                let next = self.interleave.decide();
                chip.command(next.command());
                self.response_pending = true;
            }
            SamplingMode::Host => {
                if self.last_mode != SamplingMode::Host {
                    board.clock_enable(true);
                }
                if is_tick {
                    let next = self.interleave.decide();
                    let primary = self.interleave.primary();
                    chip.command(primary.command());
                    // the window's secondary follows on the next interrupt
                    self.staged = (next != primary).then_some(next);
                    self.response_pending = true;
                } else if let Some(staged) = self.staged.take() {
                    chip.command(staged.command());
                    self.response_pending = true;
                }
            }
            SamplingMode::Event => {
                if self.last_mode != SamplingMode::Event {
                    chip.command(TdcCommand::EventTiming(self.event_timing));
                }
            }
            SamplingMode::Idle | SamplingMode::Invalid => {}
        }

        if !self.last_mode.is_active() && self.mode.is_active() {
            self.hitcount = chip.hitcount().min(MAX_HITCOUNT as u8);
        }
        self.last_mode = self.mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{reg, Fixed};
    use crate::testing::{MockBoard, MockChip};
    use proptest::prelude::*;

    fn setup() -> (FlowController, MockChip, MockBoard) {
        let mut chip = MockChip::new();
        let mut board = MockBoard::new();
        let mut flow = FlowController::new();
        flow.init(&ConfigRegisters::transducer_defaults(), &mut chip, &mut board);
        chip.clear_log();
        (flow, chip, board)
    }

    fn commands_of(chip: &MockChip, cmd: TdcCommand) -> usize {
        chip.commands.iter().filter(|c| **c == cmd).count()
    }

    #[test]
    fn test_init_programs_chip() {
        let mut chip = MockChip::new();
        let mut board = MockBoard::new();
        let mut flow = FlowController::new();
        let config = ConfigRegisters::transducer_defaults();
        flow.init(&config, &mut chip, &mut board);
        assert_eq!(chip.resets, 1);
        assert_eq!(chip.regs[reg::TOF2 as usize], config.get(reg::TOF2).unwrap());
        // 500 kHz launch: no bandpass calibration
        assert!(chip.commands.is_empty());
        assert_eq!(board.waited_ms, 0);
    }

    #[test]
    fn test_init_bandpass_calibration_at_1mhz() {
        let mut chip = MockChip::new();
        let mut board = MockBoard::new();
        let mut flow = FlowController::new();
        let mut config = ConfigRegisters::transducer_defaults();
        let tof1 = config.get(reg::TOF1).unwrap();
        config.set(reg::TOF1, field::DPL.set(tof1, DPL_1MHZ));
        flow.init(&config, &mut chip, &mut board);
        assert_eq!(chip.last_command(), Some(TdcCommand::BandpassCalibrate));
        assert_eq!(board.waited_ms, 3);

        // not on parts without the AFE
        let mut chip = MockChip::new();
        chip.variant = crate::traits::ChipVariant::Max35103;
        flow.init(&config, &mut chip, &mut board);
        assert!(chip.commands.is_empty());
    }

    #[test]
    fn test_max_mode_interleaves() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_tof_temp_ratio(3);
        flow.set_sampling_mode(SamplingMode::Max, &mut chip, &mut board);
        for _ in 0..5 {
            chip.raise(InterruptStatus::TOF);
            flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        }
        assert_eq!(
            &chip.commands[..6],
            &[
                TdcCommand::TofDiff,
                TdcCommand::TofDiff,
                TdcCommand::Temperature,
                TdcCommand::TofDiff,
                TdcCommand::TofDiff,
                TdcCommand::Temperature,
            ]
        );
    }

    #[test]
    fn test_max_mode_ratio_zero_never_temperature() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_tof_temp_ratio(0);
        flow.set_sampling_mode(SamplingMode::Max, &mut chip, &mut board);
        for _ in 0..8 {
            chip.raise(InterruptStatus::TOF);
            flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        }
        assert_eq!(commands_of(&chip, TdcCommand::Temperature), 0);
        assert_eq!(commands_of(&chip, TdcCommand::TofDiff), 9);
    }

    #[test]
    fn test_host_mode_stages_secondary() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_tof_temp_ratio(2);
        flow.set_sampling_mode(SamplingMode::Host, &mut chip, &mut board);
        assert!(board.clock_enabled);
        assert_eq!(chip.commands[..], [TdcCommand::TofDiff]);

        // second tick closes the window: TOF now, temperature on the interrupt
        chip.raise(InterruptStatus::TOF);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        flow.handle_event(FlowEvents::TICK, &mut chip, &mut board);
        chip.raise(InterruptStatus::TOF);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert_eq!(
            chip.commands[..],
            [TdcCommand::TofDiff, TdcCommand::TofDiff, TdcCommand::Temperature]
        );

        // nothing staged after the temperature completes
        chip.raise(InterruptStatus::TE);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert_eq!(chip.commands.len(), 3);
        assert!(!flow.response_pending());
    }

    #[test]
    fn test_host_mode_negative_ratio() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_tof_temp_ratio(-2);
        flow.set_sampling_mode(SamplingMode::Host, &mut chip, &mut board);
        chip.raise(InterruptStatus::TE);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        flow.handle_event(FlowEvents::TICK, &mut chip, &mut board);
        chip.raise(InterruptStatus::TE);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert_eq!(
            chip.commands[..],
            [TdcCommand::Temperature, TdcCommand::Temperature, TdcCommand::TofDiff]
        );
    }

    /// One host cycle: optional tick, the TOF interrupt, then the staged
    /// temperature's interrupt if one was issued
    fn host_cycle(tick: bool, flow: &mut FlowController, chip: &mut MockChip, board: &mut MockBoard) {
        if tick {
            flow.handle_event(FlowEvents::TICK, chip, board);
        }
        chip.raise(InterruptStatus::TOF);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, chip, board);
        if chip.last_command() == Some(TdcCommand::Temperature) {
            chip.raise(InterruptStatus::TE);
            flow.handle_event(FlowEvents::CHIP_INTERRUPT, chip, board);
        }
    }

    #[test]
    fn test_host_window_runs_tof_every_tick() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_tof_temp_ratio(3);
        // the mode commit is the window's first tick
        flow.set_sampling_mode(SamplingMode::Host, &mut chip, &mut board);
        host_cycle(false, &mut flow, &mut chip, &mut board);
        for _ in 1..3 {
            host_cycle(true, &mut flow, &mut chip, &mut board);
        }
        assert_eq!(
            chip.commands[..],
            [
                TdcCommand::TofDiff,
                TdcCommand::TofDiff,
                TdcCommand::TofDiff,
                TdcCommand::Temperature
            ]
        );

        // the next window repeats on ticks alone
        chip.clear_log();
        for _ in 0..3 {
            host_cycle(true, &mut flow, &mut chip, &mut board);
        }
        assert_eq!(commands_of(&chip, TdcCommand::TofDiff), 3);
        assert_eq!(chip.last_command(), Some(TdcCommand::Temperature));
        assert_eq!(commands_of(&chip, TdcCommand::Temperature), 1);
    }

    #[test]
    fn test_status_without_result_is_ignored() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_tof_temp_ratio(0);
        flow.set_sampling_mode(SamplingMode::Max, &mut chip, &mut board);
        chip.clear_log();
        chip.raise(InterruptStatus::CAL | InterruptStatus::HALT);
        let out = flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert!(out.measurement.is_none());
        assert!(out.temperature.is_none());
        assert!(out.idle_status.is_none());
        assert!(chip.commands.is_empty());
    }

    #[test]
    fn test_tick_ignored_outside_host() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_sampling_mode(SamplingMode::Idle, &mut chip, &mut board);
        flow.handle_event(FlowEvents::TICK, &mut chip, &mut board);
        assert!(chip.commands.is_empty());
    }

    #[test]
    fn test_leaving_host_disables_clock() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_sampling_mode(SamplingMode::Host, &mut chip, &mut board);
        chip.raise(InterruptStatus::TOF);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        flow.set_sampling_mode(SamplingMode::Idle, &mut chip, &mut board);
        assert!(!board.clock_enabled);
    }

    #[test]
    fn test_event_mode_arms_once_and_halts_on_exit() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_event_timing_mode(EventTimingMode::TofTemperature);
        flow.set_sampling_mode(SamplingMode::Event, &mut chip, &mut board);
        assert_eq!(
            chip.last_command(),
            Some(TdcCommand::EventTiming(EventTimingMode::TofTemperature))
        );
        chip.raise(InterruptStatus::TOF_EVTMG);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert_eq!(chip.commands.len(), 1);

        flow.set_sampling_mode(SamplingMode::Idle, &mut chip, &mut board);
        assert_eq!(chip.last_command(), Some(TdcCommand::Halt));
    }

    #[test]
    fn test_pending_mode_is_latched() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_sampling_mode(SamplingMode::Max, &mut chip, &mut board);
        assert!(flow.response_pending());

        flow.set_sampling_mode(SamplingMode::Idle, &mut chip, &mut board);
        assert_eq!(flow.current_mode(), SamplingMode::Max);
        assert_eq!(flow.sampling_mode(), SamplingMode::Idle);

        chip.raise(InterruptStatus::TOF);
        flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert_eq!(flow.current_mode(), SamplingMode::Idle);
        assert!(!flow.response_pending());
    }

    #[test]
    fn test_host_tof_result() {
        let (mut flow, mut chip, mut board) = setup();
        board.now = 1_000_000;
        flow.set_sampling_mode(SamplingMode::Host, &mut chip, &mut board);
        assert_eq!(flow.hitcount(), 3);

        chip.set_fixed(reg::HIT1UPINT, Fixed::new(400, 0));
        chip.set_fixed(reg::HIT1UPINT + 4, Fixed::new(440, 0));
        chip.set_fixed(reg::HIT1DNINT, Fixed::new(396, 0));
        board.now = 1_250_000;
        chip.raise(InterruptStatus::TOF);
        let out = flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);

        let m = out.measurement.unwrap();
        assert_eq!(m.up().len(), 3);
        assert_eq!(m.down().len(), 3);
        assert_eq!(m.up()[0], 100e-6);
        assert_eq!(m.up()[2], 110e-6);
        assert_eq!(m.down()[0], 99e-6);
        assert!((m.elapsed - 1.25).abs() < 1e-6);

        board.now = 1_750_000;
        flow.handle_event(FlowEvents::TICK, &mut chip, &mut board);
        chip.raise(InterruptStatus::TOF);
        let out = flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert!((out.measurement.unwrap().elapsed - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_temperature_interrupt() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_tof_temp_ratio(1);
        flow.set_sampling_mode(SamplingMode::Max, &mut chip, &mut board);
        chip.set_fixed(reg::T1INT, Fixed::new(2000, 0));
        chip.set_fixed(reg::T1INT + 4, Fixed::new(1000, 0));
        chip.raise(InterruptStatus::TE);
        let out = flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        let temp = out.temperature.unwrap();
        assert!((temp.resistance - 2000.0).abs() < 1e-3);
        assert!(!temp.averaged);
        assert!(out.measurement.is_none());
        assert_eq!(chip.commands.len(), 2);
    }

    #[test]
    fn test_timeout_restarts_and_lights_leds() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_tof_temp_ratio(0);
        flow.set_sampling_mode(SamplingMode::Max, &mut chip, &mut board);
        chip.raise(InterruptStatus::TO | InterruptStatus::TOF);
        let out = flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert!(out.timed_out);
        assert!(out.measurement.is_none());
        assert!(board.led(Led::Tof));
        assert!(!board.led(Led::Temperature));
        assert_eq!(chip.commands.len(), 2);

        chip.raise(InterruptStatus::TOF);
        let out = flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert!(!out.timed_out);
        assert!(!board.led(Led::Tof));
    }

    #[test]
    fn test_timeout_without_channel_bits_is_processed() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_sampling_mode(SamplingMode::Idle, &mut chip, &mut board);
        chip.raise(InterruptStatus::TO);
        let out = flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert!(!out.timed_out);
        assert_eq!(out.idle_status, Some(InterruptStatus::TO));
    }

    #[test]
    fn test_idle_routes_status() {
        let (mut flow, mut chip, mut board) = setup();
        flow.set_sampling_mode(SamplingMode::Idle, &mut chip, &mut board);
        chip.raise(InterruptStatus::CAL);
        let out = flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
        assert_eq!(out.idle_status, Some(InterruptStatus::CAL));
        assert!(out.measurement.is_none());
    }

    #[test]
    fn test_sampling_frequency_from_board() {
        let (mut flow, _, mut board) = setup();
        flow.set_sampling_frequency(20.0, &mut board);
        assert_eq!(flow.sampling_frequency(), 20.0);
        assert_eq!(board.clock_hz, 20.0);
    }

    proptest! {
        #[test]
        fn test_max_mode_window(ratio in 1i16..20) {
            let (mut flow, mut chip, mut board) = setup();
            flow.set_tof_temp_ratio(ratio);
            flow.set_sampling_mode(SamplingMode::Max, &mut chip, &mut board);
            for _ in 1..ratio {
                chip.raise(InterruptStatus::TOF);
                flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
            }
            let n = ratio as usize;
            prop_assert_eq!(chip.commands.len(), n);
            prop_assert_eq!(commands_of(&chip, TdcCommand::Temperature), 1);
            prop_assert_eq!(chip.commands[n - 1], TdcCommand::Temperature);
        }

        #[test]
        fn test_max_mode_negative_window(ratio in -20i16..=-1) {
            let (mut flow, mut chip, mut board) = setup();
            flow.set_tof_temp_ratio(ratio);
            flow.set_sampling_mode(SamplingMode::Max, &mut chip, &mut board);
            for _ in 1..ratio.unsigned_abs() {
                chip.raise(InterruptStatus::TE);
                flow.handle_event(FlowEvents::CHIP_INTERRUPT, &mut chip, &mut board);
            }
            let n = ratio.unsigned_abs() as usize;
            prop_assert_eq!(chip.commands.len(), n);
            prop_assert_eq!(commands_of(&chip, TdcCommand::TofDiff), 1);
            prop_assert_eq!(chip.commands[n - 1], TdcCommand::TofDiff);
        }

        #[test]
        fn test_host_mode_window(ratio in 1i16..12) {
            let (mut flow, mut chip, mut board) = setup();
            flow.set_tof_temp_ratio(ratio);
            flow.set_sampling_mode(SamplingMode::Host, &mut chip, &mut board);
            chip.clear_log();
            // finish the window the mode commit opened, then run a whole one
            host_cycle(false, &mut flow, &mut chip, &mut board);
            for _ in 1..ratio {
                host_cycle(true, &mut flow, &mut chip, &mut board);
            }
            chip.clear_log();
            for _ in 0..ratio {
                host_cycle(true, &mut flow, &mut chip, &mut board);
            }
            let n = ratio as usize;
            prop_assert_eq!(commands_of(&chip, TdcCommand::TofDiff), n);
            prop_assert_eq!(commands_of(&chip, TdcCommand::Temperature), 1);
            prop_assert_eq!(chip.last_command(), Some(TdcCommand::Temperature));
        }
    }
}
