//! Result reporting
//!
//! Two paths: the measurement stream started by `report`, and one-shot
//! decodes of whatever the last console-issued chip command produced.

use core::fmt;

use tofflow_hal::Board;

use super::{Console, LastCommand};
use crate::chip::{calibration_factor, input_frequency, InterruptStatus, TofDirection, MAX_HITCOUNT};
use crate::flow::MeasurementResult;
use crate::traits::{EventTimingMode, TdcChip};

impl LastCommand {
    /// Status bits that carry this command's result
    fn result_bits(self) -> InterruptStatus {
        match self {
            LastCommand::None => InterruptStatus::empty(),
            LastCommand::TofUp | LastCommand::TofDown | LastCommand::TofDiff => InterruptStatus::TOF,
            LastCommand::Temperature => InterruptStatus::TE,
            LastCommand::Calibrate => InterruptStatus::CAL,
            LastCommand::Event(mode) => event_bits(mode),
        }
    }
}

fn event_bits(mode: EventTimingMode) -> InterruptStatus {
    match mode {
        EventTimingMode::Tof => InterruptStatus::TOF_EVTMG,
        EventTimingMode::Temperature => InterruptStatus::TEMP_EVTMG,
        EventTimingMode::TofTemperature => InterruptStatus::TOF_EVTMG | InterruptStatus::TEMP_EVTMG,
    }
}

impl Console {
    /// Stream one measurement as `y,<up...>,<down...>,<seconds>`
    pub fn report_results(&mut self, result: &MeasurementResult, out: &mut dyn fmt::Write) {
        if !self.session.reporting {
            return;
        }
        self.session.report_time += result.elapsed;
        emit!(out, "y");
        for value in result.up().iter().chain(result.down()) {
            emit!(out, ",{:e}", value);
        }
        emit!(out, ",{:e}\r\n", self.session.report_time);
    }

    /// Decode the result of the last one-shot command
    ///
    /// Prints nothing while a line is being typed or when the status does
    /// not carry the expected result.
    pub fn report_status(
        &mut self,
        status: InterruptStatus,
        chip: &mut dyn TdcChip,
        board: &dyn Board,
        out: &mut dyn fmt::Write,
    ) {
        let last = self.session.last_command;
        if self.session.typing || !status.intersects(last.result_bits()) {
            return;
        }

        emit!(out, "\x1b[2K\r");
        match last {
            LastCommand::None => {}
            LastCommand::TofUp | LastCommand::TofDown => {
                let tof = chip.read_tof_results().decode();
                let (hits, waves) = hit_layout(chip);
                let dir = if last == LastCommand::TofUp { &tof.up } else { &tof.down };
                dump_direction(dir, &waves[..hits], out);
            }
            LastCommand::TofDiff => {
                let tof = chip.read_tof_results().decode();
                let (hits, waves) = hit_layout(chip);
                dump_direction(&tof.up, &waves[..hits], out);
                emit!(out, "\r\n");
                dump_direction(&tof.down, &waves[..hits], out);
                emit!(out, "diff = {:e}\r\n", tof.tof_diff);
            }
            LastCommand::Temperature => {
                let temp = chip.read_temp_results().decode();
                dump_temperature(temp.temps[0], temp.temps[2], out);
            }
            LastCommand::Event(mode) => {
                let ready = status & event_bits(mode);
                if ready.contains(InterruptStatus::TOF_EVTMG) {
                    self.dump_tof_event(chip, board, out);
                }
                if ready.contains(InterruptStatus::TEMP_EVTMG) {
                    let temp = chip.read_temp_results().decode();
                    dump_temperature(temp.averages[0], temp.averages[2], out);
                    emit!(out, "count = {}\r\n", temp.cycle_count);
                }
            }
            LastCommand::Calibrate => {
                let hz = input_frequency(chip.read_calibration());
                emit!(out, "4MX = {}, factor = {:e}", hz, calibration_factor(hz));
            }
        }
        emit!(out, "\r\n> ");
    }

    fn dump_tof_event(&mut self, chip: &mut dyn TdcChip, board: &dyn Board, out: &mut dyn fmt::Write) {
        let tof = chip.read_tof_results().decode();
        if self.session.first_event {
            self.session.first_event = false;
            self.session.last_report = board.timestamp();
        } else {
            let (now, period) = board.elapsed(self.session.last_report);
            self.session.last_report = now;
            emit!(out, "period = {:.2}\r\n", period);
        }
        emit!(out, "tof diff = {:e}\r\n", tof.tof_diff);
        emit!(out, "range = {}\r\n", tof.range);
        emit!(out, "count = {}\r\n", tof.cycle_count);
    }
}

/// Hits captured per direction and the wave each was taken on
fn hit_layout(chip: &mut dyn TdcChip) -> (usize, [u8; MAX_HITCOUNT]) {
    let hits = (chip.hitcount() as usize).min(MAX_HITCOUNT);
    (hits, chip.hitwaves())
}

fn dump_direction(dir: &TofDirection, waves: &[u8], out: &mut dyn fmt::Write) {
    emit!(out, "t2/ideal = {:.6}\r\n", dir.t2_ideal);
    emit!(out, "t1/t2 = {:.6}\r\n", dir.t1_t2);
    for (i, hit) in dir.hits[..waves.len()].iter().enumerate() {
        emit!(out, "hit{} = {:e}\r\n", i + 1, hit);
    }
    emit!(out, "mean = {:e}\r\n", dir.average);
    if let Some(hz) = rx_frequency(&dir.hits[..waves.len()], waves) {
        emit!(out, "average rx frequency = {:.0}\r\n", hz);
    }
}

/// Receive frequency from the spacing of consecutive hits
///
/// Each hit pair contributes its time difference divided by the number of
/// waves between them; the mean period is inverted.
fn rx_frequency(hits: &[f32], waves: &[u8]) -> Option<f32> {
    if hits.len() < 2 {
        return None;
    }
    let mut period = 0.0;
    for i in 1..hits.len() {
        let span = waves[i] as f32 - waves[i - 1] as f32;
        if span <= 0.0 {
            return None;
        }
        period += (hits[i] - hits[i - 1]) / span;
    }
    period /= (hits.len() - 1) as f32;
    if period <= 0.0 {
        return None;
    }
    Some(1.0 / period)
}

fn dump_temperature(r1: f32, r2: f32, out: &mut dyn fmt::Write) {
    emit!(out, "r1 = {:e}, r2 = {:e}, ratio = {:.3}\r\n", r1, r2, r1 / r2);
}
