//! Commands with custom parsing, snapping or side effects

use super::{commands, parse, ArgError, LastCommand, Shell};
use crate::chip::registers::{
    cal_period_code, cal_period_us, dly_code, dly_us, dpl_khz, pga_code, pga_db, round_to_u16,
    st_code, st_us, tdf_s, tmf_s, DLY_MIN, DPL_125KHZ, DPL_1MHZ, HITWV_MAX, HITWV_MIN, PGA_DB_MAX,
    PGA_DB_MIN, VS_TARGETS,
};
use crate::chip::{field, reg, MAX_HITCOUNT};
use crate::flow::controller::BANDPASS_CALIBRATE_MS;
use crate::flow::SamplingMode;
use crate::traits::{EventTimingMode, TdcCommand};

pub(super) const MODE_TAGS: &[(&str, u16)] = &[
    ("idle", SamplingMode::Idle as u16),
    ("event", SamplingMode::Event as u16),
    ("host", SamplingMode::Host as u16),
    ("max", SamplingMode::Max as u16),
];

pub(super) const EVENT_TAGS: &[(&str, u16)] = &[
    ("tof", EventTimingMode::Tof as u16),
    ("temp", EventTimingMode::Temperature as u16),
    ("both", EventTimingMode::TofTemperature as u16),
];

// Switcher

pub fn vs_get(sh: &mut Shell<'_>) {
    let code = sh.chip.read_field(field::VS);
    match VS_TARGETS.iter().find(|(_, _, c)| *c == code) {
        Some((_, vp, _)) => emit!(sh.out, "{:.2}V ({})\r\n", vp, code),
        None => emit!(sh.out, "invalid ({})\r\n", code),
    }
}

/// Pick the highest regulator target at or below the requested voltage
pub fn vs_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let volts = parse::float(arg)?;
    if volts > VS_TARGETS[0].0 {
        return Err(ArgError::OutOfRange);
    }
    let (vpr, vp, code) = VS_TARGETS
        .iter()
        .copied()
        .find(|(vpr, _, _)| volts >= *vpr)
        .ok_or(ArgError::OutOfRange)?;
    sh.chip.write_field(field::VS, code);
    emit!(sh.out, "vp = {:.6}, vpr = {:.6}\r\n", vp, vpr);
    Ok(())
}

pub fn st_get(sh: &mut Shell<'_>) {
    let code = sh.chip.read_field(field::ST);
    emit!(sh.out, "{}us ({})\r\n", st_us(code), code);
}

/// Stabilization time, clamped and rounded up to the next power-of-two step
pub fn st_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let code = st_code(parse::unsigned(arg)?);
    sh.chip.write_field(field::ST, code);
    emit!(sh.out, "st = {}us\r\n", st_us(code));
    Ok(())
}

// AFE

pub fn pga_get(sh: &mut Shell<'_>) {
    let code = sh.chip.read_field(field::PGA);
    emit!(sh.out, "{:.2}dB ({})\r\n", pga_db(code), code);
}

pub fn pga_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let db = parse::float(arg)?;
    if !(PGA_DB_MIN..=PGA_DB_MAX).contains(&db) {
        return Err(ArgError::OutOfRange);
    }
    let code = pga_code(db);
    sh.chip.write_field(field::PGA, code);
    emit!(sh.out, "pga = {:.2}dB ({})\r\n", pga_db(code), code);
    Ok(())
}

// TOF

pub fn dpl_get(sh: &mut Shell<'_>) {
    let code = sh.chip.read_field(field::DPL);
    if code < DPL_1MHZ {
        emit!(sh.out, "invalid ({})\r\n", code);
    } else {
        emit!(sh.out, "{}kHz ({})\r\n", dpl_khz(code), code);
    }
}

/// Launch frequency, snapped to the nearest divider
pub fn dpl_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let khz = parse::bounded(arg, dpl_khz(DPL_125KHZ), dpl_khz(DPL_1MHZ))?;
    let code = (DPL_1MHZ..=DPL_125KHZ)
        .min_by_key(|code| dpl_khz(*code).abs_diff(khz))
        .ok_or(ArgError::OutOfRange)?;
    sh.chip.write_field(field::DPL, code);
    emit!(sh.out, "dpl = {}kHz ({})\r\n", dpl_khz(code), code);
    Ok(())
}

pub fn hitwv_get(sh: &mut Shell<'_>) {
    let w = sh.chip.hitwaves();
    emit!(
        sh.out,
        "{}, {}, {}, {}, {}, {}\r\n",
        w[0],
        w[1],
        w[2],
        w[3],
        w[4],
        w[5]
    );
}

/// Comma list of strictly increasing wave numbers after the t2 wave
///
/// Unlisted hits continue one wave apart from the last listed value.
pub fn hitwv_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let t2wv = sh.chip.read_field(field::T2WV) as u8;
    let mut waves = [0u8; MAX_HITCOUNT];
    let mut count = 0;

    for item in arg.split(',') {
        if count == MAX_HITCOUNT {
            return Err(ArgError::Malformed);
        }
        let wave = parse::bounded(item, HITWV_MIN as u32, HITWV_MAX as u32)? as u8;
        let floor = if count == 0 { t2wv } else { waves[count - 1] };
        if wave <= floor {
            return Err(ArgError::NotIncreasing);
        }
        waves[count] = wave;
        count += 1;
    }
    for i in count..MAX_HITCOUNT {
        let wave = waves[i - 1] + 1;
        if wave > HITWV_MAX {
            return Err(ArgError::OutOfRange);
        }
        waves[i] = wave;
    }

    sh.chip.set_hitwaves(&waves);
    Ok(())
}

// Event timing

pub fn tdf_get(sh: &mut Shell<'_>) {
    let code = sh.chip.read_field(field::TDF);
    emit!(sh.out, "{:.2}s ({})\r\n", tdf_s(code), code);
}

/// TOF difference period in half-second steps
pub fn tdf_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let seconds = parse::float(arg)?;
    let code = nearest_step(seconds * 2.0 - 1.0, field::TDF.max())?;
    sh.chip.write_field(field::TDF, code);
    tdf_get(sh);
    Ok(())
}

pub fn tmf_get(sh: &mut Shell<'_>) {
    let code = sh.chip.read_field(field::TMF);
    emit!(sh.out, "{}s ({})\r\n", tmf_s(code), code);
}

/// Temperature period in one-second steps
pub fn tmf_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let seconds = parse::float(arg)?;
    let code = nearest_step(seconds - 1.0, field::TMF.max())?;
    sh.chip.write_field(field::TMF, code);
    emit!(sh.out, "tmf = {}s ({})\r\n", tmf_s(code), code);
    Ok(())
}

/// Round a step count, rejecting values outside `0..=max`
fn nearest_step(steps: f32, max: u16) -> Result<u16, ArgError> {
    if steps < -0.5 {
        return Err(ArgError::OutOfRange);
    }
    let code = round_to_u16(steps);
    if code > max {
        return Err(ArgError::OutOfRange);
    }
    Ok(code)
}

pub fn dly_get(sh: &mut Shell<'_>) {
    let code = sh.chip.read_field(field::DLY);
    emit!(sh.out, "{:.2}us ({})\r\n", dly_us(code), code);
}

/// Measurement delay in quarter-microsecond steps
pub fn dly_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let us = parse::float(arg)?;
    if us < dly_us(DLY_MIN) || us > dly_us(u16::MAX) {
        return Err(ArgError::OutOfRange);
    }
    sh.chip.write_field(field::DLY, dly_code(us));
    dly_get(sh);
    Ok(())
}

pub fn cal_period_get(sh: &mut Shell<'_>) {
    let code = sh.chip.read_field(field::CAL_PERIOD);
    emit!(sh.out, "{:.2}us ({})\r\n", cal_period_us(code), code);
}

/// Calibration period in 32 kHz cycles
pub fn cal_period_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let us = parse::float(arg)?;
    if us < cal_period_us(0) || us > cal_period_us(field::CAL_PERIOD.max()) {
        return Err(ArgError::OutOfRange);
    }
    sh.chip.write_field(field::CAL_PERIOD, cal_period_code(us));
    cal_period_get(sh);
    Ok(())
}

// Persistence

pub fn save(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    sh.chip.read_config(sh.config.registers_mut());
    if sh.config.save(sh.flow, sh.board).is_err() {
        emit!(sh.out, "save failed\r\n");
    }
    Ok(())
}

pub fn restore_defaults(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    if sh.config.reset_to_defaults(sh.flow, sh.chip, sh.board).is_err() {
        emit!(sh.out, "save failed\r\n");
    }
    sh.flow.init(sh.config.registers(), sh.chip, sh.board);
    Ok(())
}

// Chip commands

pub fn event(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let code = parse::tag(arg, EVENT_TAGS)?;
    let mode = EventTimingMode::from_u8(code as u8).ok_or(ArgError::UnknownTag)?;
    sh.session.last_command = LastCommand::Event(mode);
    sh.session.first_event = true;
    sh.chip.command(TdcCommand::EventTiming(mode));
    Ok(())
}

fn one_shot(sh: &mut Shell<'_>, last: LastCommand, command: TdcCommand) {
    sh.session.last_command = last;
    sh.chip.command(command);
}

pub fn tof_up(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    one_shot(sh, LastCommand::TofUp, TdcCommand::TofUp);
    Ok(())
}

pub fn tof_down(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    one_shot(sh, LastCommand::TofDown, TdcCommand::TofDown);
    Ok(())
}

pub fn tof_diff(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    one_shot(sh, LastCommand::TofDiff, TdcCommand::TofDiff);
    Ok(())
}

pub fn temperature(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    one_shot(sh, LastCommand::Temperature, TdcCommand::Temperature);
    Ok(())
}

pub fn calibrate(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    one_shot(sh, LastCommand::Calibrate, TdcCommand::Calibrate);
    Ok(())
}

pub fn reset(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    sh.board.reset();
    Ok(())
}

pub fn initialize(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    sh.chip.initialize();
    Ok(())
}

pub fn bandpass_calibrate(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    sh.chip.command(TdcCommand::BandpassCalibrate);
    sh.board.wait_ms(BANDPASS_CALIBRATE_MS);
    Ok(())
}

pub fn halt(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    sh.chip.command(TdcCommand::Halt);
    Ok(())
}

pub fn dump(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    commands::dump(sh);
    Ok(())
}

pub fn help(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    commands::help(sh);
    Ok(())
}

/// Walk every non-zero pattern through a scratch register
pub fn spi_test(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    let saved = sh.chip.read_register(reg::TOF_MEASUREMENT_DELAY);
    let mut failure = None;
    for pattern in (1..=u16::MAX).rev() {
        sh.chip.write_register(reg::TOF_MEASUREMENT_DELAY, pattern);
        let read = sh.chip.read_register(reg::TOF_MEASUREMENT_DELAY);
        if read != pattern {
            failure = Some((pattern, read));
            break;
        }
    }
    sh.chip.write_register(reg::TOF_MEASUREMENT_DELAY, saved);

    match failure {
        Some((write, read)) => {
            warn!("spi test failed: wrote {=u16:#x}, read {=u16:#x}", write, read);
            emit!(sh.out, "test failed:  write={:04X}, read={:04X}\r\n", write, read);
        }
        None => emit!(sh.out, "test passed\r\n"),
    }
    Ok(())
}

// Flow controller

pub fn mode_get(sh: &mut Shell<'_>) {
    emit!(sh.out, "{}\r\n", sh.flow.sampling_mode().tag());
}

pub fn mode_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let code = parse::tag(arg, MODE_TAGS)?;
    let mode = SamplingMode::from_u8(code as u8).ok_or(ArgError::UnknownTag)?;
    sh.session.report_time = 0.0;
    sh.flow.set_sampling_mode(mode, sh.chip, sh.board);
    Ok(())
}

pub fn tof_temp_get(sh: &mut Shell<'_>) {
    emit!(sh.out, "{}\r\n", sh.flow.tof_temp_ratio());
}

pub fn tof_temp_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let ratio = i16::try_from(parse::signed(arg)?).map_err(|_| ArgError::OutOfRange)?;
    sh.flow.set_tof_temp_ratio(ratio);
    tof_temp_get(sh);
    Ok(())
}

pub fn sampling_get(sh: &mut Shell<'_>) {
    emit!(sh.out, "{:.2}\r\n", sh.flow.sampling_frequency());
}

pub fn sampling_set(sh: &mut Shell<'_>, arg: &str) -> Result<(), ArgError> {
    let hz = parse::float(arg)?;
    if hz <= 0.0 {
        return Err(ArgError::OutOfRange);
    }
    sh.flow.set_sampling_frequency(hz, sh.board);
    sampling_get(sh);
    Ok(())
}

/// Stream every measurement until the next key press
pub fn report(sh: &mut Shell<'_>, _arg: &str) -> Result<(), ArgError> {
    sh.session.report_time = 0.0;
    sh.session.reporting = true;
    Ok(())
}
