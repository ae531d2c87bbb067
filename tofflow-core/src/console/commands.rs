//! Console command table

use super::actions as act;
use super::fields::{CountStyle, FieldCommand};
use super::{ArgError, Shell};
use crate::chip::registers::{F0_MAX, PL_MAX, PRECYC_MAX, STOP_MAX, STOP_MIN, T2WV_MAX, T2WV_MIN};
use crate::chip::{field, Field};

/// Prints the current value
pub type Getter = fn(&mut Shell<'_>);

/// Validates and applies an argument
pub type Setter = fn(&mut Shell<'_>, &str) -> Result<(), ArgError>;

/// What a command can do
#[derive(Clone, Copy)]
pub enum Access {
    Field(FieldCommand),
    Custom {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

/// One named console command
#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub help: &'static str,
    pub access: Access,
}

impl Command {
    const fn field(name: &'static str, help: &'static str, command: FieldCommand) -> Self {
        Self {
            name,
            help,
            access: Access::Field(command),
        }
    }

    const fn both(name: &'static str, help: &'static str, get: Getter, set: Setter) -> Self {
        Self {
            name,
            help,
            access: Access::Custom {
                get: Some(get),
                set: Some(set),
            },
        }
    }

    const fn action(name: &'static str, help: &'static str, set: Setter) -> Self {
        Self {
            name,
            help,
            access: Access::Custom {
                get: None,
                set: Some(set),
            },
        }
    }

    pub fn readable(&self) -> bool {
        match self.access {
            Access::Field(_) => true,
            Access::Custom { get, .. } => get.is_some(),
        }
    }

    /// Print the current value; false if the command cannot be read
    pub fn get(&self, sh: &mut Shell<'_>) -> bool {
        match self.access {
            Access::Field(command) => command.get(sh),
            Access::Custom { get: Some(get), .. } => get(sh),
            Access::Custom { get: None, .. } => return false,
        }
        true
    }

    /// Apply an argument; `None` if the command cannot be assigned
    pub fn set(&self, sh: &mut Shell<'_>, arg: &str) -> Option<Result<(), ArgError>> {
        match self.access {
            Access::Field(command) => Some(command.set(sh, arg)),
            Access::Custom { set, .. } => set.map(|set| set(sh, arg)),
        }
    }
}

const fn binary(field: Field, labels: [&'static str; 2]) -> FieldCommand {
    FieldCommand::Binary { field, labels }
}

const fn tagged(
    field: Field,
    tags: &'static [(&'static str, u16)],
    unit: &'static str,
) -> FieldCommand {
    FieldCommand::Tagged { field, tags, unit }
}

const fn count(
    field: Field,
    min: u16,
    max: u16,
    bias: u16,
    style: CountStyle,
) -> FieldCommand {
    FieldCommand::Count {
        field,
        min,
        max,
        bias,
        style,
        echo: false,
    }
}

const fn signed(field: Field) -> FieldCommand {
    FieldCommand::Signed { field }
}

const SWITCHER_TAGS: &[(&str, u16)] = &[("100", 0), ("125", 1), ("166", 2), ("200", 3)];
const LT_N_TAGS: &[(&str, u16)] = &[("loop", 0xF), ("200", 1), ("400", 2), ("800", 4), ("1600", 8)];
const LT_S_TAGS: &[(&str, u16)] = &[("none", 0xF), ("200", 1), ("400", 2), ("800", 4), ("1600", 8)];
const AFEOUT_TAGS: &[(&str, u16)] = &[("disabled", 0), ("bandpass", 1), ("pga", 2), ("fga", 3)];
const LOWQ_TAGS: &[(&str, u16)] = &[("4.2", 0), ("5.3", 1), ("7.4", 2), ("12", 3)];
const TOF_CYC_TAGS: &[(&str, u16)] = &[
    ("0", 0),
    ("122", 1),
    ("244", 2),
    ("488", 3),
    ("732", 4),
    ("976", 5),
    ("16650", 6),
    ("19970", 7),
];
const TIMOUT_TAGS: &[(&str, u16)] = &[
    ("128", 0),
    ("256", 1),
    ("512", 2),
    ("1024", 3),
    ("2048", 4),
    ("4096", 5),
    ("8192", 6),
    ("16384", 7),
];
const CAL_CFG_TAGS: &[(&str, u16)] = &[("disabled", 0), ("cc", 1), ("cs", 2), ("sc", 3), ("ss", 4)];
const PORTCYC_TAGS: &[(&str, u16)] = &[("128", 0), ("256", 1), ("384", 2), ("512", 3)];
const CLK_S_TAGS: &[(&str, u16)] = &[
    ("488", 0),
    ("1460", 1),
    ("2930", 2),
    ("3900", 3),
    ("5130", 4),
    ("continuous", 6),
];
const AM_TAGS: &[(&str, u16)] = &[("none", 0), ("minutes", 1), ("hours", 2), ("both", 3)];

/// Every console command, in help order
#[rustfmt::skip]
pub static COMMANDS: &[Command] = &[
    // switcher
    Command::field("sfreq", "switcher frequency in kHz:  100, 125, 166, or 200", tagged(field::SFREQ, SWITCHER_TAGS, "kHz")),
    Command::field("hreg_d", "high voltage regulator disable:  1=disable regulator, 0=enable regulator", binary(field::HREG_D, ["regulator enabled", "regulator disabled"])),
    Command::field("dreq", "doubler frequency in kHz: 100, 125, 166, or 200", tagged(field::DREQ, SWITCHER_TAGS, "kHz")),
    Command::both("vs", "voltage select regulator target: 5.4V-27V", act::vs_get, act::vs_set),
    Command::field("lt_n", "limit trim normal operation (mV): loop, 200, 400, 800, 1600", tagged(field::LT_N, LT_N_TAGS, "mV")),
    Command::field("lt_s", "limit trim startup (mV): none, 200, 400, 800, 1600", tagged(field::LT_S, LT_S_TAGS, "mV")),
    Command::both("st", "switcher stabilization time:  64us - 16.4ms", act::st_get, act::st_set),
    Command::field("lt_50d", "limit trim 50% disable:  1=disable trim, 0=enable trim", binary(field::LT_50D, ["trimmed", "untrimmed"])),
    Command::field("pecho", "pulse echo: 1=pulse echo mode, 0=time-of-flight mode", binary(field::PECHO, ["tof mode", "echo mode"])),
    // analog front end
    Command::field("afe_bp", "AFE bypass: 1=bypass, 0=normal", binary(field::AFE_BP, ["afe enabled", "afe bypassed"])),
    Command::field("sd_en", "single ended drive enable:  1=single ended drive, 0=differential drive", binary(field::SD_EN, ["differential drive", "single ended drive"])),
    Command::field("afeout", "AFE output select: disabled, bandpass, pga, or fga", tagged(field::AFEOUT, AFEOUT_TAGS, "")),
    Command::field("4m_bp", "4MHz bypass:  1=using external CMOS clock signal, 0=using crystal oscillator", binary(field::FOUR_M_BP, ["oscillator", "CMOS clock input"])),
    Command::field("f0", "bandpass center frequency adjustment", count(field::F0, 0, F0_MAX, 0, CountStyle::Plain)),
    Command::both("pga", "pga gain:  10.00dB - 29.95dB", act::pga_get, act::pga_set),
    Command::field("lowq", "bandpass Q (Hz/Hz):  4.2, 5.3, 7.4, or 12", tagged(field::LOWQ, LOWQ_TAGS, "Hz/Hz")),
    Command::field("bp_bp", "bandpass filter bypass:  1=filter bypassed, 0=filter active", binary(field::BP_BYPASS, ["filter enabled", "filter bypassed"])),
    // time of flight
    Command::field("pl", "pulse launch size:  0-127 pulses", count(field::PL, 0, PL_MAX, 0, CountStyle::Suffix(" pulses"))),
    Command::both("dpl", "pulse launch frequency (kHz): 125 to 1000", act::dpl_get, act::dpl_set),
    Command::field("stop_pol", "comparator stop polarity: 0=positive, 1=negative", binary(field::STOP_POL, ["positive", "negative"])),
    Command::field("stop", "number of stop hits: 1-6", count(field::STOP, STOP_MIN, STOP_MAX, 1, CountStyle::WithCode("hitcount = "))),
    Command::field("t2wv", "t2 wave select: 2-63", count(field::T2WV, T2WV_MIN, T2WV_MAX, 0, CountStyle::Prefix("wave "))),
    Command::field("tof_cyc", "start-to-start time for TOF_DIFF measurements (us): 0, 122, 244, 488, 732, 976, 16650, or 19970", tagged(field::TOF_CYC, TOF_CYC_TAGS, "us")),
    Command::field("timout", "measurement timeout (us): 128, 256, 512, 1024, 2048, 4096, 8192, or 16384", tagged(field::TIMOUT, TIMOUT_TAGS, "us")),
    Command::both("hitwv", "hit wave selection:  comma delimited list of wave numbers", act::hitwv_get, act::hitwv_set),
    Command::field("c_offsetupr", "comparator offset upstream (mV when VCC=3.3V): -137.5 to 136.4", signed(field::C_OFFSETUPR)),
    Command::field("c_offsetup", "comparator return upstream (mV when VCC=3.3V): 0 to 136.4", signed(field::C_OFFSETUP)),
    Command::field("c_offsetdnr", "comparator offset downstream (mV when VCC=3.3V): -137.5 to 136.4", signed(field::C_OFFSETDNR)),
    Command::field("c_offsetdn", "comparator return downstream (mV when VCC=3.3V): 0 to 136.4", signed(field::C_OFFSETDN)),
    // event timing
    Command::both("tdf", "TOF difference measurement period (s):  0.5 to 8.0", act::tdf_get, act::tdf_set),
    Command::field("tdm", "number of TOF difference measurements to perform: 1 to 32", FieldCommand::Count {
        field: field::TDM,
        min: 1,
        max: 32,
        bias: 1,
        style: CountStyle::WithCode(""),
        echo: true,
    }),
    Command::both("tmf", "temperature measurement period (s):  1 to 64", act::tmf_get, act::tmf_set),
    Command::field("tmm", "number of temperature measurements to perform: 1 to 32", count(field::TMM, 1, 32, 1, CountStyle::WithCode(""))),
    Command::field("cal_use", "calibration usage:  1=enable, 0=disable", binary(field::CAL_USE, ["no calibration", "use calibration data"])),
    Command::field("cal_cfg", "calibration configuration: disabled, cc, cs, sc, or ss", tagged(field::CAL_CFG, CAL_CFG_TAGS, "")),
    Command::field("precyc", "preamble temperature cycle: 0-7", count(field::PRECYC, 0, PRECYC_MAX, 0, CountStyle::Suffix(" cycles"))),
    Command::field("portcyc", "port cycle time (us):  128, 256, 384, or 512", tagged(field::PORTCYC, PORTCYC_TAGS, "us")),
    Command::both("dly", "measurement delay (us):  25 to 16383.75", act::dly_get, act::dly_set),
    // calibration and control
    Command::field("cmp_en", "comparator or up/down pin enable: 1=enable, 0=disable", binary(field::CMP_EN, ["disable CMPOUT/UP_DN pin", "enable CMPOUT/UP_DN pin"])),
    Command::field("cmp_sel", "comparator or up/down select:  1=comparator, 0=up/down", binary(field::CMP_SEL, ["UP_DN", "CMPOUT"])),
    Command::field("et_cont", "event timing continuous operation: 1=continuous, 0=one-shot", binary(field::ET_CONT, ["one-shot", "continuous"])),
    Command::field("cont_int", "continuous interrupt:  1=continuous, 0=one-shot", binary(field::CONT_INT, ["one-shot", "continuous"])),
    Command::field("clk_s", "clock settling time (us): 488, 1460, 2930, 3900, 5130, or continuous", tagged(field::CLK_S, CLK_S_TAGS, "us")),
    Command::both("cal_period", "4MHz clock calibration period (us):  30.5 to 488.0", act::cal_period_get, act::cal_period_set),
    // real-time clock
    Command::field("32k_bp", "32kHz bypass: 1=cmos clock input, 0=crystal input", binary(field::K32_BP, ["oscillator", "CMOS clock input"])),
    Command::field("32k_en", "enable 32KOUT pin:  1=enable, 0=disable", binary(field::K32_EN, ["disabled", "enabled"])),
    Command::field("eosc", "enable RTC oscillator: 0=enable, 1=disable", binary(field::EOSC, ["enabled", "disabled"])),
    Command::field("am", "alarm control:  none, minutes, hours, or both", tagged(field::AM, AM_TAGS, "")),
    Command::field("wf", "watchdog flag:  0=reset", binary(field::WF, ["clear", "set"])),
    Command::field("wd_en", "watchdog enable:  1=enabled, 0=disabled", binary(field::WD_EN, ["disabled", "enabled"])),
    // persistence
    Command::action("save", "save configuration to flash", act::save),
    // chip commands
    Command::action("event", "start event timing mode: tof, temp, or both", act::event),
    Command::action("tof_up", "TOF_UP command", act::tof_up),
    Command::action("tof_down", "TOF_DOWN command", act::tof_down),
    Command::action("tof_diff", "TOF_DIFF command", act::tof_diff),
    Command::action("temp", "temperature command", act::temperature),
    Command::action("reset", "reset command", act::reset),
    Command::action("init", "initialize command", act::initialize),
    Command::action("bpcal", "bandpass calibration command", act::bandpass_calibrate),
    Command::action("halt", "halt command", act::halt),
    Command::action("cal", "calibrate command", act::calibrate),
    Command::action("dc", "dumps all configuration registers", act::dump),
    // host commands
    Command::action("spi_test", "performs a write/read verification test on the max3510x", act::spi_test),
    Command::both("tof_temp", "number of tof measurements for each temperature measurement", act::tof_temp_get, act::tof_temp_set),
    Command::action("default", "restore configuration defaults", act::restore_defaults),
    Command::both("mode", "select sampling mode: event, host, max, idle", act::mode_get, act::mode_set),
    Command::both("sampling", "host mode sampling frequency", act::sampling_get, act::sampling_set),
    Command::action("report", "turn on sample reports until a key is pressed", act::report),
    Command::action("help", "you're looking at it", act::help),
];

/// Longest command name that prefixes the line
pub fn lookup(line: &str) -> Option<&'static Command> {
    COMMANDS
        .iter()
        .filter(|cmd| line.starts_with(cmd.name))
        .max_by_key(|cmd| cmd.name.len())
}

/// `name = value` for every readable command, names aligned
pub fn dump(sh: &mut Shell<'_>) {
    let width = COMMANDS
        .iter()
        .filter(|cmd| cmd.readable())
        .map(|cmd| cmd.name.len())
        .max()
        .unwrap_or(0);
    for cmd in COMMANDS.iter().filter(|cmd| cmd.readable()) {
        emit!(sh.out, "{:<1$} = ", cmd.name, width);
        cmd.get(sh);
    }
}

/// `name - help` for every command, names aligned
pub fn help(sh: &mut Shell<'_>) {
    let width = COMMANDS.iter().map(|cmd| cmd.name.len()).max().unwrap_or(0);
    emit!(sh.out, "\r\n");
    for cmd in COMMANDS {
        emit!(sh.out, "{:<1$} - {2}\r\n", cmd.name, width, cmd.help);
    }
    emit!(sh.out, "\r\n");
}
