//! MAX35104 register map and bitfield encodings
//!
//! Configuration registers are 16 bits wide. Result registers are read-only
//! and hold 16.16 fixed-point values split over an INT/FRAC register pair.

/// Reference oscillator driving the TDC
pub const CLOCK_HZ: u32 = 4_000_000;

/// Reference oscillator in kHz
pub const CLOCK_KHZ: u32 = CLOCK_HZ / 1000;

/// Maximum number of hits captured per TOF direction
pub const MAX_HITCOUNT: usize = 6;

/// Register addresses
pub mod reg {
    /// Boost switcher configuration (MAX35104)
    pub const SWITCHER1: u8 = 0x30;
    /// Boost switcher limits and timing (MAX35104)
    pub const SWITCHER2: u8 = 0x31;
    /// Analog front end configuration (MAX35104)
    pub const AFE1: u8 = 0x32;
    /// Analog front end filter and gain (MAX35104)
    pub const AFE2: u8 = 0x33;
    /// Pulse launcher
    pub const TOF1: u8 = 0x38;
    /// Stop hits, T2 wave, cycle time, timeout
    pub const TOF2: u8 = 0x39;
    /// Hit 1/2 wave select
    pub const TOF3: u8 = 0x3A;
    /// Hit 3/4 wave select
    pub const TOF4: u8 = 0x3B;
    /// Hit 5/6 wave select
    pub const TOF5: u8 = 0x3C;
    /// Upstream comparator offsets
    pub const TOF6: u8 = 0x3D;
    /// Downstream comparator offsets
    pub const TOF7: u8 = 0x3E;
    /// Event timing: TOF period and counts
    pub const EVENT_TIMING_1: u8 = 0x3F;
    /// Event timing: temperature and calibration
    pub const EVENT_TIMING_2: u8 = 0x40;
    /// Delay between launch and receiver enable
    pub const TOF_MEASUREMENT_DELAY: u8 = 0x41;
    /// Calibration, comparator output and continuous operation
    pub const CALIBRATION_CONTROL: u8 = 0x42;
    /// RTC, 32 kHz oscillator and watchdog
    pub const RTC: u8 = 0x43;

    /// Upstream wave ratios (t1/t2 high byte, t2/ideal low byte)
    pub const WVRUP: u8 = 0xC4;
    /// First upstream hit, integer part
    pub const HIT1UPINT: u8 = 0xC5;
    /// Upstream hit average, integer part
    pub const AVGUPINT: u8 = 0xD1;
    /// Downstream wave ratios
    pub const WVRDN: u8 = 0xD3;
    /// First downstream hit, integer part
    pub const HIT1DNINT: u8 = 0xD4;
    /// Downstream hit average, integer part
    pub const AVGDNINT: u8 = 0xE0;
    /// Up minus down, integer part (signed)
    pub const TOF_DIFFINT: u8 = 0xE2;
    /// Completed TOF_DIFF cycles in event timing
    pub const TOF_CYCLE_COUNT: u8 = 0xE4;
    /// Spread of TOF_DIFF results in event timing
    pub const TOF_RANGE: u8 = 0xE5;
    /// First temperature port discharge time, integer part
    pub const T1INT: u8 = 0xE7;
    /// Completed temperature cycles in event timing
    pub const TEMP_CYCLE_COUNT: u8 = 0xEF;
    /// First averaged temperature port, integer part
    pub const T1AVGINT: u8 = 0xF0;
    /// 4 MHz periods per 32 kHz period, integer part
    pub const CALIBRATIONINT: u8 = 0xF8;
    /// Interrupt status, cleared on read
    pub const INTERRUPT_STATUS: u8 = 0xFE;
}

/// Number of configuration registers mirrored in the image
pub const CONFIG_REGISTER_COUNT: usize = 16;

/// Configuration register addresses in image order
pub const CONFIG_REGISTERS: [u8; CONFIG_REGISTER_COUNT] = [
    reg::SWITCHER1,
    reg::SWITCHER2,
    reg::AFE1,
    reg::AFE2,
    reg::TOF1,
    reg::TOF2,
    reg::TOF3,
    reg::TOF4,
    reg::TOF5,
    reg::TOF6,
    reg::TOF7,
    reg::EVENT_TIMING_1,
    reg::EVENT_TIMING_2,
    reg::TOF_MEASUREMENT_DELAY,
    reg::CALIBRATION_CONTROL,
    reg::RTC,
];

/// Registers in the TOF result block (WVRUP through TOF_RANGE)
pub const TOF_RESULT_REGISTERS: usize = (reg::TOF_RANGE - reg::WVRUP) as usize + 1;

/// Registers in the temperature result block (T1INT through T4AVGFRAC)
pub const TEMP_RESULT_REGISTERS: usize = 17;

/// A bitfield inside one register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Register address
    pub reg: u8,
    /// Bit position of the least significant bit
    pub shift: u8,
    /// Width in bits
    pub width: u8,
}

impl Field {
    /// Describe a field
    pub const fn new(reg: u8, shift: u8, width: u8) -> Self {
        Self { reg, shift, width }
    }

    /// Largest raw value the field can hold
    pub const fn max(self) -> u16 {
        ((1u32 << self.width) - 1) as u16
    }

    /// Field mask in register position
    pub const fn mask(self) -> u16 {
        self.max() << self.shift
    }

    /// Extract the field from a register value
    pub const fn get(self, raw: u16) -> u16 {
        (raw & self.mask()) >> self.shift
    }

    /// Replace the field inside a register value
    pub const fn set(self, raw: u16, value: u16) -> u16 {
        (raw & !self.mask()) | ((value << self.shift) & self.mask())
    }
}

/// Bitfield definitions
pub mod field {
    use super::{reg, Field};

    pub const SFREQ: Field = Field::new(reg::SWITCHER1, 14, 2);
    pub const HREG_D: Field = Field::new(reg::SWITCHER1, 13, 1);
    pub const DREQ: Field = Field::new(reg::SWITCHER1, 11, 2);
    pub const VS: Field = Field::new(reg::SWITCHER1, 2, 4);

    pub const LT_N: Field = Field::new(reg::SWITCHER2, 12, 4);
    pub const LT_S: Field = Field::new(reg::SWITCHER2, 8, 4);
    pub const ST: Field = Field::new(reg::SWITCHER2, 4, 4);
    pub const LT_50D: Field = Field::new(reg::SWITCHER2, 3, 1);
    pub const PECHO: Field = Field::new(reg::SWITCHER2, 2, 1);

    pub const AFE_BP: Field = Field::new(reg::AFE1, 15, 1);
    pub const SD_EN: Field = Field::new(reg::AFE1, 14, 1);
    pub const AFEOUT: Field = Field::new(reg::AFE1, 12, 2);

    pub const FOUR_M_BP: Field = Field::new(reg::AFE2, 15, 1);
    pub const F0: Field = Field::new(reg::AFE2, 8, 7);
    pub const PGA: Field = Field::new(reg::AFE2, 4, 4);
    pub const LOWQ: Field = Field::new(reg::AFE2, 2, 2);
    pub const BP_BYPASS: Field = Field::new(reg::AFE2, 1, 1);

    pub const PL: Field = Field::new(reg::TOF1, 8, 8);
    pub const DPL: Field = Field::new(reg::TOF1, 4, 4);
    pub const STOP_POL: Field = Field::new(reg::TOF1, 3, 1);

    pub const STOP: Field = Field::new(reg::TOF2, 13, 3);
    pub const T2WV: Field = Field::new(reg::TOF2, 7, 6);
    pub const TOF_CYC: Field = Field::new(reg::TOF2, 4, 3);
    pub const TIMOUT: Field = Field::new(reg::TOF2, 0, 3);

    pub const HIT1WV: Field = Field::new(reg::TOF3, 8, 6);
    pub const HIT2WV: Field = Field::new(reg::TOF3, 0, 6);
    pub const HIT3WV: Field = Field::new(reg::TOF4, 8, 6);
    pub const HIT4WV: Field = Field::new(reg::TOF4, 0, 6);
    pub const HIT5WV: Field = Field::new(reg::TOF5, 8, 6);
    pub const HIT6WV: Field = Field::new(reg::TOF5, 0, 6);

    pub const C_OFFSETUPR: Field = Field::new(reg::TOF6, 8, 8);
    pub const C_OFFSETUP: Field = Field::new(reg::TOF6, 0, 8);
    pub const C_OFFSETDNR: Field = Field::new(reg::TOF7, 8, 8);
    pub const C_OFFSETDN: Field = Field::new(reg::TOF7, 0, 8);

    pub const TDF: Field = Field::new(reg::EVENT_TIMING_1, 12, 4);
    pub const TDM: Field = Field::new(reg::EVENT_TIMING_1, 7, 5);
    pub const TMF: Field = Field::new(reg::EVENT_TIMING_1, 1, 6);

    pub const TMM: Field = Field::new(reg::EVENT_TIMING_2, 11, 5);
    pub const CAL_USE: Field = Field::new(reg::EVENT_TIMING_2, 10, 1);
    pub const CAL_CFG: Field = Field::new(reg::EVENT_TIMING_2, 7, 3);
    pub const PRECYC: Field = Field::new(reg::EVENT_TIMING_2, 4, 3);
    pub const PORTCYC: Field = Field::new(reg::EVENT_TIMING_2, 2, 2);

    pub const DLY: Field = Field::new(reg::TOF_MEASUREMENT_DELAY, 0, 16);

    pub const CMP_EN: Field = Field::new(reg::CALIBRATION_CONTROL, 10, 1);
    pub const CMP_SEL: Field = Field::new(reg::CALIBRATION_CONTROL, 9, 1);
    pub const ET_CONT: Field = Field::new(reg::CALIBRATION_CONTROL, 8, 1);
    pub const CONT_INT: Field = Field::new(reg::CALIBRATION_CONTROL, 7, 1);
    pub const CLK_S: Field = Field::new(reg::CALIBRATION_CONTROL, 4, 3);
    pub const CAL_PERIOD: Field = Field::new(reg::CALIBRATION_CONTROL, 0, 4);

    pub const K32_BP: Field = Field::new(reg::RTC, 15, 1);
    pub const K32_EN: Field = Field::new(reg::RTC, 14, 1);
    pub const EOSC: Field = Field::new(reg::RTC, 13, 1);
    pub const AM: Field = Field::new(reg::RTC, 11, 2);
    pub const WF: Field = Field::new(reg::RTC, 10, 1);
    pub const WD_EN: Field = Field::new(reg::RTC, 9, 1);

    /// Hit wave select fields in hit order
    pub const HITWV: [Field; super::MAX_HITCOUNT] = [HIT1WV, HIT2WV, HIT3WV, HIT4WV, HIT5WV, HIT6WV];
}

// Field value encodings and conversions

/// Bandpass filter path enabled (AFE1.AFE_BP)
pub const AFE_BP_DISABLED: u16 = 0;
/// Bandpass filter active (AFE2.BP_BYPASS)
pub const BP_BYPASS_DISABLED: u16 = 0;

/// Stop hit range
pub const STOP_MIN: u16 = 1;
pub const STOP_MAX: u16 = MAX_HITCOUNT as u16;

/// Hit count encoded by a TOF2.STOP value
pub const fn stop_hits(code: u16) -> u8 {
    code as u8 + 1
}

/// TOF2.STOP value for a hit count
pub const fn stop_code(hits: u16) -> u16 {
    hits - 1
}

/// T2 wave select range
pub const T2WV_MIN: u16 = 2;
pub const T2WV_MAX: u16 = 63;

/// Hit wave select range
pub const HITWV_MIN: u8 = 3;
pub const HITWV_MAX: u8 = 63;

pub const PL_MAX: u16 = 127;
pub const F0_MAX: u16 = 127;
pub const PRECYC_MAX: u16 = 7;

/// Launch frequency codes: 1 MHz down to 125 kHz
pub const DPL_1MHZ: u16 = 1;
pub const DPL_125KHZ: u16 = 15;

/// Launch frequency in kHz for a TOF1.DPL code
pub const fn dpl_khz(code: u16) -> u32 {
    CLOCK_KHZ / (2 * (code as u32 + 1))
}

/// Switcher stabilization range in microseconds
pub const ST_US_MIN: u32 = 64;
pub const ST_US_MAX: u32 = 16384;

/// Stabilization time for a SWITCHER2.ST code
pub const fn st_us(code: u16) -> u32 {
    ST_US_MIN << code
}

/// Smallest ST code whose stabilization time covers `us`
pub fn st_code(us: u32) -> u16 {
    let us = us.clamp(ST_US_MIN, ST_US_MAX);
    let mut code = 0;
    while st_us(code) < us {
        code += 1;
    }
    code
}

/// PGA gain range in dB
pub const PGA_DB_MIN: f32 = 10.0;
pub const PGA_DB_MAX: f32 = 29.95;
const PGA_DB_STEP: f32 = 1.33;

/// Gain for an AFE2.PGA code
pub fn pga_db(code: u16) -> f32 {
    PGA_DB_MIN + code as f32 * PGA_DB_STEP
}

/// Nearest AFE2.PGA code for a gain
pub fn pga_code(db: f32) -> u16 {
    round_to_u16((db - PGA_DB_MIN) / PGA_DB_STEP)
}

/// Regulator voltage select targets, highest first: (VPR, VP, code)
pub const VS_TARGETS: [(f32, f32, u16); 12] = [
    (27.0, 30.6, 11),
    (25.2, 28.8, 10),
    (23.4, 27.0, 9),
    (21.6, 25.2, 8),
    (19.2, 22.8, 7),
    (17.4, 21.0, 6),
    (15.6, 19.2, 5),
    (13.2, 16.8, 4),
    (11.4, 15.0, 3),
    (9.0, 12.6, 2),
    (7.2, 10.8, 1),
    (5.4, 9.0, 0),
];

/// TOF difference period in seconds for an EVENT_TIMING_1.TDF code
pub fn tdf_s(code: u16) -> f32 {
    (code as f32 + 1.0) * 0.5
}

/// Temperature period in seconds for an EVENT_TIMING_1.TMF code
pub const fn tmf_s(code: u16) -> u16 {
    code + 1
}

/// Measurement count for TDM/TMM codes
pub const fn count_of(code: u16) -> u16 {
    code + 1
}

/// Measurement delay resolution
const DLY_STEP_US: f32 = 0.25;

/// Smallest legal TOF_MEASUREMENT_DELAY value (25 us)
pub const DLY_MIN: u16 = 100;

/// Measurement delay in microseconds for a DLY value
pub fn dly_us(code: u16) -> f32 {
    code as f32 * DLY_STEP_US
}

/// Nearest DLY value for a delay in microseconds
pub fn dly_code(us: f32) -> u16 {
    round_to_u16(us / DLY_STEP_US)
}

/// Calibration period resolution (one 32 kHz cycle)
const CAL_PERIOD_STEP_US: f32 = 30.5;

/// Calibration period in microseconds for a CAL_PERIOD code
pub fn cal_period_us(code: u16) -> f32 {
    (code as f32 + 1.0) * CAL_PERIOD_STEP_US
}

/// Nearest CAL_PERIOD code for a period, saturating at the field bounds
pub fn cal_period_code(us: f32) -> u16 {
    round_to_u16(us / CAL_PERIOD_STEP_US - 1.0).min(field::CAL_PERIOD.max())
}

/// Round a non-negative value half away from zero
pub(crate) fn round_to_u16(value: f32) -> u16 {
    if value <= 0.0 {
        0
    } else if value >= u16::MAX as f32 {
        u16::MAX
    } else {
        (value + 0.5) as u16
    }
}

/// Position of a configuration register in the image
pub const fn index_of(addr: u8) -> Option<usize> {
    let mut i = 0;
    while i < CONFIG_REGISTER_COUNT {
        if CONFIG_REGISTERS[i] == addr {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// In-memory mirror of every configuration register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigRegisters {
    values: [u16; CONFIG_REGISTER_COUNT],
}

impl Default for ConfigRegisters {
    fn default() -> Self {
        Self::transducer_defaults()
    }
}

impl ConfigRegisters {
    /// All registers zero
    pub const fn zeroed() -> Self {
        Self {
            values: [0; CONFIG_REGISTER_COUNT],
        }
    }

    /// Build from values in image order
    pub const fn from_values(values: [u16; CONFIG_REGISTER_COUNT]) -> Self {
        Self { values }
    }

    /// Values in image order
    pub const fn values(&self) -> &[u16; CONFIG_REGISTER_COUNT] {
        &self.values
    }

    /// Register value, or `None` for addresses outside the image
    pub fn get(&self, addr: u8) -> Option<u16> {
        index_of(addr).map(|i| self.values[i])
    }

    /// Store a register value; returns false for addresses outside the image
    pub fn set(&mut self, addr: u8, value: u16) -> bool {
        match index_of(addr) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// Read a bitfield from the image
    pub fn field(&self, field: Field) -> u16 {
        self.get(field.reg).map_or(0, |raw| field.get(raw))
    }

    /// `(address, value)` pairs in image order
    pub fn iter(&self) -> impl Iterator<Item = (u8, u16)> + '_ {
        CONFIG_REGISTERS.iter().copied().zip(self.values.iter().copied())
    }

    const fn with(mut self, field: Field, value: u16) -> Self {
        let i = match index_of(field.reg) {
            Some(i) => i,
            None => return self,
        };
        self.values[i] = field.set(self.values[i], value);
        self
    }

    /// Compiled-in register set for the reference transducer spool
    pub const fn transducer_defaults() -> Self {
        Self::zeroed()
            // 200 kHz switcher and doubler, 21.6 V launch rail
            .with(field::SFREQ, 3)
            .with(field::DREQ, 3)
            .with(field::VS, 8)
            .with(field::LT_N, 0xF)
            .with(field::LT_S, 0xF)
            .with(field::ST, 4)
            // bandpass path, fixed-gain output off
            .with(field::F0, 19)
            .with(field::PGA, 7)
            .with(field::LOWQ, 3)
            // 15 pulses at 500 kHz, three hits after wave 8
            .with(field::PL, 15)
            .with(field::DPL, 3)
            .with(field::STOP, 2)
            .with(field::T2WV, 8)
            .with(field::TIMOUT, 2)
            .with(field::HIT1WV, 10)
            .with(field::HIT2WV, 11)
            .with(field::HIT3WV, 12)
            .with(field::HIT4WV, 13)
            .with(field::HIT5WV, 14)
            .with(field::HIT6WV, 15)
            .with(field::TDF, 1)
            .with(field::CAL_USE, 1)
            .with(field::PRECYC, 1)
            .with(field::DLY, 400)
            .with(field::CAL_PERIOD, 3)
    }
}
