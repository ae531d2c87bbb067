//! Measurement result decoding
//!
//! Result registers hold times as 16.16 fixed point counts of the 4 MHz
//! reference clock. The raw block is read in one burst and then converted
//! to seconds.

use super::registers::{CLOCK_HZ, MAX_HITCOUNT, TEMP_RESULT_REGISTERS, TOF_RESULT_REGISTERS};

/// 32 kHz crystal used as the calibration reference
pub const CRYSTAL_HZ: f32 = 32768.0;

/// 16.16 fixed-point time in reference clock periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fixed {
    pub integer: u16,
    pub fraction: u16,
}

impl Fixed {
    pub const fn new(integer: u16, fraction: u16) -> Self {
        Self { integer, fraction }
    }

    fn from_words(words: &[u16]) -> Self {
        Self::new(words[0], words[1])
    }

    /// Reference clock periods
    pub fn periods(self) -> f32 {
        self.integer as f32 + self.fraction as f32 / 65536.0
    }

    /// Periods with the integer part read as two's complement
    pub fn signed_periods(self) -> f32 {
        self.integer as i16 as f32 + self.fraction as f32 / 65536.0
    }

    /// Seconds at the nominal reference clock
    pub fn seconds(self) -> f32 {
        self.periods() / CLOCK_HZ as f32
    }

    /// Signed seconds, for the up/down difference
    pub fn signed_seconds(self) -> f32 {
        self.signed_periods() / CLOCK_HZ as f32
    }
}

/// Raw results for one TOF direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawTofDirection {
    /// t1/t2 ratio in the high byte, t2/ideal in the low byte
    pub wave_ratios: u16,
    pub hits: [Fixed; MAX_HITCOUNT],
    pub average: Fixed,
}

/// Registers per direction: ratios, six hits, average
const DIRECTION_REGISTERS: usize = 1 + 2 * MAX_HITCOUNT + 2;

impl RawTofDirection {
    fn from_words(words: &[u16]) -> Self {
        let mut hits = [Fixed::default(); MAX_HITCOUNT];
        for (i, hit) in hits.iter_mut().enumerate() {
            *hit = Fixed::from_words(&words[1 + 2 * i..]);
        }
        Self {
            wave_ratios: words[0],
            hits,
            average: Fixed::from_words(&words[1 + 2 * MAX_HITCOUNT..]),
        }
    }

    pub fn decode(&self) -> TofDirection {
        let mut hits = [0.0; MAX_HITCOUNT];
        for (out, hit) in hits.iter_mut().zip(self.hits.iter()) {
            *out = hit.seconds();
        }
        TofDirection {
            t1_t2: (self.wave_ratios >> 8) as f32 / 128.0,
            t2_ideal: (self.wave_ratios & 0xFF) as f32 / 128.0,
            hits,
            average: self.average.seconds(),
        }
    }
}

/// Raw TOF result block (WVRUP through TOF_RANGE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawTofResults {
    pub up: RawTofDirection,
    pub down: RawTofDirection,
    pub tof_diff: Fixed,
    pub cycle_count: u16,
    pub range: u16,
}

impl RawTofResults {
    /// Parse the register burst starting at WVRUP
    pub fn from_registers(words: &[u16; TOF_RESULT_REGISTERS]) -> Self {
        let diff = 2 * DIRECTION_REGISTERS;
        Self {
            up: RawTofDirection::from_words(&words[..DIRECTION_REGISTERS]),
            down: RawTofDirection::from_words(&words[DIRECTION_REGISTERS..diff]),
            tof_diff: Fixed::from_words(&words[diff..]),
            cycle_count: words[diff + 2],
            range: words[diff + 3],
        }
    }

    pub fn decode(&self) -> TofResults {
        TofResults {
            up: self.up.decode(),
            down: self.down.decode(),
            tof_diff: self.tof_diff.signed_seconds(),
            cycle_count: self.cycle_count,
            range: self.range,
        }
    }
}

/// One TOF direction in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TofDirection {
    pub t1_t2: f32,
    pub t2_ideal: f32,
    pub hits: [f32; MAX_HITCOUNT],
    pub average: f32,
}

/// TOF results in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TofResults {
    pub up: TofDirection,
    pub down: TofDirection,
    pub tof_diff: f32,
    pub cycle_count: u16,
    pub range: u16,
}

/// Raw temperature result block (T1INT through T4AVGFRAC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawTempResults {
    pub temps: [Fixed; 4],
    pub cycle_count: u16,
    pub averages: [Fixed; 4],
}

impl RawTempResults {
    /// Parse the register burst starting at T1INT
    pub fn from_registers(words: &[u16; TEMP_RESULT_REGISTERS]) -> Self {
        let mut temps = [Fixed::default(); 4];
        let mut averages = [Fixed::default(); 4];
        for i in 0..4 {
            temps[i] = Fixed::from_words(&words[2 * i..]);
            averages[i] = Fixed::from_words(&words[9 + 2 * i..]);
        }
        Self {
            temps,
            cycle_count: words[8],
            averages,
        }
    }

    pub fn decode(&self) -> TempResults {
        let mut out = TempResults {
            cycle_count: self.cycle_count,
            ..TempResults::default()
        };
        for i in 0..4 {
            out.temps[i] = self.temps[i].seconds();
            out.averages[i] = self.averages[i].seconds();
        }
        out
    }
}

/// Temperature port discharge times in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TempResults {
    pub temps: [f32; 4],
    pub averages: [f32; 4],
    pub cycle_count: u16,
}

/// Measured reference frequency from a calibration result
///
/// The calibration counts 4 MHz periods across one 32 kHz period.
pub fn input_frequency(calibration: Fixed) -> u32 {
    (calibration.periods() * CRYSTAL_HZ) as u32
}

/// Correction factor to apply to times taken at the nominal clock
pub fn calibration_factor(input_hz: u32) -> f32 {
    if input_hz == 0 {
        return 0.0;
    }
    CLOCK_HZ as f32 / input_hz as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_seconds() {
        // 100.5 periods at 4 MHz
        let t = Fixed::new(100, 0x8000);
        assert_eq!(t.periods(), 100.5);
        assert!((t.seconds() - 25.125e-6).abs() < 1e-10);
    }

    #[test]
    fn test_signed_diff() {
        let t = Fixed::new(0xFFFF, 0x8000);
        assert_eq!(t.signed_periods(), -0.5);
    }

    #[test]
    fn test_tof_block_layout() {
        let mut words = [0u16; TOF_RESULT_REGISTERS];
        words[0] = 0x4020; // t1/t2 = 0.5, t2/ideal = 0.25
        words[1] = 400; // hit 1 up
        words[13] = 401; // average up
        words[15] = 0x0102; // down ratios
        words[16] = 396; // hit 1 down
        words[30] = 4; // diff
        words[32] = 7;
        words[33] = 3;

        let tof = RawTofResults::from_registers(&words).decode();
        assert_eq!(tof.up.t1_t2, 0.5);
        assert_eq!(tof.up.t2_ideal, 0.25);
        assert_eq!(tof.up.hits[0], 100e-6);
        assert!((tof.up.average - 100.25e-6).abs() < 1e-10);
        assert_eq!(tof.down.hits[0], 99e-6);
        assert_eq!(tof.tof_diff, 1e-6);
        assert_eq!(tof.cycle_count, 7);
        assert_eq!(tof.range, 3);
    }

    #[test]
    fn test_temp_block_layout() {
        let mut words = [0u16; TEMP_RESULT_REGISTERS];
        words[0] = 4000;
        words[4] = 2000;
        words[8] = 5;
        words[9] = 8000;
        let temp = RawTempResults::from_registers(&words).decode();
        assert_eq!(temp.temps[0], 1e-3);
        assert_eq!(temp.temps[2], 0.5e-3);
        assert_eq!(temp.cycle_count, 5);
        assert_eq!(temp.averages[0], 2e-3);
    }

    #[test]
    fn test_calibration() {
        // 122 periods of 4 MHz per 32 kHz cycle, ~3.998 MHz
        let hz = input_frequency(Fixed::new(122, 0));
        assert_eq!(hz, 3_997_696);
        assert!((calibration_factor(hz) - 1.000_576).abs() < 1e-5);
        assert_eq!(calibration_factor(0), 0.0);
    }
}
