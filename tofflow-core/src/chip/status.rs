//! Interrupt status register

use bitflags::bitflags;

bitflags! {
    /// INTERRUPT_STATUS bits, cleared by the chip when read
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InterruptStatus: u16 {
        /// Measurement timed out
        const TO = 1 << 15;
        /// Hit average overflow
        const AF = 1 << 14;
        /// TOF measurement complete
        const TOF = 1 << 12;
        /// Temperature measurement complete
        const TE = 1 << 11;
        /// TOF event timing sequence complete
        const TOF_EVTMG = 1 << 9;
        /// Temperature event timing sequence complete
        const TEMP_EVTMG = 1 << 8;
        /// Halt complete
        const HALT = 1 << 7;
        /// Calibration complete
        const CAL = 1 << 5;
        /// Power-on reset complete
        const POR = 1 << 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "InterruptStatus({=u16:#06x})", self.bits())
    }
}

impl InterruptStatus {
    /// Decode a raw register value, dropping reserved bits
    pub const fn from_raw(raw: u16) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// Any measurement finished (TOF, temperature or event timing)
    pub const fn measurement_complete(self) -> bool {
        self.intersects(
            Self::TOF
                .union(Self::TE)
                .union(Self::TOF_EVTMG)
                .union(Self::TEMP_EVTMG),
        )
    }
}
