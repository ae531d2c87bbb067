//! Events delivered to the flow controller

use bitflags::bitflags;

bitflags! {
    /// Event bits raised by the dispatcher
    ///
    /// Both may be set in one call; the tick is handled first.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FlowEvents: u32 {
        /// Host-mode sample clock expired
        const TICK = 1 << 0;
        /// The chip asserted its interrupt line
        const CHIP_INTERRUPT = 1 << 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FlowEvents {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FlowEvents({=u32:#x})", self.bits())
    }
}
