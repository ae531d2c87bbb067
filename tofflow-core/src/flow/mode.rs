//! Sampling modes and sound-speed methods

/// Acquisition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SamplingMode {
    /// Not yet configured
    #[default]
    Invalid = 0,
    /// No automatic measurements; console one-shots only
    Idle = 1,
    /// Chip-autonomous event timing
    Event = 2,
    /// Paced by the board sample clock
    Host = 3,
    /// Back-to-back, each interrupt starts the next measurement
    Max = 4,
}

impl SamplingMode {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Invalid),
            1 => Some(Self::Idle),
            2 => Some(Self::Event),
            3 => Some(Self::Host),
            4 => Some(Self::Max),
            _ => None,
        }
    }

    /// Whether the mode drives measurements on its own
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Invalid | Self::Idle)
    }

    /// Console tag
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Idle => "idle",
            Self::Event => "event",
            Self::Host => "host",
            Self::Max => "max",
        }
    }
}

/// How the speed of sound is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SosMethod {
    /// Derived from the measured up/down times
    #[default]
    Direct = 0,
    /// Ideal gas model from temperature
    IdealAir = 1,
}

impl SosMethod {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Direct),
            1 => Some(Self::IdealAir),
            _ => None,
        }
    }
}
