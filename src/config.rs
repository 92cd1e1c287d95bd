//! Bus and sampler configuration.
//!
//! The engine configuration is fixed per role and applied once when the engine
//! is built. [`EngineConfig::master`] and [`EngineConfig::slave`] give the
//! settings the board runs with: idle-low clock, capture on the first clock
//! transition, peripheral clock divided by four on the master, the master
//! sampling its input at the end of the bit and the slave in the middle.

use crate::consts::SAMPLE_CHANNEL;
use crate::error::LinkError;
use crate::role::Role;

/// Idle level of the clock line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    #[default]
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

impl Polarity {
    /// Electrical level of the clock line for the given logical clock state.
    pub fn level(self, active: bool) -> bool {
        match self {
            Polarity::IdleLow => active,
            Polarity::IdleHigh => !active,
        }
    }
}

/// Which clock transition captures data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data is presented before the first (idle to active) transition and
    /// captured on it; outputs change on the active to idle transition (CPHA=0)
    #[default]
    CaptureOnFirstTransition,
    /// Outputs change on the idle to active transition and data is captured on
    /// the active to idle transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// Where in the bit the master samples its data input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplePoint {
    /// On the capture transition
    #[default]
    Middle,
    /// On the transition that ends the bit (master only)
    End,
}

/// Divider between the peripheral clock and the master bus clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockDivider {
    /// Peripheral clock / 4
    #[default]
    Div4,
    /// Peripheral clock / 16
    Div16,
    /// Peripheral clock / 64
    Div64,
}

impl ClockDivider {
    /// Peripheral clock ticks per bus clock period.
    pub const fn ratio(self) -> u32 {
        match self {
            ClockDivider::Div4 => 4,
            ClockDivider::Div16 => 16,
            ClockDivider::Div64 => 64,
        }
    }

    /// Peripheral clock ticks between two bus clock transitions.
    pub const fn half_period(self) -> u8 {
        match self {
            ClockDivider::Div4 => 2,
            ClockDivider::Div16 => 8,
            ClockDivider::Div64 => 32,
        }
    }
}

/// Transfer engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Clock idle level
    pub polarity: Polarity,
    /// Capture transition
    pub phase: Phase,
    /// Master input sample point
    pub sample: SamplePoint,
    /// Master clock divider, ignored by the slave
    pub divider: ClockDivider,
}

impl EngineConfig {
    /// Master settings: idle low, capture on first transition, sample at end, Fosc/4.
    pub const fn master() -> Self {
        Self {
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
            sample: SamplePoint::End,
            divider: ClockDivider::Div4,
        }
    }

    /// Slave settings: idle low, capture on first transition, sample in the middle.
    pub const fn slave() -> Self {
        Self {
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
            sample: SamplePoint::Middle,
            divider: ClockDivider::Div4,
        }
    }

    /// Checks that the engine can honour this configuration in `role`.
    pub fn validate(&self, role: Role) -> Result<(), LinkError> {
        if self.sample == SamplePoint::End {
            if role == Role::Slave {
                return Err(LinkError::Config("the slave samples in the middle of the bit"));
            }
            if self.phase == Phase::CaptureOnSecondTransition {
                return Err(LinkError::Config(
                    "end-of-bit sampling needs capture on the first transition",
                ));
            }
        }
        Ok(())
    }
}

/// Master sampler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplerConfig {
    /// Channel the converter is pointed at
    pub channel: u8,
    /// Channel whose samples are forwarded to the bus
    pub designated: u8,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            channel: SAMPLE_CHANNEL,
            designated: SAMPLE_CHANNEL,
        }
    }
}
