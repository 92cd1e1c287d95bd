//! Periodic analog sampling on the master.
//!
//! [`SampleTrigger`] is a two-state machine. The foreground loop calls
//! [`request()`](SampleTrigger::request) whenever it likes; a conversion only
//! starts when none is in progress (Idle → Sampling). The peripheral clock
//! calls [`poll()`](SampleTrigger::poll), which raises the sample-ready flag
//! once the converter has a result. The interrupt path then calls
//! [`complete()`](SampleTrigger::complete) (Sampling → Idle), which yields the
//! sample only if the converter is pointed at the designated channel.
//!
//! The converter itself is abstracted by [`Converter`], an `nb`-style
//! start/read pair that a HAL's ADC maps onto directly.

use crate::config::SamplerConfig;
use crate::error::LinkError;

/// An analog converter with a non-blocking result.
pub trait Converter {
    /// Converter specific error.
    type Error;

    /// Starts one conversion on `channel`.
    fn start(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Returns the left-justified 16-bit result, or `WouldBlock` while converting.
    fn read(&mut self) -> nb::Result<u16, Self::Error>;
}

/// Sample trigger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerState {
    /// No conversion in progress.
    #[default]
    Idle,
    /// Conversion requested, awaiting the sample-ready event.
    Sampling,
}

/// Sample trigger over a [`Converter`].
#[derive(Debug)]
pub struct SampleTrigger<A> {
    converter: A,
    config: SamplerConfig,
    state: SamplerState,
    ready: bool,
    raw: u16,
    sample: u8,
}

impl<A> SampleTrigger<A>
where
    A: Converter,
{
    /// Wraps the converter. Nothing is started until the first request.
    pub fn new(converter: A, config: SamplerConfig) -> Self {
        Self {
            converter,
            config,
            state: SamplerState::Idle,
            ready: false,
            raw: 0,
            sample: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Last accepted SampleValue.
    pub fn sample(&self) -> u8 {
        self.sample
    }

    /// Starts a conversion if none is in progress.
    ///
    /// Returns `true` on an Idle → Sampling transition and `false` when the
    /// request was suppressed.
    pub fn request(&mut self) -> Result<bool, LinkError> {
        if self.state == SamplerState::Sampling {
            return Ok(false);
        }
        self.converter
            .start(self.config.channel)
            .map_err(|_| LinkError::Converter)?;
        self.state = SamplerState::Sampling;
        Ok(true)
    }

    /// Polls the converter and raises the sample-ready flag on a result.
    pub fn poll(&mut self) -> Result<(), LinkError> {
        if self.state != SamplerState::Sampling || self.ready {
            return Ok(());
        }
        match self.converter.read() {
            Ok(raw) => {
                self.raw = raw;
                self.ready = true;
                Ok(())
            }
            Err(nb::Error::WouldBlock) => Ok(()),
            Err(nb::Error::Other(_)) => Err(LinkError::Converter),
        }
    }

    /// The sample-ready flag is raised.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Clears the sample-ready flag.
    pub fn clear_ready(&mut self) {
        self.ready = false;
    }

    /// Sampling → Idle. Yields the MSB of the result if the converter is on
    /// the designated channel; otherwise the last sample is kept.
    pub fn complete(&mut self) -> Option<u8> {
        self.state = SamplerState::Idle;
        if self.config.channel != self.config.designated {
            debug!(
                "sample on channel {} ignored, designated {}",
                self.config.channel, self.config.designated
            );
            return None;
        }
        let [high, _] = self.raw.to_be_bytes();
        self.sample = high;
        Some(high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeConverter;

    #[test]
    fn test_request_is_edge_triggered() {
        let converter = FakeConverter::new(0x2a00, 3);
        let mut trigger = SampleTrigger::new(converter.clone(), SamplerConfig::default());
        assert_eq!(trigger.request(), Ok(true));
        assert_eq!(trigger.state(), SamplerState::Sampling);
        assert_eq!(trigger.request(), Ok(false));
        assert_eq!(converter.starts(), 1);
    }

    #[test]
    fn test_poll_raises_ready_after_latency() {
        let converter = FakeConverter::new(0x2a00, 2);
        let mut trigger = SampleTrigger::new(converter, SamplerConfig::default());
        assert!(trigger.request().unwrap());
        trigger.poll().unwrap();
        trigger.poll().unwrap();
        assert!(!trigger.is_ready());
        trigger.poll().unwrap();
        assert!(trigger.is_ready());
    }

    #[test]
    fn test_complete_takes_high_byte() {
        let converter = FakeConverter::new(0x2ac0, 0);
        let mut trigger = SampleTrigger::new(converter, SamplerConfig::default());
        assert!(trigger.request().unwrap());
        trigger.poll().unwrap();
        assert_eq!(trigger.complete(), Some(0x2a));
        assert_eq!(trigger.sample(), 0x2a);
        assert_eq!(trigger.state(), SamplerState::Idle);
    }

    #[test]
    fn test_other_channel_keeps_sample() {
        let converter = FakeConverter::new(0x9900, 0);
        let config = SamplerConfig {
            channel: 0,
            ..SamplerConfig::default()
        };
        let mut trigger = SampleTrigger::new(converter.clone(), config);
        assert!(trigger.request().unwrap());
        trigger.poll().unwrap();
        assert_eq!(trigger.complete(), None);
        assert_eq!(trigger.sample(), 0);
        assert_eq!(trigger.state(), SamplerState::Idle);
        assert_eq!(converter.last_channel(), Some(0));
    }

    #[test]
    fn test_idle_poll_does_not_read() {
        let converter = FakeConverter::new(0x1000, 0);
        let mut trigger = SampleTrigger::new(converter.clone(), SamplerConfig::default());
        trigger.poll().unwrap();
        assert!(!trigger.is_ready());
        assert_eq!(converter.reads(), 0);
    }
}
