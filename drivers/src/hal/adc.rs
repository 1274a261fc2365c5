//! Analog-to-digital converter Hardware Abstraction Layer.
//!
//! Configuration types and the [`AnalogInput`] trait implemented by ADC
//! drivers.

use core::fmt;

/// Conversion resolution.
///
/// The discriminants are the hardware encodings of CFGR.RES, which are
/// not ordered by bit width.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum Resolution {
    Bits16 = 0b000,
    Bits14 = 0b101,
    Bits12 = 0b110,
    Bits10 = 0b011,
    Bits8 = 0b111,
}

impl Resolution {
    /// Hardware encoding.
    pub const fn encoding(self) -> u32 {
        self as u32
    }

    /// Number of significant bits in a converted sample.
    pub const fn bits(self) -> u8 {
        match self {
            Resolution::Bits16 => 16,
            Resolution::Bits14 => 14,
            Resolution::Bits12 => 12,
            Resolution::Bits10 => 10,
            Resolution::Bits8 => 8,
        }
    }
}

/// Conversion mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConversionMode {
    /// One pass over the sequence per start.
    Single,
    /// Keep converting until stopped.
    Continuous,
}

/// Static configuration of one ADC instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AdcConfig {
    /// ADC unit number (1 for ADC1, ...).
    pub unit: u8,
    pub resolution: Resolution,
    pub conversion_mode: ConversionMode,
}

impl AdcConfig {
    pub const fn new(unit: u8, resolution: Resolution, conversion_mode: ConversionMode) -> Self {
        Self {
            unit,
            resolution,
            conversion_mode,
        }
    }
}

/// Analog input channel, 0 through 19.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AdcChannel(u8);

impl AdcChannel {
    /// Highest valid channel index.
    pub const MAX: u8 = 19;

    /// Channel 0.
    pub const MIN: Self = Self(0);

    /// Channel `index`, or `None` if it is above [`AdcChannel::MAX`].
    pub const fn new(index: u8) -> Option<Self> {
        if index <= Self::MAX {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Regular conversion sequence: channels in scan order.
///
/// Valid sequences hold between 1 and 16 channels; the length is checked
/// when the sequence is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SequenceConfig<'a> {
    pub channels: &'a [AdcChannel],
}

impl<'a> SequenceConfig<'a> {
    pub const fn new(channels: &'a [AdcChannel]) -> Self {
        Self { channels }
    }

    pub const fn len(&self) -> usize {
        self.channels.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Status flag an ADC handshake waits on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdcFlag {
    /// Voltage regulator ready (ISR.LDORDY).
    LdoReady,
    /// ADC ready to convert (ISR.ADRDY).
    AdcReady,
    /// End of conversion (ISR.EOC).
    EndOfConversion,
}

/// ADC errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdcError {
    /// The platform has no ADC with this unit number.
    InvalidUnit(u8),
    /// Sequence length outside 1..=16.
    InvalidSequenceLength(usize),
    /// `start` called before a sequence was configured.
    NotConfigured,
    /// `read` called before a conversion was started.
    NotStarted,
    /// Non-blocking read found no completed conversion.
    WouldBlock,
    /// The flag never came up within the wait budget.
    Timeout(AdcFlag),
}

impl fmt::Display for AdcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdcError::InvalidUnit(unit) => write!(f, "no ADC unit {}", unit),
            AdcError::InvalidSequenceLength(len) => {
                write!(f, "sequence length {} outside 1..=16", len)
            }
            AdcError::NotConfigured => f.write_str("no conversion sequence configured"),
            AdcError::NotStarted => f.write_str("no conversion started"),
            AdcError::WouldBlock => f.write_str("conversion still in progress"),
            AdcError::Timeout(flag) => write!(f, "timed out waiting for {:?}", flag),
        }
    }
}

/// A started-then-read analog input.
pub trait AnalogInput {
    /// Error type for conversions.
    type Error: fmt::Debug;

    /// Kick off conversion of the configured sequence. Does not wait.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Wait for the next end of conversion and return the sample.
    fn read(&mut self) -> Result<u32, Self::Error>;

    /// Return the next sample if one is ready, without waiting.
    fn try_read(&mut self) -> Result<u32, Self::Error>;

    /// Start a conversion and wait for its result.
    fn convert(&mut self) -> Result<u32, Self::Error> {
        self.start()?;
        self.read()
    }
}
