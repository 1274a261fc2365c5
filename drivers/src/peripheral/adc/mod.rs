//! STM32H7 ADC Driver (polled)
//!
//! Drives one ADC instance through its bring-up and conversion handshakes
//! by spinning on ISR flags. No interrupts, no DMA.
//!
//! # Lifecycle
//!
//! ```text
//! init ──► Initialized ──configure──► SequenceConfigured ──start──► Converting
//!                                                                    │  ▲
//!                                                               read │  │ start
//!                                                                    ▼  │
//!                                                                  DataReady
//! ```
//!
//! # Example
//!
//! ```ignore
//! use h7_drivers::hal::adc::*;
//! use h7_drivers::peripheral::adc::Adc;
//! use common::WaitPolicy;
//!
//! static CONFIG: AdcConfig = AdcConfig::new(3, Resolution::Bits16, ConversionMode::Single);
//! static CHANNELS: [AdcChannel; 1] = [AdcChannel::new(9).unwrap()];
//!
//! // ADC3 clock and PF4 analog mode set up by the caller.
//! let mut adc = unsafe { Adc::init(&CONFIG, WaitPolicy::DEFAULT)? };
//! adc.configure(&SequenceConfig::new(&CHANNELS))?;
//! loop {
//!     adc.start()?;
//!     let sample = adc.read()?;
//! }
//! ```

pub mod sequence;

pub use sequence::ProgrammedSequence;

use crate::hal::adc::{AdcConfig, AdcError, AdcFlag, AnalogInput, ConversionMode, SequenceConfig};
use crate::hw::stm32h743::adc::{self as hw, Cfgr, Cr, Isr};
use crate::platform::{CurrentPlatform, Platform};
use common::wait::{self, WaitPolicy};
use common::{Mmio, RegisterAccess};
use log::{debug, trace, warn};

/// Spins between enabling the regulator and polling LDORDY.
const REGULATOR_SETTLE_SPINS: u32 = 1000;

/// Where an initialized ADC is in its conversion cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdcState {
    /// Powered up, no sequence yet.
    Initialized,
    /// Sequence programmed and ADC enabled.
    SequenceConfigured,
    /// Conversion requested, result not yet collected.
    Converting,
    /// Last result collected.
    DataReady,
}

/// Polled driver for one ADC instance.
///
/// Borrows its static configuration for as long as it lives.
pub struct Adc<'a, R: RegisterAccess> {
    regs: R,
    common: R,
    config: &'a AdcConfig,
    wait: WaitPolicy,
    state: AdcState,
}

impl<'a> Adc<'a, Mmio> {
    /// Resolve `config.unit` on the current platform and bring it up.
    ///
    /// # Safety
    ///
    /// - the ADC's bus clock must be enabled and its pins in analog mode
    /// - no other handle may drive the same unit, and nothing else may
    ///   write the common block of its pair concurrently
    pub unsafe fn init(config: &'a AdcConfig, wait: WaitPolicy) -> Result<Self, AdcError> {
        Self::init_with(config, wait, |unit| {
            CurrentPlatform::adc_unit(unit).map(|block| {
                debug!(
                    "{} ADC{}: registers at {:#010x}, common at {:#010x}",
                    CurrentPlatform::name(),
                    unit,
                    block.base,
                    block.common
                );
                // SAFETY: the platform table only lists ADC register blocks;
                // the caller guarantees clocking and exclusive ownership.
                unsafe { (Mmio::new(block.base), Mmio::new(block.common)) }
            })
        })
    }
}

impl<'a, R: RegisterAccess> Adc<'a, R> {
    /// Bring up the unit that `resolve` maps `config.unit` to.
    ///
    /// `resolve` returns the instance and common register blocks, or
    /// `None` for an unknown unit.
    pub fn init_with<F>(
        config: &'a AdcConfig,
        wait: WaitPolicy,
        resolve: F,
    ) -> Result<Self, AdcError>
    where
        F: FnOnce(u8) -> Option<(R, R)>,
    {
        let (regs, common) = resolve(config.unit).ok_or(AdcError::InvalidUnit(config.unit))?;

        let adc = Self {
            regs,
            common,
            config,
            wait,
            state: AdcState::Initialized,
        };
        adc.power_up()?;

        debug!(
            "ADC{}: initialized, {} bits, {:?}",
            config.unit,
            config.resolution.bits(),
            config.conversion_mode
        );
        Ok(adc)
    }

    fn power_up(&self) -> Result<(), AdcError> {
        // Clearing CR also leaves deep power-down.
        self.regs.write(hw::CR, 0);
        self.regs.set_bits(hw::CR, Cr::ADVREGEN.bits());
        wait::settle(REGULATOR_SETTLE_SPINS);
        self.wait_flag(Isr::LDORDY, AdcFlag::LdoReady)?;

        let resolution = self.config.resolution.encoding() << hw::CFGR_RES_SHIFT;
        let continuous = match self.config.conversion_mode {
            ConversionMode::Single => Cfgr::empty(),
            ConversionMode::Continuous => Cfgr::CONT,
        };
        self.regs.modify(hw::CFGR, |v| {
            (v & !(hw::CFGR_RES_MASK | Cfgr::CONT.bits())) | resolution | continuous.bits()
        });
        Ok(())
    }

    /// Program the regular sequence and enable the converter.
    ///
    /// Rejects sequences that are empty or longer than 16 before touching
    /// any register. Once a configure has seen ADRDY, later calls skip the
    /// enable handshake; until then every call waits for it.
    pub fn configure(&mut self, seq: &SequenceConfig<'_>) -> Result<(), AdcError> {
        let len = seq.len();
        if !(1..=hw::MAX_SEQUENCE_LEN).contains(&len) {
            return Err(AdcError::InvalidSequenceLength(len));
        }

        let mut sqr = hw::SQR.map(|offset| self.regs.read(offset));
        sequence::pack(&mut sqr, seq.channels);
        for (offset, value) in hw::SQR.into_iter().zip(sqr) {
            self.regs.write(offset, value);
        }

        // Inputs only reach the converter once preselected.
        let preselect = seq
            .channels
            .iter()
            .fold(0u32, |mask, channel| mask | 1 << channel.index());
        self.regs.set_bits(hw::PCSEL, preselect);

        self.common.write_field(
            hw::common::CCR,
            hw::common::CCR_CKMODE_MASK,
            hw::common::CCR_CKMODE_SHIFT,
            hw::common::CKMODE_HCLK_DIV2,
        );

        if !self.regs.is_set(hw::CR, Cr::ADEN.bits()) {
            // Writing ADRDY clears it; the hardware sets it again once
            // ADEN has taken effect.
            self.regs.write(hw::ISR, Isr::ADRDY.bits());
            self.regs.set_bits(hw::CR, Cr::ADEN.bits());
        }
        // ADEN may be left set by a configure that timed out.
        if self.state == AdcState::Initialized {
            self.wait_flag(Isr::ADRDY, AdcFlag::AdcReady)?;
        }

        self.state = AdcState::SequenceConfigured;
        debug!("ADC{}: sequence of {} configured", self.config.unit, len);
        Ok(())
    }

    /// Request conversion of the configured sequence and return at once.
    pub fn start(&mut self) -> Result<(), AdcError> {
        if self.state == AdcState::Initialized {
            return Err(AdcError::NotConfigured);
        }
        self.regs.set_bits(hw::CR, Cr::ADSTART.bits());
        self.state = AdcState::Converting;
        Ok(())
    }

    /// Wait for end of conversion and return the data register.
    pub fn read(&mut self) -> Result<u32, AdcError> {
        self.ensure_started()?;
        self.wait_flag(Isr::EOC, AdcFlag::EndOfConversion)?;
        Ok(self.take_sample())
    }

    /// Return the data register if a conversion has ended, without waiting.
    pub fn try_read(&mut self) -> Result<u32, AdcError> {
        self.ensure_started()?;
        if !self.regs.is_set(hw::ISR, Isr::EOC.bits()) {
            return Err(AdcError::WouldBlock);
        }
        Ok(self.take_sample())
    }

    /// Decode the sequence currently held by SQR1..SQR4.
    pub fn programmed_sequence(&self) -> ProgrammedSequence {
        let regs = hw::SQR.map(|offset| self.regs.read(offset));
        sequence::unpack(&regs)
    }

    pub fn state(&self) -> AdcState {
        self.state
    }

    pub fn config(&self) -> &'a AdcConfig {
        self.config
    }

    fn ensure_started(&self) -> Result<(), AdcError> {
        match self.state {
            AdcState::Converting | AdcState::DataReady => Ok(()),
            AdcState::Initialized | AdcState::SequenceConfigured => Err(AdcError::NotStarted),
        }
    }

    fn take_sample(&mut self) -> u32 {
        // Reading DR clears EOC.
        let sample = self.regs.read(hw::DR);
        self.state = AdcState::DataReady;
        sample
    }

    fn wait_flag(&self, flag: Isr, which: AdcFlag) -> Result<(), AdcError> {
        trace!("ADC{}: waiting for {:?}", self.config.unit, which);
        let ready = || self.regs.is_set(hw::ISR, flag.bits());
        wait::wait_for(self.wait, ready).map_err(|timeout| {
            warn!(
                "ADC{}: {:?} still clear after {} polls",
                self.config.unit, which, timeout.polls
            );
            AdcError::Timeout(which)
        })
    }
}

impl<R: RegisterAccess> AnalogInput for Adc<'_, R> {
    type Error = AdcError;

    fn start(&mut self) -> Result<(), AdcError> {
        Adc::start(self)
    }

    fn read(&mut self) -> Result<u32, AdcError> {
        Adc::read(self)
    }

    fn try_read(&mut self) -> Result<u32, AdcError> {
        Adc::try_read(self)
    }
}
