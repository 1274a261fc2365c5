//! STM32H7 Analog and Serial Drivers
//!
//! Polled ADC and USART/UART drivers for the STM32H743, split into layers:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent configuration types and traits
//! - [`hw`]: Register offsets and bit definitions
//! - [`platform`]: Instance address resolution (SoC level)
//! - [`peripheral`]: The drivers themselves
//!
//! Register access goes through [`common::RegisterAccess`], so the drivers
//! run unchanged against a simulated register file in host tests.
//!
//! # Usage Example
//!
//! ```no_run
//! use common::WaitPolicy;
//! use h7_drivers::hal::adc::*;
//! use h7_drivers::peripheral::adc::Adc;
//!
//! static CONFIG: AdcConfig = AdcConfig::new(1, Resolution::Bits16, ConversionMode::Continuous);
//!
//! fn sample() -> Result<u32, AdcError> {
//!     let channels = [AdcChannel::new(4).unwrap()];
//!     // ADC clock enabled by the caller.
//!     let mut adc = unsafe { Adc::init(&CONFIG, WaitPolicy::DEFAULT)? };
//!     adc.configure(&SequenceConfig::new(&channels))?;
//!     adc.start()?;
//!     adc.read()
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(dead_code)]

pub mod hal;
pub mod hw;
pub mod peripheral;
pub mod platform;

// Re-export commonly used types
pub use hal::adc::{AdcConfig, AdcError, AnalogInput, SequenceConfig};
pub use hal::serial::{NonBlockingSerial, SerialConfig, SerialError, SerialPort, SerialWriter};
pub use peripheral::adc::Adc;
pub use peripheral::usart::Usart;
pub use platform::{CurrentPlatform, Platform};
