//! Peripheral Drivers
//!
//! # Available Peripherals
//!
//! - [`adc`]: STM32H7 analog-to-digital converter
//! - [`usart`]: STM32H7 USART/UART

pub mod adc;
pub mod usart;

#[cfg(test)]
pub mod sim;
