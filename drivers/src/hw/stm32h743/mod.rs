//! STM32H743 register maps (RM0433).

pub mod adc;
pub mod memory;
pub mod usart;
