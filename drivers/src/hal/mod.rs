//! Hardware Abstraction Layer (HAL) - Platform-Independent Types
//!
//! Configuration records, error types and the traits the drivers in
//! [`crate::peripheral`] implement. Nothing here references registers or
//! addresses.
//!
//! # Available Interfaces
//!
//! - [`adc`]: Analog-to-digital conversion
//! - [`serial`]: Serial port (UART) communication

pub mod adc;
pub mod serial;
