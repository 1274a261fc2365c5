//! Register maps.
//!
//! Pure data: offsets, flags and field layouts copied from the vendor
//! reference manual. Nothing in here touches hardware.

pub mod stm32h743;
