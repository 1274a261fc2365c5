//! Low-level building blocks shared by the peripheral drivers.
//!
//! - [`mmio`]: register access capability and its volatile implementation
//! - [`wait`]: bounded busy-wait on hardware status flags

#![cfg_attr(not(test), no_std)]

pub mod mmio;
pub mod wait;

pub use mmio::{Mmio, RegisterAccess};
pub use wait::{TimedOut, WaitPolicy};
