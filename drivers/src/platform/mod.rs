//! Platform Abstraction Layer
//!
//! Each supported chip variant describes where its peripheral instances
//! live. Drivers resolve logical unit/channel numbers through the
//! [`Platform`] selected at build time, never through ad-hoc address math.
//!
//! # Usage
//!
//! ```ignore
//! use h7_drivers::platform::{CurrentPlatform, Platform};
//!
//! let adc3 = CurrentPlatform::adc_unit(3).expect("ADC3 exists");
//! let uart4 = CurrentPlatform::usart_channel(4).expect("UART4 exists");
//! ```

pub mod layout;

pub use layout::{AdcBlock, AdcLayout, ChannelLayout};

/// Memory-map knowledge for one chip variant.
pub trait Platform {
    /// Platform name for debugging
    fn name() -> &'static str;

    /// Register blocks of ADC `unit` (1-based), or `None` if the variant
    /// has no such unit.
    fn adc_unit(unit: u8) -> Option<AdcBlock>;

    /// Register block of USART/UART `channel` (1-based), or `None` if the
    /// variant has no such channel.
    fn usart_channel(channel: u8) -> Option<usize>;

    /// Kernel clock feeding the USARTs after reset, in Hz.
    fn usart_kernel_clock_hz() -> u32;
}

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "stm32h743")] {
        pub mod stm32h743;
        pub use stm32h743::Stm32h743Platform as CurrentPlatform;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features stm32h743"
        );
    }
}
