//! STM32H743 memory map.
//!
//! ADC1 and ADC2 share the AHB1 bus and one common block; ADC3 sits alone
//! on AHB4. The USARTs are spread over APB1 and APB2, so only UART4's
//! APB1 neighbours follow a uniform stride.

use super::layout::{AdcBlock, AdcLayout, ChannelLayout};
use super::Platform;
use crate::hw::stm32h743::memory::*;

/// Stride description of the ADC units. Matches the table for units 1–3
/// only; do not extrapolate it to other parts.
pub const ADC_LAYOUT: AdcLayout = AdcLayout {
    base: ADC1_BASE,
    base_unit: 1,
    unit_stride: ADC2_BASE - ADC1_BASE,
    group_size: 3,
    bus_jump: ADC3_BASE - ADC1_BASE,
    common_offset: ADC12_COMMON_BASE - ADC1_BASE,
};

/// Stride description of the APB1 UARTs around UART4. Valid for
/// channels 2–5.
pub const USART_LAYOUT: ChannelLayout = ChannelLayout {
    reference_base: UART4_BASE,
    reference_channel: 4,
    stride: 0x400,
};

/// ADC units by number.
pub const ADC_UNITS: [(u8, AdcBlock); 3] = [
    (1, AdcBlock { base: ADC1_BASE, common: ADC12_COMMON_BASE }),
    (2, AdcBlock { base: ADC2_BASE, common: ADC12_COMMON_BASE }),
    (3, AdcBlock { base: ADC3_BASE, common: ADC3_COMMON_BASE }),
];

/// USART/UART channels by number.
pub const USART_CHANNELS: [(u8, usize); 8] = [
    (1, USART1_BASE),
    (2, USART2_BASE),
    (3, USART3_BASE),
    (4, UART4_BASE),
    (5, UART5_BASE),
    (6, USART6_BASE),
    (7, UART7_BASE),
    (8, UART8_BASE),
];

/// HSI after reset; the default USART kernel clock.
pub const HSI_HZ: u32 = 64_000_000;

pub struct Stm32h743Platform;

impl Platform for Stm32h743Platform {
    fn name() -> &'static str {
        "STM32H743"
    }

    fn adc_unit(unit: u8) -> Option<AdcBlock> {
        ADC_UNITS
            .iter()
            .find(|(n, _)| *n == unit)
            .map(|(_, block)| *block)
    }

    fn usart_channel(channel: u8) -> Option<usize> {
        USART_CHANNELS
            .iter()
            .find(|(n, _)| *n == channel)
            .map(|(_, base)| *base)
    }

    fn usart_kernel_clock_hz() -> u32 {
        HSI_HZ
    }
}
