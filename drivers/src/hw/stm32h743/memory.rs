//! Peripheral base addresses.

/// ADC1, first unit of the AHB1 pair.
pub const ADC1_BASE: usize = 0x4002_2000;
/// ADC2, second unit of the AHB1 pair.
pub const ADC2_BASE: usize = 0x4002_2100;
/// Common registers shared by ADC1 and ADC2.
pub const ADC12_COMMON_BASE: usize = 0x4002_2300;
/// ADC3, alone on AHB4.
pub const ADC3_BASE: usize = 0x5802_6000;
/// Common registers of ADC3.
pub const ADC3_COMMON_BASE: usize = 0x5802_6300;

// APB2
pub const USART1_BASE: usize = 0x4001_1000;
pub const USART6_BASE: usize = 0x4001_1400;

// APB1
pub const USART2_BASE: usize = 0x4000_4400;
pub const USART3_BASE: usize = 0x4000_4800;
pub const UART4_BASE: usize = 0x4000_4C00;
pub const UART5_BASE: usize = 0x4000_5000;
pub const UART7_BASE: usize = 0x4000_7800;
pub const UART8_BASE: usize = 0x4000_7C00;
