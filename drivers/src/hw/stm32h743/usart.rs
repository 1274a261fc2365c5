//! USART/UART register map.

use bitflags::bitflags;

// Register offsets
pub const CR1: usize = 0x00;
pub const CR2: usize = 0x04;
pub const CR3: usize = 0x08;
pub const BRR: usize = 0x0C;
pub const GTPR: usize = 0x10;
pub const RTOR: usize = 0x14;
pub const RQR: usize = 0x18;
pub const ISR: usize = 0x1C;
pub const ICR: usize = 0x20;
pub const RDR: usize = 0x24;
pub const TDR: usize = 0x28;
pub const PRESC: usize = 0x2C;

bitflags! {
    /// Control register 1.
    ///
    /// M0, PCE and PS are only writable while UE is clear.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Cr1: u32 {
        const UE = 1 << 0;
        const UESM = 1 << 1;
        const RE = 1 << 2;
        const TE = 1 << 3;
        const IDLEIE = 1 << 4;
        const RXNEIE = 1 << 5;
        const TCIE = 1 << 6;
        const TXEIE = 1 << 7;
        const PEIE = 1 << 8;
        const PS = 1 << 9;
        const PCE = 1 << 10;
        const WAKE = 1 << 11;
        const M0 = 1 << 12;
        const MME = 1 << 13;
        const CMIE = 1 << 14;
        const OVER8 = 1 << 15;
        const M1 = 1 << 28;
        const FIFOEN = 1 << 29;
    }
}

bitflags! {
    /// Interrupt and status register (FIFO disabled names).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Isr: u32 {
        const PE = 1 << 0;
        const FE = 1 << 1;
        const NE = 1 << 2;
        const ORE = 1 << 3;
        const IDLE = 1 << 4;
        const RXNE = 1 << 5;
        const TC = 1 << 6;
        const TXE = 1 << 7;
        const BUSY = 1 << 16;
        const TEACK = 1 << 21;
        const REACK = 1 << 22;
    }
}

/// CR2.STOP
pub const CR2_STOP_SHIFT: u32 = 12;
pub const CR2_STOP_MASK: u32 = 0b11 << CR2_STOP_SHIFT;

/// BRR is 16 bits; values below 16 are illegal with 16x oversampling.
pub const BRR_MIN: u32 = 0x10;
pub const BRR_MAX: u32 = 0xFFFF;

/// Data registers carry 9 significant bits; the drivers use 8.
pub const DATA_MASK: u32 = 0xFF;
