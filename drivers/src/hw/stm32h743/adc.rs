//! ADC register map.
//!
//! Offsets are relative to the instance base (ADC1/2/3) or, for the
//! `common` module, to the common block shared by a pair of instances.

use bitflags::bitflags;

// Register offsets
pub const ISR: usize = 0x00;
pub const IER: usize = 0x04;
pub const CR: usize = 0x08;
pub const CFGR: usize = 0x0C;
pub const CFGR2: usize = 0x10;
pub const SMPR1: usize = 0x14;
pub const SMPR2: usize = 0x18;
pub const PCSEL: usize = 0x1C;
pub const SQR1: usize = 0x30;
pub const SQR2: usize = 0x34;
pub const SQR3: usize = 0x38;
pub const SQR4: usize = 0x3C;
pub const DR: usize = 0x40;

/// Regular sequence registers in slot order.
pub const SQR: [usize; 4] = [SQR1, SQR2, SQR3, SQR4];

bitflags! {
    /// Interrupt and status register.
    ///
    /// Flags are cleared by writing 1.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Isr: u32 {
        const ADRDY = 1 << 0;
        const EOSMP = 1 << 1;
        const EOC = 1 << 2;
        const EOS = 1 << 3;
        const OVR = 1 << 4;
        const JEOC = 1 << 5;
        const JEOS = 1 << 6;
        const AWD1 = 1 << 7;
        const AWD2 = 1 << 8;
        const AWD3 = 1 << 9;
        const JQOVF = 1 << 10;
        const LDORDY = 1 << 12;
    }
}

bitflags! {
    /// Control register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Cr: u32 {
        const ADEN = 1 << 0;
        const ADDIS = 1 << 1;
        const ADSTART = 1 << 2;
        const JADSTART = 1 << 3;
        const ADSTP = 1 << 4;
        const JADSTP = 1 << 5;
        const ADVREGEN = 1 << 28;
        const DEEPPWD = 1 << 29;
        const ADCALDIF = 1 << 30;
        const ADCAL = 1 << 31;
    }
}

bitflags! {
    /// Single-bit fields of the configuration register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Cfgr: u32 {
        const OVRMOD = 1 << 12;
        const CONT = 1 << 13;
        const AUTDLY = 1 << 14;
        const DISCEN = 1 << 16;
    }
}

/// CFGR.RES, resolution encoding.
pub const CFGR_RES_SHIFT: u32 = 2;
pub const CFGR_RES_MASK: u32 = 0b111 << CFGR_RES_SHIFT;

/// SQR1.L, number of conversions minus one.
pub const SQR1_L_SHIFT: u32 = 0;
pub const SQR1_L_MASK: u32 = 0b1111 << SQR1_L_SHIFT;

/// Each SQx field is 5 bits wide inside a 6-bit slot.
pub const SQ_FIELD_MASK: u32 = 0x1F;
pub const SQ_SLOT_WIDTH: u32 = 6;
pub const SQ_SLOTS_PER_REGISTER: usize = 5;

/// Longest regular sequence the hardware accepts.
pub const MAX_SEQUENCE_LEN: usize = 16;

pub mod common {
    //! Registers of the block shared by an ADC pair.

    pub const CSR: usize = 0x00;
    pub const CCR: usize = 0x08;
    pub const CDR: usize = 0x0C;

    /// CCR.CKMODE, synchronous clock selection.
    pub const CCR_CKMODE_SHIFT: u32 = 16;
    pub const CCR_CKMODE_MASK: u32 = 0b11 << CCR_CKMODE_SHIFT;

    /// CKMODE encoding for adc_sclk / 2 (HCLK/2).
    pub const CKMODE_HCLK_DIV2: u32 = 0b10;
}
