//! Memory-mapped register access.
//!
//! Drivers never cast addresses to structs. They hold something that
//! implements [`RegisterAccess`] and address registers by byte offset from
//! the start of the peripheral's register block. On hardware that is
//! [`Mmio`]; in host tests it is a simulated register file.

use core::ptr::{read_volatile, write_volatile};

/// Typed 32-bit access to one peripheral register block.
///
/// All offsets are byte offsets from the block base and must be 4-byte
/// aligned. Methods take `&self` because device registers are interior
/// mutable by nature: a read of a status register can change even though
/// nobody in software wrote to it.
pub trait RegisterAccess {
    /// Read the register at `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`.
    fn write(&self, offset: usize, value: u32);

    /// Read-modify-write the register at `offset`.
    ///
    /// Not atomic. Only sound while the caller is the single writer of the
    /// register.
    #[inline]
    fn modify<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set the bits in `mask`, leaving the others untouched.
    #[inline]
    fn set_bits(&self, offset: usize, mask: u32) {
        self.modify(offset, |v| v | mask);
    }

    /// Clear the bits in `mask`, leaving the others untouched.
    #[inline]
    fn clear_bits(&self, offset: usize, mask: u32) {
        self.modify(offset, |v| v & !mask);
    }

    /// Replace the field selected by `mask` (already shifted) with
    /// `value << shift`.
    #[inline]
    fn write_field(&self, offset: usize, mask: u32, shift: u32, value: u32) {
        self.modify(offset, |v| (v & !mask) | ((value << shift) & mask));
    }

    /// Check whether every bit in `mask` is set.
    #[inline]
    fn is_set(&self, offset: usize, mask: u32) -> bool {
        self.read(offset) & mask == mask
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }
}

/// Volatile access to a register block at a fixed address.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create an accessor for the register block at `base`.
    ///
    /// # Safety
    ///
    /// - `base` must be the address of a mapped peripheral register block
    ///   large enough for every offset the owner will use
    /// - the peripheral's bus clock must be enabled before any access
    /// - only one owner should drive a given block at a time
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the block.
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterAccess for Mmio {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` requires `base` to cover every used offset.
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: see `read`.
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }
}
