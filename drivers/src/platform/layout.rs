//! Address arithmetic for peripheral families with regular memory maps.
//!
//! These layouts describe how a vendor places consecutive instances of a
//! peripheral. They only hold for the variant they were measured on; the
//! per-platform address tables are what the drivers actually resolve
//! through, and each table is checked against its layout in tests.

/// `base + count * step`, or `None` on overflow.
const fn step_from(base: usize, count: usize, step: usize) -> Option<usize> {
    match count.checked_mul(step) {
        Some(distance) => base.checked_add(distance),
        None => None,
    }
}

/// Register blocks of one ADC instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AdcBlock {
    /// Instance registers (ISR, CR, CFGR, SQRx, DR, ...).
    pub base: usize,
    /// Common registers shared with the other unit of its pair.
    pub common: usize,
}

/// ADC units grouped per bus.
///
/// Units are numbered from `base_unit` and placed `group_size - 1` per bus
/// at `unit_stride` apart; moving to the next bus adds `bus_jump`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AdcLayout {
    /// Address of unit `base_unit`.
    pub base: usize,
    /// Index of the first unit (1 for ADC1).
    pub base_unit: u8,
    /// Distance between neighbouring units on the same bus.
    pub unit_stride: usize,
    /// Unit-number period after which the next bus starts.
    pub group_size: u8,
    /// Distance from the first bus group to the next.
    pub bus_jump: usize,
    /// Offset of the common block from the pair's first unit.
    pub common_offset: usize,
}

impl AdcLayout {
    /// Base address of `unit` according to the stride formula.
    ///
    /// `offset = ((unit - base_unit) mod (group_size - 1)) * unit_stride
    ///         + (unit / group_size) * bus_jump`
    ///
    /// Returns `None` when `unit` is below `base_unit` or the layout is
    /// degenerate (`group_size < 2`).
    pub const fn compute(&self, unit: u8) -> Option<usize> {
        if unit < self.base_unit || self.group_size < 2 {
            return None;
        }
        let within = ((unit - self.base_unit) % (self.group_size - 1)) as usize;
        let group = (unit / self.group_size) as usize;
        match step_from(self.base, within, self.unit_stride) {
            Some(unit_base) => step_from(unit_base, group, self.bus_jump),
            None => None,
        }
    }

    /// Common block of the pair `unit` belongs to.
    ///
    /// The common block sits at a fixed offset from the pair's first unit,
    /// not from `unit` itself.
    pub const fn common(&self, unit: u8) -> Option<usize> {
        if unit < self.base_unit || self.group_size < 2 {
            return None;
        }
        let group = (unit / self.group_size) as usize;
        match step_from(self.base, group, self.bus_jump) {
            Some(pair_base) => pair_base.checked_add(self.common_offset),
            None => None,
        }
    }

    /// Both blocks of `unit`.
    pub const fn block(&self, unit: u8) -> Option<AdcBlock> {
        match (self.compute(unit), self.common(unit)) {
            (Some(base), Some(common)) => Some(AdcBlock { base, common }),
            _ => None,
        }
    }
}

/// Serial channels at a fixed stride from a reference channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Address of `reference_channel`.
    pub reference_base: usize,
    /// Channel number the reference address belongs to.
    pub reference_channel: u8,
    /// Distance between consecutive channel numbers.
    pub stride: usize,
}

impl ChannelLayout {
    /// `reference_base + (channel - reference_channel) * stride`, or `None`
    /// when that leaves the address space.
    pub const fn compute(&self, channel: u8) -> Option<usize> {
        if channel >= self.reference_channel {
            let steps = (channel - self.reference_channel) as usize;
            step_from(self.reference_base, steps, self.stride)
        } else {
            let steps = (self.reference_channel - channel) as usize;
            match steps.checked_mul(self.stride) {
                Some(distance) => self.reference_base.checked_sub(distance),
                None => None,
            }
        }
    }
}
