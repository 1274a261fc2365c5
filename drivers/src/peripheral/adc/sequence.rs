//! Packing of the regular conversion sequence into SQR1..SQR4.
//!
//! Slot `i` (1-based, SQ1..SQ16) lives in register `i / 5` at bit
//! `(i % 5) * 6`. Slot 0 of SQR1 is taken by the length field L, which is
//! why SQ1 starts at bit 6 and SQR4 only carries SQ15 and SQ16.

use crate::hal::adc::AdcChannel;
use crate::hw::stm32h743::adc::{
    MAX_SEQUENCE_LEN, SQ_FIELD_MASK, SQ_SLOT_WIDTH, SQ_SLOTS_PER_REGISTER, SQR1_L_MASK,
    SQR1_L_SHIFT,
};

/// Register index (0 = SQR1) and bit shift of 1-based `slot`.
pub const fn slot_position(slot: usize) -> (usize, u32) {
    let register = slot / SQ_SLOTS_PER_REGISTER;
    let shift = (slot % SQ_SLOTS_PER_REGISTER) as u32 * SQ_SLOT_WIDTH;
    (register, shift)
}

/// `word` with the field at `shift` replaced by `channel`.
pub const fn insert(word: u32, shift: u32, channel: AdcChannel) -> u32 {
    (word & !(SQ_FIELD_MASK << shift)) | ((channel.index() as u32) << shift)
}

/// Pack `channels` and their count into an image of SQR1..SQR4.
///
/// Slots past the sequence keep whatever `regs` held. The caller checks
/// that `channels` holds 1 to 16 entries.
pub fn pack(regs: &mut [u32; 4], channels: &[AdcChannel]) {
    debug_assert!((1..=MAX_SEQUENCE_LEN).contains(&channels.len()));
    let len = channels.len() as u32;
    regs[0] = (regs[0] & !SQR1_L_MASK) | (((len - 1) << SQR1_L_SHIFT) & SQR1_L_MASK);
    for (i, &channel) in channels.iter().enumerate() {
        let (register, shift) = slot_position(i + 1);
        regs[register] = insert(regs[register], shift, channel);
    }
}

/// Sequence decoded from SQR1..SQR4.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProgrammedSequence {
    len: usize,
    channels: [AdcChannel; MAX_SEQUENCE_LEN],
}

impl ProgrammedSequence {
    pub fn as_slice(&self) -> &[AdcChannel] {
        &self.channels[..self.len]
    }
}

/// Decode the length field and the slots it covers.
///
/// Field values above 19 cannot come from [`pack`]; they decode as
/// channel 19 rather than failing, since the 5-bit field has no room for
/// an error marker.
pub fn unpack(regs: &[u32; 4]) -> ProgrammedSequence {
    let len = ((regs[0] & SQR1_L_MASK) >> SQR1_L_SHIFT) as usize + 1;
    let mut channels = [AdcChannel::MIN; MAX_SEQUENCE_LEN];
    for (i, channel) in channels.iter_mut().enumerate().take(len) {
        let (register, shift) = slot_position(i + 1);
        let index = ((regs[register] >> shift) & SQ_FIELD_MASK) as u8;
        *channel = AdcChannel::new(index.min(AdcChannel::MAX)).unwrap_or(AdcChannel::MIN);
    }
    ProgrammedSequence { len, channels }
}
