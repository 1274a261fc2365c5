//! Simulated register file for host tests.
//!
//! Stores words by offset, records every write, and can be scripted to
//! raise status bits when a control bit is written, which is enough to
//! walk the drivers through their handshakes.

use common::RegisterAccess;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

struct Reaction {
    trigger_offset: usize,
    trigger_bits: u32,
    status_offset: usize,
    status_bits: u32,
}

#[derive(Default)]
pub struct SimRegisters {
    words: RefCell<BTreeMap<usize, u32>>,
    writes: RefCell<Vec<(usize, u32)>>,
    accesses: Cell<usize>,
    reactions: RefCell<Vec<Reaction>>,
    write_one_to_clear: RefCell<BTreeSet<usize>>,
    queues: RefCell<BTreeMap<usize, VecDeque<u32>>>,
}

impl SimRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register without recording a write.
    pub fn preset(&self, offset: usize, value: u32) -> &Self {
        self.words.borrow_mut().insert(offset, value);
        self
    }

    /// Writes to `offset` clear the bits written instead of storing them.
    pub fn clear_on_write(&self, offset: usize) -> &Self {
        self.write_one_to_clear.borrow_mut().insert(offset);
        self
    }

    /// Whenever a write to `trigger_offset` has all of `trigger_bits` set,
    /// OR `status_bits` into `status_offset`.
    pub fn raise_on_write(
        &self,
        trigger_offset: usize,
        trigger_bits: u32,
        status_offset: usize,
        status_bits: u32,
    ) -> &Self {
        self.reactions.borrow_mut().push(Reaction {
            trigger_offset,
            trigger_bits,
            status_offset,
            status_bits,
        });
        self
    }

    /// Reads of `offset` return these values in order before falling back
    /// to the stored word.
    pub fn queue_reads(&self, offset: usize, values: impl IntoIterator<Item = u32>) -> &Self {
        self.queues
            .borrow_mut()
            .entry(offset)
            .or_default()
            .extend(values);
        self
    }

    /// Current value, without counting as an access.
    pub fn peek(&self, offset: usize) -> u32 {
        self.words.borrow().get(&offset).copied().unwrap_or(0)
    }

    /// Every write in order.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.borrow().clone()
    }

    /// Values written to `offset`, in order.
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.writes
            .borrow()
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Number of reads and writes performed through [`RegisterAccess`].
    pub fn accesses(&self) -> usize {
        self.accesses.get()
    }
}

impl RegisterAccess for SimRegisters {
    fn read(&self, offset: usize) -> u32 {
        self.accesses.set(self.accesses.get() + 1);
        let queued = self
            .queues
            .borrow_mut()
            .get_mut(&offset)
            .and_then(VecDeque::pop_front);
        queued.unwrap_or_else(|| self.peek(offset))
    }

    fn write(&self, offset: usize, value: u32) {
        self.accesses.set(self.accesses.get() + 1);
        self.writes.borrow_mut().push((offset, value));

        let mut words = self.words.borrow_mut();
        let word = words.entry(offset).or_insert(0);
        if self.write_one_to_clear.borrow().contains(&offset) {
            *word &= !value;
        } else {
            *word = value;
        }

        for reaction in self.reactions.borrow().iter() {
            let fired = value & reaction.trigger_bits == reaction.trigger_bits;
            if reaction.trigger_offset == offset && fired {
                *words.entry(reaction.status_offset).or_insert(0) |= reaction.status_bits;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reactions_and_w1c() {
        let sim = SimRegisters::new();
        sim.clear_on_write(0x00).raise_on_write(0x08, 0b100, 0x00, 0b1);

        sim.write(0x08, 0b110);
        assert_eq!(sim.peek(0x00), 0b1);
        sim.write(0x00, 0b1);
        assert_eq!(sim.peek(0x00), 0);
        assert_eq!(sim.writes(), vec![(0x08, 0b110), (0x00, 0b1)]);
        assert_eq!(sim.accesses(), 2);
    }

    #[test]
    fn queued_reads_drain_first() {
        let sim = SimRegisters::new();
        sim.preset(0x24, 9).queue_reads(0x24, [1, 2]);
        assert_eq!(sim.read(0x24), 1);
        assert_eq!(sim.read(0x24), 2);
        assert_eq!(sim.read(0x24), 9);
    }
}
