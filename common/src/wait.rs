//! Busy-waiting on hardware flags.
//!
//! Every handshake in the drivers spins on a status bit. [`WaitPolicy`]
//! decides whether that spin is bounded; the unbounded variant exists for
//! callers that want the classic "hang until the hardware answers"
//! behaviour and accept that a dead peripheral stalls them forever.

use core::fmt;

/// How long a busy-wait may spin before giving up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Spin until the condition holds, however long that takes.
    Forever,
    /// Poll the condition at most this many times.
    Spins(u32),
}

impl WaitPolicy {
    /// Budget used when the caller has no opinion.
    pub const DEFAULT: Self = Self::Spins(1_000_000);
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A bounded wait ran out of budget.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimedOut {
    /// Number of polls performed before giving up.
    pub polls: u64,
}

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition not met after {} polls", self.polls)
    }
}

/// Spin until `ready` returns `true` or the policy's budget is spent.
///
/// `ready` is always evaluated at least once, so a zero budget still
/// succeeds when the flag is already up.
pub fn wait_for<F>(policy: WaitPolicy, mut ready: F) -> Result<(), TimedOut>
where
    F: FnMut() -> bool,
{
    match policy {
        WaitPolicy::Forever => {
            while !ready() {
                core::hint::spin_loop();
            }
            Ok(())
        }
        WaitPolicy::Spins(budget) => {
            let mut polls = 0u64;
            loop {
                polls += 1;
                if ready() {
                    return Ok(());
                }
                if exhausted(polls, budget) {
                    log::trace!("wait abandoned after {} polls", polls);
                    return Err(TimedOut { polls });
                }
                core::hint::spin_loop();
            }
        }
    }
}

/// A budget of `n` allows `n + 1` polls. Counting in `u64` keeps
/// `Spins(u32::MAX)` finite.
const fn exhausted(polls: u64, budget: u32) -> bool {
    polls > budget as u64
}

/// Burn roughly `spins` iterations without looking at any hardware.
///
/// Used for fixed settle times that have no status flag to poll.
#[inline]
pub fn settle(spins: u32) {
    for _ in 0..spins {
        core::hint::spin_loop();
    }
}
