use std::cell::Cell;

/// How many times each queue is probed before falling back to a blocking
/// operation on the start index.
const PROBE_ROUNDS: usize = 4;

/// The bounded-probe scan used both to enqueue and to dequeue across a pool's
/// queues.
///
/// Given a start index, [`probe`](Self::probe) yields `4 * N` candidate
/// indices; the caller attempts the non-blocking variant of its operation on
/// each in turn and stops at the first success. If every attempt fails, the
/// caller runs the forced (blocking) variant on the start index, which
/// guarantees progress. Bounded probing trades a little extra latency for much
/// lower lock contention when many threads hit the pool at once.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Placement {
    size: usize,
}

impl Placement {
    pub(crate) fn new(size: usize) -> Self {
        debug_assert!(size > 0);
        Self { size }
    }

    /// Candidate scan `start, start+1, …, start + 4N - 1`, all modulo `N`.
    pub(crate) fn probe(&self, start: usize) -> impl Iterator<Item = usize> {
        let size = self.size;
        (start..start + PROBE_ROUNDS * size).map(move |index| index % size)
    }

    /// A start index from this thread's decorrelation counter.
    pub(crate) fn decorrelated_start(&self) -> usize {
        decorrelation_next() % self.size
    }
}

thread_local! {
    static DECORRELATION: Cell<u8> = const { Cell::new(0) };
}

/// Thread-local rotating counter, wrapping modulo 256.
///
/// This is a deliberately cheap sequence, not a uniform or cryptographic RNG.
/// Its only job is to decorrelate which queue different threads probe first so
/// submissions spread across the pool instead of hammering one queue.
fn decorrelation_next() -> usize {
    DECORRELATION.with(|counter| {
        let value = counter.get().wrapping_add(1);
        counter.set(value);
        value as usize
    })
}
