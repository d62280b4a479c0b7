//! Injectable random source
//!
//! Every random draw in the simulation is a uniform index pick. Keeping it
//! behind one small trait lets tests script exact sequences while the game
//! runs on a seeded PCG stream.

use rand::Rng;
use rand_pcg::Pcg32;

/// Uniform integer generator used by the simulation
pub trait RandomSource {
    /// Return a uniformly distributed index in `[0, len)`.
    ///
    /// Callers never pass `len == 0`.
    fn next_index(&mut self, len: usize) -> usize;
}

impl RandomSource for Pcg32 {
    fn next_index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_index(&mut self, len: usize) -> usize {
        (**self).next_index(len)
    }
}

/// Fisher-Yates shuffle from the back, one draw per swap
pub fn shuffle<T>(items: &mut [T], rng: &mut impl RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

/// Pick one element uniformly, or `None` for an empty slice
pub fn pick<T: Copy>(items: &[T], rng: &mut impl RandomSource) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    Some(items[rng.next_index(items.len())])
}

/// Replays a fixed list of draws, then repeats the last one.
///
/// Each draw is reduced modulo the requested length so scripts stay valid
/// even when the candidate count differs from what the test author expected.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: Vec<usize>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(draws: impl Into<Vec<usize>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }

    /// Always returns index 0
    pub fn zeros() -> Self {
        Self::new(vec![0])
    }

    /// Number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_index(&mut self, len: usize) -> usize {
        let raw = match self.draws.get(self.cursor) {
            Some(&v) => v,
            None => self.draws.last().copied().unwrap_or(0),
        };
        self.cursor += 1;
        raw % len.max(1)
    }
}
