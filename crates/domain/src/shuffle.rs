// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seeded, reproducible permutations.
//!
//! The scheduler and the selection pages must produce the same order after a
//! session is rehydrated, so permutations are driven by a fixed `SplitMix64`
//! sequence rather than a library RNG whose stream may change between
//! releases.

/// A `SplitMix64` sequence.
#[derive(Debug, Clone)]
pub struct SeededSequence {
    state: u64,
}

impl SeededSequence {
    /// Starts a sequence from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Returns the next value in the sequence.
    pub const fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z: u64 = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Returns a value in `0..bound`. `bound` must be positive.
    pub fn below(&mut self, bound: usize) -> usize {
        let bound_u64: u64 = u64::try_from(bound).unwrap_or(u64::MAX);
        usize::try_from(self.next_u64() % bound_u64).unwrap_or(0)
    }
}

/// Derives an independent seed for a sub-sequence (e.g., one round).
#[must_use]
pub const fn derive_seed(seed: u64, salt: u64) -> u64 {
    let mut sequence: SeededSequence =
        SeededSequence::new(seed ^ salt.wrapping_mul(0xD6E8_FEB8_6659_FD93));
    sequence.next_u64()
}

/// Shuffles `items` in place with a Fisher-Yates pass driven by `seed`.
pub fn seeded_shuffle<T>(items: &mut [T], seed: u64) {
    if items.len() <= 1 {
        return;
    }
    let mut sequence: SeededSequence = SeededSequence::new(seed);
    for i in (1..items.len()).rev() {
        let j: usize = sequence.below(i + 1);
        items.swap(i, j);
    }
}
