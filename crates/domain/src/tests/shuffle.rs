// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{SeededSequence, derive_seed, seeded_shuffle};

#[test]
fn test_shuffle_is_a_permutation() {
    let mut items: Vec<u32> = (0..50).collect();
    seeded_shuffle(&mut items, 99);

    let mut sorted: Vec<u32> = items.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..50).collect::<Vec<u32>>());
}

#[test]
fn test_shuffle_is_reproducible() {
    let mut a: Vec<u32> = (0..16).collect();
    let mut b: Vec<u32> = (0..16).collect();
    seeded_shuffle(&mut a, 1234);
    seeded_shuffle(&mut b, 1234);
    assert_eq!(a, b);
}

#[test]
fn test_different_seeds_usually_differ() {
    let mut a: Vec<u32> = (0..16).collect();
    let mut b: Vec<u32> = (0..16).collect();
    seeded_shuffle(&mut a, 1);
    seeded_shuffle(&mut b, 2);
    assert_ne!(a, b);
}

#[test]
fn test_shuffle_handles_tiny_inputs() {
    let mut empty: Vec<u32> = Vec::new();
    seeded_shuffle(&mut empty, 5);
    assert!(empty.is_empty());

    let mut one: Vec<u32> = vec![7];
    seeded_shuffle(&mut one, 5);
    assert_eq!(one, vec![7]);
}

#[test]
fn test_below_stays_in_range() {
    let mut sequence: SeededSequence = SeededSequence::new(derive_seed(3, 4));
    for bound in 1..64 {
        assert!(sequence.below(bound) < bound);
    }
}

#[test]
fn test_derive_seed_separates_salts() {
    assert_ne!(derive_seed(10, 1), derive_seed(10, 2));
    assert_eq!(derive_seed(10, 1), derive_seed(10, 1));
}
