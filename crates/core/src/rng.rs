//! RNG module - 7-bag random piece generation
//!
//! Each bag holds one of every kind in a freshly shuffled order. Draws consume the bag front to
//! back and a new bag is shuffled the moment the old one runs out, so every bag-aligned run of
//! seven draws is a permutation of all seven kinds.
//!
//! The generator is a seeded LCG so that a seed fully determines the piece sequence.

use crate::types::{PieceKind, NEXT_QUEUE_LEN, PIECE_COUNT};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform value in `[0, max)`
    ///
    /// Uses the high 16 bits (the LCG's low bits have short periods) and rejects the tail of
    /// the range that would bias small results. `max` must be in `1..=65536`.
    pub fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0 && max <= 1 << 16);
        let zone = (1u32 << 16) - ((1u32 << 16) % max);
        loop {
            let v = self.next_u32() >> 16;
            if v < zone {
                return v % max;
            }
        }
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceBag {
    bag: [PieceKind; PIECE_COUNT],
    /// Index of the next undrawn piece; `PIECE_COUNT` means exhausted
    bag_index: usize,
    rng: SimpleRng,
}

impl PieceBag {
    pub fn new(seed: u32) -> Self {
        Self {
            bag: PieceKind::ALL,
            bag_index: PIECE_COUNT,
            rng: SimpleRng::new(seed),
        }
    }

    fn refill_bag(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// Draw the next piece, shuffling a new bag first when the current one is empty
    pub fn next_piece(&mut self) -> PieceKind {
        if self.bag_index >= PIECE_COUNT {
            self.refill_bag();
        }
        let piece = self.bag[self.bag_index];
        self.bag_index += 1;
        piece
    }

    /// Pieces left in the current bag
    pub fn remaining(&self) -> &[PieceKind] {
        &self.bag[self.bag_index.min(PIECE_COUNT)..]
    }
}

/// Fixed-depth preview of upcoming pieces, refilled from a [`PieceBag`]
#[derive(Debug, Clone)]
pub struct NextQueue {
    slots: [PieceKind; NEXT_QUEUE_LEN],
    bag: PieceBag,
}

impl NextQueue {
    pub fn new(seed: u32) -> Self {
        let mut bag = PieceBag::new(seed);
        let mut slots = [PieceKind::I; NEXT_QUEUE_LEN];
        for slot in &mut slots {
            *slot = bag.next_piece();
        }
        Self { slots, bag }
    }

    /// Take the front piece and append a fresh one from the bag
    pub fn pop(&mut self) -> PieceKind {
        let front = self.slots[0];
        self.slots.copy_within(1.., 0);
        self.slots[NEXT_QUEUE_LEN - 1] = self.bag.next_piece();
        front
    }

    pub fn as_array(&self) -> [PieceKind; NEXT_QUEUE_LEN] {
        self.slots
    }
}
