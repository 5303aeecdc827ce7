//! Two-level rank directory for O(1) rank queries.
//!
//! Stores cumulative popcounts at two granularities over a word array:
//!
//! - **L1**: absolute cumulative rank every 128 words (8192 bits), one
//!   `u32` per superblock.
//! - **L2**: cumulative rank relative to the enclosing superblock every
//!   8 words (512 bits), one `u16` per block.
//!
//! `rank_at_word(words, w)` resolves to two array lookups plus a popcount
//! over at most 7 words. Total overhead is ~3.5% of the bitmap.

#[cfg(not(test))]
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Words per L1 superblock.
const L1_WORDS: usize = 128;

/// Words per L2 block.
const L2_WORDS: usize = 8;

/// Two-level rank directory over an externally held word array.
///
/// The directory does not own the bitmap; queries take the same `words`
/// slice that was passed to [`RankDirectory::build`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankDirectory {
    /// Absolute cumulative rank at each superblock boundary.
    l1: Vec<u32>,
    /// Cumulative rank at each block boundary, relative to its superblock.
    l2: Vec<u16>,
    /// Total popcount across all words.
    total: u64,
}

impl RankDirectory {
    /// Create an empty rank directory.
    pub fn empty() -> Self {
        Self {
            l1: Vec::new(),
            l2: Vec::new(),
            total: 0,
        }
    }

    /// Build a rank directory from bitmap words.
    pub fn build(words: &[u64]) -> Self {
        if words.is_empty() {
            return Self::empty();
        }

        let num_superblocks = words.len().div_ceil(L1_WORDS);
        let num_blocks = words.len().div_ceil(L2_WORDS);

        let mut l1 = Vec::with_capacity(num_superblocks);
        let mut l2 = Vec::with_capacity(num_blocks);
        let mut absolute: u64 = 0;

        for sb in 0..num_superblocks {
            l1.push(absolute as u32);

            let sb_start = sb * L1_WORDS;
            let sb_end = (sb_start + L1_WORDS).min(words.len());
            let mut relative: u16 = 0;

            let blocks_in_sb = (sb_end - sb_start).div_ceil(L2_WORDS);
            for b in 0..blocks_in_sb {
                l2.push(relative);

                let block_start = sb_start + b * L2_WORDS;
                let block_end = (block_start + L2_WORDS).min(sb_end);
                for &word in &words[block_start..block_end] {
                    let ones = word.count_ones() as u16;
                    relative += ones;
                    absolute += ones as u64;
                }
            }
        }

        Self {
            l1,
            l2,
            total: absolute,
        }
    }

    /// Number of 1-bits in `words[0..word_idx]`.
    ///
    /// The `words` slice must be the bitmap passed to [`RankDirectory::build`].
    /// Indices at or past the end of the bitmap return the total popcount.
    #[inline]
    pub fn rank_at_word(&self, words: &[u64], word_idx: usize) -> usize {
        if self.l1.is_empty() {
            return 0;
        }
        if word_idx >= words.len() {
            return self.total as usize;
        }

        let sb_idx = word_idx / L1_WORDS;
        let block_idx = word_idx / L2_WORDS;
        let mut count = self.l1[sb_idx] as usize + self.l2[block_idx] as usize;

        let block_start = block_idx * L2_WORDS;
        for &word in &words[block_start..word_idx] {
            count += word.count_ones() as usize;
        }

        count
    }

    /// Total number of 1-bits in the indexed bitmap.
    #[inline]
    pub fn total(&self) -> usize {
        self.total as usize
    }

    /// Heap memory used by the directory, in bytes.
    pub fn heap_size(&self) -> usize {
        self.l1.len() * 4 + self.l2.len() * 2
    }
}
