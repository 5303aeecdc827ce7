//! Sampled select index for accelerated select queries.
//!
//! Stores the word index containing every k-th 1-bit together with the
//! cumulative count of ones before that word. A query jumps to the sampled
//! word in O(1) and finishes with a short linear scan.

#[cfg(not(test))]
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default sample rate for select acceleration.
pub const DEFAULT_SELECT_SAMPLE_RATE: u32 = 256;

/// One sample: word index plus the count of ones before that word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct SampleEntry {
    word_idx: u32,
    cumulative_before: u32,
}

/// Sampled select index.
///
/// With sample rate `k`, the overhead is roughly `8 / k` bytes per set bit;
/// the default rate of 256 costs ~3%.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectIndex {
    /// `samples[i]` locates the `(i * sample_rate)`-th 1-bit.
    samples: Vec<SampleEntry>,
    sample_rate: u32,
}

impl SelectIndex {
    /// Create an empty select index.
    pub fn empty() -> Self {
        Self {
            samples: Vec::new(),
            sample_rate: DEFAULT_SELECT_SAMPLE_RATE,
        }
    }

    /// Build a select index over `words` containing `total_ones` set bits.
    pub fn build(words: &[u64], total_ones: usize, sample_rate: u32) -> Self {
        if words.is_empty() || total_ones == 0 {
            return Self {
                samples: Vec::new(),
                sample_rate,
            };
        }

        let sample_rate = sample_rate.max(1);
        let mut samples = Vec::with_capacity(total_ones / sample_rate as usize + 1);

        let mut count = 0usize;
        let mut next_sample = 0usize;

        for (word_idx, &word) in words.iter().enumerate() {
            let pop = word.count_ones() as usize;

            while next_sample < total_ones && count + pop > next_sample {
                samples.push(SampleEntry {
                    word_idx: word_idx as u32,
                    cumulative_before: count as u32,
                });
                next_sample += sample_rate as usize;
            }

            count += pop;
        }

        Self {
            samples,
            sample_rate,
        }
    }

    /// Locate the scan start for the k-th 1-bit (0-indexed).
    ///
    /// Returns `(start_word, remaining)`: scan forward from `start_word`,
    /// skipping `remaining` ones.
    #[inline]
    pub fn jump_to(&self, k: usize) -> (usize, usize) {
        if self.samples.is_empty() {
            return (0, k);
        }

        let sample_idx = (k / self.sample_rate as usize).min(self.samples.len() - 1);
        let entry = &self.samples[sample_idx];
        (
            entry.word_idx as usize,
            k - entry.cumulative_before as usize,
        )
    }

    /// Heap memory used by the index, in bytes.
    pub fn heap_size(&self) -> usize {
        self.samples.len() * core::mem::size_of::<SampleEntry>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let idx = SelectIndex::build(&[], 0, 256);
        assert_eq!(idx.jump_to(0), (0, 0));
        assert_eq!(idx.jump_to(42), (0, 42));
    }

    #[test]
    fn test_dense_words() {
        let words = vec![0b1111u64; 4];
        let idx = SelectIndex::build(&words, 16, 4);

        // Samples land at ones 0, 4, 8, 12 -> words 0..4.
        assert_eq!(idx.jump_to(0), (0, 0));
        let (word, rem) = idx.jump_to(5);
        assert_eq!((word, rem), (1, 1));
        let (word, rem) = idx.jump_to(15);
        assert_eq!((word, rem), (3, 3));
    }

    #[test]
    fn test_jump_past_last_sample() {
        let words: Vec<u64> = vec![1; 20];
        let idx = SelectIndex::build(&words, 20, 8);

        let (word, rem) = idx.jump_to(19);
        assert!(word <= 19);
        assert_eq!(word + rem, 19);
    }
}
