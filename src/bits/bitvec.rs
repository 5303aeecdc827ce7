//! Plain bit vector with integrated rank/select support.
//!
//! [`BitVec`] owns its raw words together with the rank directory and
//! select index built over them. Because the supports are private fields
//! of the vector they describe, cloning, moving, or loading a `BitVec`
//! can never leave a support pointing at a stale bitmap.

#[cfg(not(test))]
use alloc::vec;
#[cfg(not(test))]
use alloc::vec::Vec;

use crate::bits::broadword::select_in_word;
use crate::bits::rank::RankDirectory;
use crate::bits::select::{SelectIndex, DEFAULT_SELECT_SAMPLE_RATE};
use crate::RankSelect;

/// A bit vector with O(1) rank and sampled select.
///
/// # Example
///
/// ```
/// use csa_sampling::bits::BitVec;
/// use csa_sampling::RankSelect;
///
/// let bv = BitVec::from_words(vec![0b1010_1010u64], 8);
/// assert_eq!(bv.rank1(4), 2);
/// assert_eq!(bv.select1(1), Some(3));
/// ```
#[derive(Clone, Debug)]
pub struct BitVec {
    /// Raw bit storage, little-endian bit order within each word.
    words: Vec<u64>,
    /// Number of valid bits.
    len: usize,
    /// Total number of 1-bits (cached).
    ones_count: usize,
    /// Select sample rate used to build `select_idx`.
    sample_rate: u32,
    /// Rank directory over `words`.
    rank_dir: RankDirectory,
    /// Sampled select index over `words`.
    select_idx: SelectIndex,
    /// Sampled select index over the inverted words.
    zero_idx: SelectIndex,
}

impl BitVec {
    /// Create a bit vector from raw u64 words.
    ///
    /// Bits past `len` in the last word are cleared.
    ///
    /// # Panics
    ///
    /// Panics if `len > words.len() * 64`.
    pub fn from_words(words: Vec<u64>, len: usize) -> Self {
        Self::with_sample_rate(words, len, DEFAULT_SELECT_SAMPLE_RATE)
    }

    /// Create a bit vector with an explicit select sample rate.
    pub fn with_sample_rate(mut words: Vec<u64>, len: usize, sample_rate: u32) -> Self {
        assert!(
            len <= words.len().saturating_mul(64),
            "len {} exceeds capacity {}",
            len,
            words.len().saturating_mul(64)
        );

        words.truncate(len.div_ceil(64));
        if len % 64 > 0 {
            let last = words.len() - 1;
            words[last] &= (1u64 << (len % 64)) - 1;
        }

        let ones_count: usize = words.iter().map(|w| w.count_ones() as usize).sum();
        let rank_dir = RankDirectory::build(&words);
        let select_idx = SelectIndex::build(&words, ones_count, sample_rate);

        let inverted: Vec<u64> = words
            .iter()
            .enumerate()
            .map(|(wi, &w)| {
                if wi == words.len() - 1 && len % 64 != 0 {
                    !w & ((1u64 << (len % 64)) - 1)
                } else {
                    !w
                }
            })
            .collect();
        let zero_idx = SelectIndex::build(&inverted, len - ones_count, sample_rate);

        Self {
            words,
            len,
            ones_count,
            sample_rate,
            rank_dir,
            select_idx,
            zero_idx,
        }
    }

    /// Create an empty bit vector.
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
            ones_count: 0,
            sample_rate: DEFAULT_SELECT_SAMPLE_RATE,
            rank_dir: RankDirectory::empty(),
            select_idx: SelectIndex::empty(),
            zero_idx: SelectIndex::empty(),
        }
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the vector holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of 1-bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones_count
    }

    /// Total number of 0-bits.
    #[inline]
    pub fn count_zeros(&self) -> usize {
        self.len - self.ones_count
    }

    /// The bit at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "index {} out of bounds (len={})", i, self.len);
        (self.words[i / 64] >> (i % 64)) & 1 == 1
    }

    /// The select sample rate this vector was built with.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Raw word slice.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Heap memory used, in bytes.
    pub fn heap_size(&self) -> usize {
        self.words.len() * 8
            + self.rank_dir.heap_size()
            + self.select_idx.heap_size()
            + self.zero_idx.heap_size()
    }

    /// The word at `word_idx`, inverted and masked to the valid length.
    #[inline]
    fn inverted_word(&self, word_idx: usize) -> u64 {
        let word = !self.words[word_idx];
        if word_idx == self.words.len() - 1 && self.len % 64 != 0 {
            word & ((1u64 << (self.len % 64)) - 1)
        } else {
            word
        }
    }
}

impl Default for BitVec {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BitVec {
    fn eq(&self, other: &Self) -> bool {
        // Supports are a function of the words; comparing them would be
        // redundant.
        self.len == other.len && self.words == other.words
    }
}

impl Eq for BitVec {}

impl RankSelect for BitVec {
    #[inline]
    fn rank1(&self, i: usize) -> usize {
        if i == 0 {
            return 0;
        }
        if i >= self.len {
            return self.ones_count;
        }

        let word_idx = i / 64;
        let dir_rank = self.rank_dir.rank_at_word(&self.words, word_idx);
        let mask = (1u64 << (i % 64)) - 1;
        dir_rank + (self.words[word_idx] & mask).count_ones() as usize
    }

    fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones_count {
            return None;
        }

        let (start_word, mut remaining) = self.select_idx.jump_to(k);

        for word_idx in start_word..self.words.len() {
            let word = self.words[word_idx];
            let pop = word.count_ones() as usize;

            if pop > remaining {
                let bit_pos = select_in_word(word, remaining);
                return Some(word_idx * 64 + bit_pos);
            }
            remaining -= pop;
        }

        None
    }

    fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.count_zeros() {
            return None;
        }

        let (start_word, mut remaining) = self.zero_idx.jump_to(k);

        for word_idx in start_word..self.words.len() {
            let inverted = self.inverted_word(word_idx);
            let zeros = inverted.count_ones() as usize;

            if zeros > remaining {
                let bit_pos = select_in_word(inverted, remaining);
                return Some(word_idx * 64 + bit_pos);
            }
            remaining -= zeros;
        }

        None
    }
}

#[cfg(feature = "std")]
impl crate::binary::Persist for BitVec {
    fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::binary;

        let mut written = binary::write_u64(out, self.len as u64)?;
        written += binary::write_u64(out, self.sample_rate as u64)?;
        written += binary::write_words(out, &self.words)?;
        Ok(written)
    }

    fn read_from<R: std::io::Read>(input: &mut R) -> std::io::Result<Self> {
        use crate::binary;

        let len = binary::read_u64(input)? as usize;
        let sample_rate = binary::read_u64(input)? as u32;
        let words = binary::read_words(input)?;
        // Rank and select supports are rebuilt here, not deserialized.
        Ok(Self::with_sample_rate(words, len, sample_rate))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for BitVec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("BitVec", 3)?;
        s.serialize_field("words", &self.words)?;
        s.serialize_field("len", &self.len)?;
        s.serialize_field("sample_rate", &self.sample_rate)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for BitVec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            words: Vec<u64>,
            len: usize,
            sample_rate: u32,
        }

        let raw = Raw::deserialize(deserializer)?;
        if raw.len > raw.words.len().saturating_mul(64) {
            return Err(serde::de::Error::custom("bit length exceeds word capacity"));
        }
        Ok(Self::with_sample_rate(raw.words, raw.len, raw.sample_rate))
    }
}

/// Mutable word buffer for construction-time marking.
///
/// Construction scans mark positions into a `BitBuf` and convert the
/// result into an immutable [`BitVec`] (or feed the set positions to a
/// sparse builder) once the scan is done.
#[derive(Clone, Debug)]
pub struct BitBuf {
    words: Vec<u64>,
    len: usize,
}

impl BitBuf {
    /// Create a zeroed buffer of `len` bits.
    pub fn zeroed(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set the bit at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`.
    #[inline]
    pub fn set(&mut self, i: usize) {
        assert!(i < self.len, "index {} out of bounds (len={})", i, self.len);
        self.words[i / 64] |= 1u64 << (i % 64);
    }

    /// The bit at position `i`.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "index {} out of bounds (len={})", i, self.len);
        (self.words[i / 64] >> (i % 64)) & 1 == 1
    }

    /// Count of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the positions of set bits in increasing order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut w = word;
            core::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(wi * 64 + bit)
            })
        })
    }

    /// Freeze into a [`BitVec`] with the given select sample rate.
    pub fn into_bitvec(self, sample_rate: u32) -> BitVec {
        BitVec::with_sample_rate(self.words, self.len, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let bv = BitVec::new();
        assert!(bv.is_empty());
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.select1(0), None);
    }

    #[test]
    fn test_get_and_counts() {
        let bv = BitVec::from_words(vec![0b0100_1101], 8);
        assert!(bv.get(0));
        assert!(!bv.get(1));
        assert!(bv.get(6));
        assert_eq!(bv.count_ones(), 4);
        assert_eq!(bv.count_zeros(), 4);
    }

    #[test]
    fn test_partial_word_masks_tail() {
        let bv = BitVec::from_words(vec![u64::MAX], 10);
        assert_eq!(bv.count_ones(), 10);
        assert_eq!(bv.rank1(64), 10);
    }

    #[test]
    fn test_rank1() {
        // Bits (LSB first): 1 0 1 1 0 0 1 0
        let bv = BitVec::from_words(vec![0b0100_1101], 8);
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.rank1(1), 1);
        assert_eq!(bv.rank1(3), 2);
        assert_eq!(bv.rank1(4), 3);
        assert_eq!(bv.rank1(8), 4);
        assert_eq!(bv.rank1(100), 4);
    }

    #[test]
    fn test_select1() {
        let bv = BitVec::from_words(vec![0b0100_1101], 8);
        assert_eq!(bv.select1(0), Some(0));
        assert_eq!(bv.select1(1), Some(2));
        assert_eq!(bv.select1(2), Some(3));
        assert_eq!(bv.select1(3), Some(6));
        assert_eq!(bv.select1(4), None);
    }

    #[test]
    fn test_select0() {
        let bv = BitVec::from_words(vec![0b0100_1101], 8);
        assert_eq!(bv.select0(0), Some(1));
        assert_eq!(bv.select0(1), Some(4));
        assert_eq!(bv.select0(2), Some(5));
        assert_eq!(bv.select0(3), Some(7));
        assert_eq!(bv.select0(4), None);
    }

    #[test]
    fn test_select0_partial_tail() {
        // 10 valid bits, all zero; zeros past len must not be selectable.
        let bv = BitVec::from_words(vec![0], 10);
        assert_eq!(bv.select0(9), Some(9));
        assert_eq!(bv.select0(10), None);
    }

    #[test]
    fn test_rank_select_roundtrip() {
        let words = vec![0xAAAA_AAAA_AAAA_AAAA, 0x5555_5555_5555_5555];
        let bv = BitVec::from_words(words, 128);

        for i in 0..128 {
            if bv.get(i) {
                assert_eq!(bv.select1(bv.rank1(i)), Some(i), "roundtrip at {}", i);
            }
        }
    }

    #[test]
    fn test_large_with_samples() {
        // Cross the select sample boundary.
        let words: Vec<u64> = (0..64).map(|_| 0xAAAA_AAAA_AAAA_AAAA).collect();
        let bv = BitVec::with_sample_rate(words, 64 * 64, 256);

        assert_eq!(bv.count_ones(), 2048);
        assert_eq!(bv.select1(256), Some(513));
        assert_eq!(bv.select1(2047), Some(4095));
    }

    #[test]
    fn test_bitbuf_marking() {
        let mut buf = BitBuf::zeroed(100);
        for i in [3usize, 17, 64, 99] {
            buf.set(i);
        }
        assert_eq!(buf.count_ones(), 4);
        assert!(buf.get(64));
        assert!(!buf.get(65));

        let positions: Vec<usize> = buf.iter_ones().collect();
        assert_eq!(positions, vec![3, 17, 64, 99]);

        let bv = buf.into_bitvec(256);
        assert_eq!(bv.count_ones(), 4);
        assert_eq!(bv.select1(2), Some(64));
    }
}
