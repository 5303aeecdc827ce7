//! Sparse bit vector with Elias-Fano encoding and a deferred-finalization
//! builder.
//!
//! Set-bit positions are split into low and high halves: the low `wl` bits
//! of each position are packed densely into an [`IntVec`], the high halves
//! are unary-coded into a [`BitVec`] that carries select-ones and
//! select-zeros acceleration. For `m` set bits over `n` positions the
//! encoding costs roughly `m * (2 + log2(n/m))` bits.
//!
//! Construction goes through [`SparseBuilder`]: positions are appended in
//! strictly increasing order and the builder converts into an immutable
//! [`SparseBitVec`] only when exactly the declared number of positions has
//! been appended.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::bitvec::{BitBuf, BitVec};
use crate::bits::intvec::{bits_needed, IntVec};
use crate::bits::select::DEFAULT_SELECT_SAMPLE_RATE;
use crate::error::{Error, Result};
use crate::RankSelect;

/// Low-bit width for a vector of length `n` with `m` set bits.
///
/// With `logm = bits_needed(m)` and `logn = bits_needed(n)`, `logm` is
/// decremented when the two are equal so that `logn - logm > 0` and the
/// split stays valid for dense vectors.
fn low_width(n: usize, m: usize) -> (u32, u32) {
    let mut logm = bits_needed(m as u64);
    let logn = bits_needed(n as u64);
    if logm == logn {
        logm -= 1;
    }
    (logn - logm, logm)
}

/// Incremental builder for [`SparseBitVec`].
///
/// The builder is created with the final vector length `n` and the exact
/// number of set bits `m`, accepts `m` strictly increasing positions via
/// [`SparseBuilder::set`], and is consumed by [`SparseBuilder::finalize`],
/// which moves the staged arrays into the finished vector and resets the
/// builder to a fresh empty instance.
#[derive(Debug)]
pub struct SparseBuilder {
    size: usize,
    capacity: usize,
    wl: u32,
    sample_rate: u32,
    low: IntVec,
    high: BitBuf,
    /// High half of the most recently accepted position.
    last_high: usize,
    /// Number of positions accepted so far.
    items: usize,
    /// One past the most recently accepted position.
    tail: usize,
}

impl SparseBuilder {
    /// Create a builder for a vector of `n` bits with exactly `m` set.
    ///
    /// Fails with [`Error::BuilderCapacity`] if `m > n`.
    pub fn new(n: usize, m: usize) -> Result<Self> {
        Self::with_sample_rate(n, m, DEFAULT_SELECT_SAMPLE_RATE)
    }

    /// Create a builder with an explicit select sample rate for the
    /// high-bit supports.
    pub fn with_sample_rate(n: usize, m: usize, sample_rate: u32) -> Result<Self> {
        if m > n {
            return Err(Error::BuilderCapacity {
                requested: m,
                size: n,
            });
        }

        let (wl, logm) = low_width(n, m);
        Ok(Self {
            size: n,
            capacity: m,
            wl,
            sample_rate,
            low: IntVec::new(m, wl),
            high: BitBuf::zeroed(m + (1usize << logm)),
            last_high: 0,
            items: 0,
            tail: 0,
        })
    }

    /// Declared vector length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Declared number of set bits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Positions accepted so far.
    #[inline]
    pub fn items(&self) -> usize {
        self.items
    }

    /// Append a set-bit position.
    ///
    /// Positions must arrive in strictly increasing order and lie in
    /// `[0, n)`; at most `m` positions are accepted.
    pub fn set(&mut self, pos: usize) -> Result<()> {
        if self.items == self.capacity {
            return Err(Error::BuilderFull {
                capacity: self.capacity,
            });
        }
        if pos >= self.size {
            return Err(Error::PositionOutOfRange {
                pos,
                size: self.size,
            });
        }
        if pos < self.tail {
            return Err(Error::NonIncreasingPosition {
                pos,
                last: self.tail - 1,
            });
        }

        let cur_high = pos >> self.wl;
        debug_assert!(cur_high >= self.last_high);
        self.high.set(cur_high + self.items);
        self.low.set(self.items, (pos as u64) & self.low_mask());
        self.last_high = cur_high;
        self.tail = pos + 1;
        self.items += 1;
        Ok(())
    }

    /// Convert the staged arrays into an immutable [`SparseBitVec`].
    ///
    /// Fails with [`Error::BuilderUnderfilled`] unless exactly `m`
    /// positions have been appended. On success the low and high arrays
    /// are moved (not copied) into the finished vector, select supports
    /// are built over the high bits, and the builder is reset to an
    /// empty instance.
    pub fn finalize(&mut self) -> Result<SparseBitVec> {
        if self.items != self.capacity {
            return Err(Error::BuilderUnderfilled {
                items: self.items,
                capacity: self.capacity,
            });
        }

        let low = core::mem::take(&mut self.low);
        let high = core::mem::replace(&mut self.high, BitBuf::zeroed(0));
        let vector = SparseBitVec {
            size: self.size,
            wl: self.wl,
            low,
            high: high.into_bitvec(self.sample_rate),
        };

        self.size = 0;
        self.capacity = 0;
        self.wl = low_width(0, 0).0;
        self.last_high = 0;
        self.items = 0;
        self.tail = 0;
        Ok(vector)
    }

    #[inline]
    fn low_mask(&self) -> u64 {
        (1u64 << self.wl) - 1
    }
}

/// Immutable Elias-Fano encoded sparse bit vector.
///
/// Supports `rank`, `select`, and single-bit access in the encoded domain.
/// The high-bit [`BitVec`] owns its rank/select supports, so cloning,
/// moving, or loading a `SparseBitVec` never leaves a support dangling.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseBitVec {
    size: usize,
    wl: u32,
    low: IntVec,
    high: BitVec,
}

impl SparseBitVec {
    /// Build directly from an iterator of strictly increasing positions
    /// with known count.
    ///
    /// Convenience wrapper over [`SparseBuilder`] for callers that already
    /// hold the full position list.
    pub fn from_positions<I>(n: usize, m: usize, positions: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        Self::from_positions_with_rate(n, m, positions, DEFAULT_SELECT_SAMPLE_RATE)
    }

    /// [`SparseBitVec::from_positions`] with an explicit select sample rate.
    pub fn from_positions_with_rate<I>(
        n: usize,
        m: usize,
        positions: I,
        sample_rate: u32,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut builder = SparseBuilder::with_sample_rate(n, m, sample_rate)?;
        for pos in positions {
            builder.set(pos)?;
        }
        builder.finalize()
    }

    /// Number of bits in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the vector holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.low.len()
    }

    /// The bit at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.size, "index {} out of bounds (len={})", i, self.size);
        self.rank(i + 1) > self.rank(i)
    }

    /// Number of set bits strictly before position `i`.
    ///
    /// `i` past the end returns the total count.
    pub fn rank(&self, i: usize) -> usize {
        let m = self.count_ones();
        if m == 0 {
            return 0;
        }
        if i >= self.size {
            return m;
        }

        // Ones up to the bucket boundary, then walk back over the tail of
        // the current bucket whose low bits are >= the query's low bits.
        let high_val = i >> self.wl;
        let sel_high = match self.high.select0(high_val) {
            Some(pos) => pos,
            // The high array always holds more zeros than buckets.
            None => unreachable!("high zero count exceeds bucket index"),
        };

        let mut rank_low = sel_high - high_val;
        if rank_low == 0 {
            return 0;
        }

        let val_low = (i as u64) & ((1u64 << self.wl) - 1);
        let mut idx = sel_high;
        while rank_low > 0 && self.high.get(idx - 1) && self.low.get(rank_low - 1) >= val_low {
            rank_low -= 1;
            idx -= 1;
        }
        rank_low
    }

    /// Position of the k-th set bit (0-indexed).
    ///
    /// Returns `None` if fewer than `k + 1` bits are set.
    #[inline]
    pub fn select(&self, k: usize) -> Option<usize> {
        if k >= self.count_ones() {
            return None;
        }
        let high_pos = self.high.select1(k)?;
        Some(((high_pos - k) << self.wl) | self.low.get(k) as usize)
    }

    /// Iterate over the positions of set bits in increasing order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.count_ones()).map(move |k| match self.select(k) {
            Some(pos) => pos,
            None => unreachable!("k bounded by count_ones"),
        })
    }

    /// Heap memory used, in bytes.
    pub fn heap_size(&self) -> usize {
        self.low.heap_size() + self.high.heap_size()
    }
}

#[cfg(feature = "std")]
impl crate::binary::Persist for SparseBitVec {
    fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::binary::{self, Persist};

        let mut written = binary::write_u64(out, self.size as u64)?;
        written += self.low.write_to(out)?;
        written += self.high.write_to(out)?;
        Ok(written)
    }

    fn read_from<R: std::io::Read>(input: &mut R) -> std::io::Result<Self> {
        use crate::binary::{self, Persist};

        let size = binary::read_u64(input)? as usize;
        let low = IntVec::read_from(input)?;
        let high = BitVec::read_from(input)?;

        // The split width is a pure function of (n, m); recomputing it
        // keeps the value consistent with what the builder produced.
        let (wl, logm) = low_width(size, low.len());
        if low.width() != wl || high.len() != low.len() + (1usize << logm) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "inconsistent sparse vector geometry",
            ));
        }
        Ok(Self {
            size,
            wl,
            low,
            high,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_scenario() {
        // n=10, m=3, positions [1,4,9].
        let mut builder = SparseBuilder::new(10, 3).unwrap();
        builder.set(1).unwrap();
        builder.set(4).unwrap();
        builder.set(9).unwrap();
        let sv = builder.finalize().unwrap();

        assert_eq!(sv.len(), 10);
        assert_eq!(sv.count_ones(), 3);
        assert_eq!(sv.rank(0), 0);
        assert_eq!(sv.rank(5), 2);
        assert_eq!(sv.rank(10), 3);
        assert_eq!(sv.select(0), Some(1));
        assert_eq!(sv.select(1), Some(4));
        assert_eq!(sv.select(2), Some(9));
        assert_eq!(sv.select(3), None);
    }

    #[test]
    fn test_capacity_exceeds_size() {
        let err = SparseBuilder::new(5, 7).unwrap_err();
        assert!(matches!(
            err,
            Error::BuilderCapacity {
                requested: 7,
                size: 5
            }
        ));
    }

    #[test]
    fn test_finalize_underfilled() {
        let mut builder = SparseBuilder::new(5, 3).unwrap();
        builder.set(0).unwrap();
        builder.set(2).unwrap();
        let err = builder.finalize().unwrap_err();
        assert!(matches!(
            err,
            Error::BuilderUnderfilled {
                items: 2,
                capacity: 3
            }
        ));
    }

    #[test]
    fn test_non_increasing_position() {
        let mut builder = SparseBuilder::new(10, 3).unwrap();
        builder.set(4).unwrap();
        assert!(matches!(
            builder.set(4),
            Err(Error::NonIncreasingPosition { pos: 4, last: 4 })
        ));
        assert!(matches!(
            builder.set(2),
            Err(Error::NonIncreasingPosition { pos: 2, last: 4 })
        ));
    }

    #[test]
    fn test_position_out_of_range() {
        let mut builder = SparseBuilder::new(10, 2).unwrap();
        assert!(matches!(
            builder.set(10),
            Err(Error::PositionOutOfRange { pos: 10, size: 10 })
        ));
    }

    #[test]
    fn test_overfill_rejected() {
        let mut builder = SparseBuilder::new(10, 1).unwrap();
        builder.set(3).unwrap();
        assert!(matches!(
            builder.set(5),
            Err(Error::BuilderFull { capacity: 1 })
        ));
    }

    #[test]
    fn test_finalize_resets_builder() {
        let mut builder = SparseBuilder::new(10, 2).unwrap();
        builder.set(1).unwrap();
        builder.set(8).unwrap();
        let sv = builder.finalize().unwrap();
        assert_eq!(sv.count_ones(), 2);

        // Spent builder holds nothing; a position append is rejected.
        assert_eq!(builder.size(), 0);
        assert_eq!(builder.items(), 0);
        assert!(builder.set(0).is_err());
    }

    #[test]
    fn test_empty_vector() {
        let mut builder = SparseBuilder::new(100, 0).unwrap();
        let sv = builder.finalize().unwrap();
        assert_eq!(sv.len(), 100);
        assert_eq!(sv.count_ones(), 0);
        assert_eq!(sv.rank(50), 0);
        assert_eq!(sv.select(0), None);
        assert!(!sv.get(42));
    }

    #[test]
    fn test_dense_vector() {
        // m == n forces the equal-log width adjustment.
        let sv = SparseBitVec::from_positions(8, 8, 0..8).unwrap();
        for i in 0..8 {
            assert!(sv.get(i));
            assert_eq!(sv.rank(i), i);
            assert_eq!(sv.select(i), Some(i));
        }
        assert_eq!(sv.rank(8), 8);
    }

    #[test]
    fn test_get_matches_membership() {
        let positions = [3usize, 7, 8, 20, 63, 64, 65, 199];
        let sv = SparseBitVec::from_positions(200, positions.len(), positions).unwrap();
        for i in 0..200 {
            assert_eq!(sv.get(i), positions.contains(&i), "bit {}", i);
        }
    }

    #[test]
    fn test_rank_select_against_naive() {
        let positions: Vec<usize> = (0..500).map(|k| k * 7 + k % 3).collect();
        let n = positions.last().unwrap() + 1;
        let sv = SparseBitVec::from_positions(n, positions.len(), positions.iter().copied())
            .unwrap();

        let mut expected_rank = 0usize;
        for i in 0..n {
            assert_eq!(sv.rank(i), expected_rank, "rank at {}", i);
            if positions.binary_search(&i).is_ok() {
                expected_rank += 1;
            }
        }
        for (k, &pos) in positions.iter().enumerate() {
            assert_eq!(sv.select(k), Some(pos), "select {}", k);
        }
    }

    #[test]
    fn test_iter_ones() {
        let positions = vec![0usize, 13, 64, 100];
        let sv =
            SparseBitVec::from_positions(128, positions.len(), positions.iter().copied()).unwrap();
        let collected: Vec<usize> = sv.iter_ones().collect();
        assert_eq!(collected, positions);
    }

    #[test]
    fn test_single_bit_at_end() {
        let sv = SparseBitVec::from_positions(1000, 1, [999]).unwrap();
        assert_eq!(sv.rank(999), 0);
        assert_eq!(sv.rank(1000), 1);
        assert_eq!(sv.select(0), Some(999));
        assert!(sv.get(999));
    }

    #[test]
    fn test_persist_roundtrip() {
        use crate::binary::Persist;

        let positions: Vec<usize> = (0..300).map(|k| k * 11).collect();
        let n = positions.last().unwrap() + 5;
        let sv =
            SparseBitVec::from_positions(n, positions.len(), positions.iter().copied()).unwrap();

        let mut buf = Vec::new();
        let written = sv.write_to(&mut buf).unwrap();
        assert_eq!(written, buf.len());

        let mut cursor = std::io::Cursor::new(buf);
        let loaded = SparseBitVec::read_from(&mut cursor).unwrap();
        assert_eq!(loaded, sv);
        for (k, &pos) in positions.iter().enumerate() {
            assert_eq!(loaded.select(k), Some(pos));
        }
        assert_eq!(loaded.rank(n), positions.len());
    }
}
