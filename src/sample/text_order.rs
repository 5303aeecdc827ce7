//! Text-order sampling: SA slots whose *value* is a multiple of the
//! density.
//!
//! The marked slots follow no slot-index pattern, so membership is
//! answered by a sparse marking vector and recovery composes a rank with
//! a lookup into the condensed sample array.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::{IntVec, SparseBitVec};

#[cfg(feature = "std")]
use crate::bits::{bits_needed, SparseBuilder};
#[cfg(feature = "std")]
use crate::cache::{Cache, KEY_SA};
#[cfg(feature = "std")]
use crate::error::{Error, Result};

/// Suffix array sampling of the slots referencing text positions
/// divisible by the density.
///
/// Stored samples are condensed (`SA[i] / dens`); [`TextOrderSampling::value`]
/// rescales, while [`TextOrderSampling::condensed`] exposes the raw entry
/// for the paired ISA support, which treats the condensed array as a
/// permutation to invert.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextOrderSampling {
    dens: usize,
    samples: IntVec,
    marked: SparseBitVec,
}

impl TextOrderSampling {
    /// Construct from the cached suffix array.
    ///
    /// One sequential scan; marks slot `i` iff `SA[i] % dens == 0` and
    /// stores `SA[i] / dens` per marked slot in slot order. The SA is a
    /// permutation of `[0, n)`, so exactly `ceil(n / dens)` slots qualify.
    #[cfg(feature = "std")]
    pub fn from_cache(cache: &Cache, config: &crate::sample::SamplingConfig) -> Result<Self> {
        let dens = config.dens;
        if dens == 0 {
            return Err(Error::InvalidDensity);
        }

        let sa = cache.load_ints(KEY_SA)?;
        let n = sa.len();
        let m = n.div_ceil(dens);

        let mut builder = SparseBuilder::with_sample_rate(n, m, config.select_sample_rate)?;
        let mut samples = IntVec::new(m, bits_needed((n / dens) as u64));

        let mut cnt = 0;
        for (i, value) in sa.iter().enumerate() {
            if value % dens as u64 == 0 {
                builder.set(i)?;
                samples.set(cnt, value / dens as u64);
                cnt += 1;
            }
        }

        Ok(Self {
            dens,
            samples,
            marked: builder.finalize()?,
        })
    }

    /// Returns true if slot `i` is sampled.
    #[inline]
    pub fn is_sampled(&self, i: usize) -> bool {
        self.marked.get(i)
    }

    /// The suffix array value at the sampled slot `i`.
    ///
    /// `i` must satisfy [`TextOrderSampling::is_sampled`]; for other
    /// slots the result is meaningless.
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        self.samples.get(self.marked.rank(i)) as usize * self.dens
    }

    /// The condensed stored value of the k-th sample (no rescale).
    #[inline]
    pub fn condensed(&self, k: usize) -> usize {
        self.samples.get(k) as usize
    }

    /// Number of retained samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The sampling density.
    #[inline]
    pub fn dens(&self) -> usize {
        self.dens
    }

    /// The marking vector over SA slots.
    #[inline]
    pub fn marked(&self) -> &SparseBitVec {
        &self.marked
    }

    /// The condensed sample array, a permutation of `[0, len)`.
    #[inline]
    pub fn condensed_samples(&self) -> &IntVec {
        &self.samples
    }

    /// Heap memory used, in bytes.
    pub fn heap_size(&self) -> usize {
        self.samples.heap_size() + self.marked.heap_size()
    }
}

#[cfg(feature = "std")]
impl crate::binary::Persist for TextOrderSampling {
    fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::binary::{self, Persist};

        let mut written = binary::write_u64(out, self.dens as u64)?;
        written += self.samples.write_to(out)?;
        written += self.marked.write_to(out)?;
        Ok(written)
    }

    fn read_from<R: std::io::Read>(input: &mut R) -> std::io::Result<Self> {
        use crate::binary::{self, Persist};

        let dens = binary::read_u64(input)? as usize;
        if dens == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "sampling density must be at least 1",
            ));
        }
        let samples = IntVec::read_from(input)?;
        let marked = SparseBitVec::read_from(input)?;
        Ok(Self {
            dens,
            samples,
            marked,
        })
    }
}
