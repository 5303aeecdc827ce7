//! BWT-character sampling: text-order marking widened by a character
//! class.
//!
//! A slot is retained if its SA value is a multiple of the density *or*
//! its co-indexed BWT symbol belongs to the cached sampled-character set.
//! The marked count is data-dependent, so construction sizes storage with
//! an exact counting pass before filling; stored values are the direct SA
//! entries and recovery performs no rescale.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::{BitVec, IntVec};

#[cfg(feature = "std")]
use crate::bits::{bits_needed, BitBuf};
#[cfg(feature = "std")]
use crate::cache::{key_bwt, Cache, KEY_SA, KEY_SAMPLE_CHARS};
#[cfg(feature = "std")]
use crate::error::{Error, Result};
use crate::RankSelect;

/// Suffix array sampling by density or BWT character membership.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BwtSampling {
    dens: usize,
    samples: IntVec,
    marked: BitVec,
}

impl BwtSampling {
    /// Construct from the cached suffix array and BWT symbol sequence.
    ///
    /// The sampled-character set is loaded from the cache when present;
    /// an absent artifact means the empty set and marking degenerates to
    /// the pure density criterion. Both passes run over the in-memory SA
    /// values loaded by the first.
    #[cfg(feature = "std")]
    pub fn from_cache(cache: &Cache, config: &crate::sample::SamplingConfig) -> Result<Self> {
        use std::collections::BTreeSet;

        let dens = config.dens;
        if dens == 0 {
            return Err(Error::InvalidDensity);
        }

        let sa = cache.load_ints(KEY_SA)?;
        let bwt = cache.load_ints(&key_bwt(config.bwt_width))?;
        let n = sa.len();
        assert_eq!(bwt.len(), n, "BWT length must match SA length");

        let mut chars: BTreeSet<u64> = BTreeSet::new();
        if cache.exists(KEY_SAMPLE_CHARS) {
            for c in cache.load_ints(KEY_SAMPLE_CHARS)?.iter() {
                chars.insert(c);
            }
        }

        let mut marked_buf = BitBuf::zeroed(n);
        let mut count = 0;
        for i in 0..n {
            if sa.get(i) % dens as u64 == 0 || chars.contains(&bwt.get(i)) {
                marked_buf.set(i);
                count += 1;
            }
        }

        let mut samples = IntVec::new(count, bits_needed(n as u64));
        let mut cnt = 0;
        for i in 0..n {
            if marked_buf.get(i) {
                samples.set(cnt, sa.get(i));
                cnt += 1;
            }
        }

        Ok(Self {
            dens,
            samples,
            marked: marked_buf.into_bitvec(config.select_sample_rate),
        })
    }

    /// Returns true if slot `i` is sampled.
    #[inline]
    pub fn is_sampled(&self, i: usize) -> bool {
        self.marked.get(i)
    }

    /// The suffix array value at the sampled slot `i`.
    ///
    /// Marking is not a pure multiple-of-density relation, so the stored
    /// entry is returned as-is. `i` must satisfy
    /// [`BwtSampling::is_sampled`]; for other slots the result is
    /// meaningless.
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        self.samples.get(self.marked.rank1(i)) as usize
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
    pub fn marked(&self) -> &BitVec {
        &self.marked
    }

    /// Heap memory used, in bytes.
    pub fn heap_size(&self) -> usize {
        self.samples.heap_size() + self.marked.heap_size()
    }
}

#[cfg(feature = "std")]
impl crate::binary::Persist for BwtSampling {
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
        let marked = BitVec::read_from(input)?;
        Ok(Self {
            dens,
            samples,
            marked,
        })
    }
}
