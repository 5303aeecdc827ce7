//! Suffix-order sampling: every `dens`-th suffix array slot.
//!
//! Because marking is a deterministic function of the slot index, no bit
//! vector is needed; `is_sampled` is a modulo test and `value` is a
//! direct lookup into the packed sample array.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::IntVec;

#[cfg(feature = "std")]
use crate::bits::bits_needed;
#[cfg(feature = "std")]
use crate::cache::{Cache, KEY_SA};
#[cfg(feature = "std")]
use crate::error::{Error, Result};

/// Suffix array sampling at a fixed slot stride.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuffixOrderSampling {
    dens: usize,
    samples: IntVec,
}

impl SuffixOrderSampling {
    /// Construct from the cached suffix array, retaining every `dens`-th
    /// slot in suffix order.
    ///
    /// One sequential scan of the SA artifact.
    #[cfg(feature = "std")]
    pub fn from_cache(cache: &Cache, config: &crate::sample::SamplingConfig) -> Result<Self> {
        let dens = config.dens;
        if dens == 0 {
            return Err(Error::InvalidDensity);
        }

        let sa = cache.load_ints(KEY_SA)?;
        let n = sa.len();
        let mut samples = IntVec::new(n.div_ceil(dens), bits_needed(n as u64));

        let mut cnt = 0;
        for (i, value) in sa.iter().enumerate() {
            if i % dens == 0 {
                samples.set(cnt, value);
                cnt += 1;
            }
        }

        Ok(Self { dens, samples })
    }

    /// Returns true if slot `i` is sampled.
    #[inline]
    pub fn is_sampled(&self, i: usize) -> bool {
        i % self.dens == 0
    }

    /// The suffix array value at the sampled slot `i`.
    ///
    /// `i` must satisfy [`SuffixOrderSampling::is_sampled`]; for other
    /// slots the result is meaningless.
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        self.samples.get(i / self.dens) as usize
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

    /// Heap memory used, in bytes.
    pub fn heap_size(&self) -> usize {
        self.samples.heap_size()
    }
}

#[cfg(feature = "std")]
impl crate::binary::Persist for SuffixOrderSampling {
    fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::binary::{self, Persist};

        let mut written = binary::write_u64(out, self.dens as u64)?;
        written += self.samples.write_to(out)?;
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
        Ok(Self { dens, samples })
    }
}
