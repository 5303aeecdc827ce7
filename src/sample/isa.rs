//! Inverse suffix array sampling and the borrowing support variants.
//!
//! [`IsaSampling`] stores its own sample array. The two support
//! structures instead derive ISA values from a paired SA sampling via
//! select and inverse-permutation lookups, so they add no storage
//! proportional to the text length. A support borrows its SA sampling
//! for its whole lifetime; the density is read from the borrowed
//! structure, which makes an SA/ISA density mismatch unrepresentable.
//!
//! All three answer the same navigation queries: the ISA value at a
//! sampled text position, and the nearest sampled position at-or-before
//! (`sample_leq`) / at-or-after (`sample_geq`) an arbitrary position,
//! both wrapping at the ends of the text.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::IntVec;
use crate::perm::InvPermSupport;
use crate::sample::fuzzy::FuzzySampling;
use crate::sample::text_order::TextOrderSampling;

#[cfg(feature = "std")]
use crate::bits::bits_needed;
#[cfg(feature = "std")]
use crate::cache::{Cache, KEY_SA};
#[cfg(feature = "std")]
use crate::error::{Error, Result};

/// Direct ISA sampling at a fixed text-position stride.
///
/// `samples[t / dens]` holds the SA slot at which text position `t`
/// occurs, for every `t` divisible by `dens`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IsaSampling {
    dens: usize,
    samples: IntVec,
}

impl IsaSampling {
    /// Construct from the cached suffix array.
    ///
    /// One sequential scan of the SA artifact.
    #[cfg(feature = "std")]
    pub fn from_cache(cache: &Cache, config: &crate::sample::SamplingConfig) -> Result<Self> {
        Self::from_cache_with_dens(cache, config.dens)
    }

    /// Construct with an explicit density inherited from a paired SA
    /// sampling.
    #[cfg(feature = "std")]
    pub(crate) fn from_cache_with_dens(cache: &Cache, dens: usize) -> Result<Self> {
        if dens == 0 {
            return Err(Error::InvalidDensity);
        }

        let sa = cache.load_ints(KEY_SA)?;
        let n = sa.len();
        let len = if n > 0 { (n - 1) / dens + 1 } else { 0 };
        let mut samples = IntVec::new(len, bits_needed(n as u64));

        for (i, value) in sa.iter().enumerate() {
            if value % dens as u64 == 0 {
                samples.set((value / dens as u64) as usize, i as u64);
            }
        }

        Ok(Self { dens, samples })
    }

    /// The ISA value at the sampled text position at or before `i`.
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        self.samples.get(i / self.dens) as usize
    }

    /// The rightmost ISA sample at or before text position `i`, returned
    /// as `(isa_value, text_position)`.
    #[inline]
    pub fn sample_leq(&self, i: usize) -> (usize, usize) {
        let ci = i / self.dens;
        (self.samples.get(ci) as usize, ci * self.dens)
    }

    /// The leftmost ISA sample at or after text position `i`, wrapping
    /// to the first sample past the end, returned as
    /// `(isa_value, text_position)`.
    #[inline]
    pub fn sample_geq(&self, i: usize) -> (usize, usize) {
        let ci = (i / self.dens + 1) % self.samples.len();
        (self.samples.get(ci) as usize, ci * self.dens)
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
impl crate::binary::Persist for IsaSampling {
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

/// ISA sampling support derived from a [`TextOrderSampling`].
///
/// The text-order sampler's condensed sample array is a permutation of
/// `[0, len)`: entry `k` is the condensed text position of the k-th
/// marked SA slot. Inverting it yields, for a condensed text position,
/// the rank of its marked slot, and a select on the marking vector turns
/// that rank back into the slot index, which is the ISA value.
#[derive(Clone, Debug)]
pub struct TextOrderIsaSupport<'a> {
    sa: &'a TextOrderSampling,
    inv: InvPermSupport<'a>,
}

impl<'a> TextOrderIsaSupport<'a> {
    /// Build inverse-permutation shortcut state over the paired sampler.
    pub fn new(sa: &'a TextOrderSampling, tau: usize, sample_rate: u32) -> Self {
        Self {
            sa,
            inv: InvPermSupport::new(sa.condensed_samples(), tau, sample_rate),
        }
    }

    /// The ISA value at the sampled text position at or before `i`.
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        self.slot_of(i / self.sa.dens())
    }

    /// The rightmost ISA sample at or before text position `i`, returned
    /// as `(isa_value, text_position)`.
    #[inline]
    pub fn sample_leq(&self, i: usize) -> (usize, usize) {
        let ci = i / self.sa.dens();
        (self.slot_of(ci), ci * self.sa.dens())
    }

    /// The leftmost ISA sample at or after text position `i`, wrapping
    /// to the first sample past the end, returned as
    /// `(isa_value, text_position)`.
    #[inline]
    pub fn sample_geq(&self, i: usize) -> (usize, usize) {
        let ci = (i / self.sa.dens() + 1) % self.sa.len();
        (self.slot_of(ci), ci * self.sa.dens())
    }

    /// The sampling density, inherited from the paired SA sampling.
    #[inline]
    pub fn dens(&self) -> usize {
        self.sa.dens()
    }

    /// SA slot holding condensed text position `ci`.
    #[inline]
    fn slot_of(&self, ci: usize) -> usize {
        match self.sa.marked().select(self.inv.inv(ci)) {
            Some(slot) => slot,
            None => unreachable!("sample rank bounded by marked count"),
        }
    }

    /// Heap memory used by the owned shortcut state, in bytes.
    pub fn heap_size(&self) -> usize {
        self.inv.heap_size()
    }

    /// Serialize the owned shortcut state.
    #[cfg(feature = "std")]
    pub fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        self.inv.write_to(out)
    }

    /// Deserialize, re-attaching the back-reference to the paired SA
    /// sampling.
    #[cfg(feature = "std")]
    pub fn read_from_with<R: std::io::Read>(
        input: &mut R,
        sa: &'a TextOrderSampling,
    ) -> std::io::Result<Self> {
        let inv = InvPermSupport::read_from_with(input, sa.condensed_samples())?;
        Ok(Self { sa, inv })
    }
}

impl PartialEq for TextOrderIsaSupport<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.sa == other.sa && self.inv.tau() == other.inv.tau()
    }
}

/// ISA sampling support derived from a [`FuzzySampling`].
///
/// Fuzzy marking is only approximately regular, so the window candidate
/// computed by stride arithmetic can land on the wrong side of the query
/// position; `sample_leq` and `sample_geq` check and step to the
/// adjacent window (wrapping) when it does.
#[derive(Clone, Debug)]
pub struct FuzzyIsaSupport<'a> {
    sa: &'a FuzzySampling,
}

impl<'a> FuzzyIsaSupport<'a> {
    /// Wrap the paired sampler; all state is borrowed.
    pub fn new(sa: &'a FuzzySampling) -> Self {
        Self { sa }
    }

    /// The inverse-permutation entry for window `i` (a sample rank).
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        self.sa.inv(i)
    }

    /// The rightmost ISA sample at or before text position `i`, returned
    /// as `(isa_value, text_position)`.
    pub fn sample_leq(&self, i: usize) -> (usize, usize) {
        let mut ci = i / self.sa.dens();
        let mut j = self.isa_pos(ci);
        if j > i {
            ci = if ci > 0 {
                ci - 1
            } else {
                self.sa.window_count() - 1
            };
            j = self.isa_pos(ci);
        }
        (self.sa_slot(ci), j)
    }

    /// The leftmost ISA sample at or after text position `i`, wrapping
    /// to the first window past the end, returned as
    /// `(isa_value, text_position)`.
    pub fn sample_geq(&self, i: usize) -> (usize, usize) {
        let mut ci = i / self.sa.dens();
        let mut j = self.isa_pos(ci);
        if j < i {
            ci = if ci < self.sa.window_count() - 1 {
                ci + 1
            } else {
                0
            };
            j = self.isa_pos(ci);
        }
        (self.sa_slot(ci), j)
    }

    /// The sampling density, inherited from the paired SA sampling.
    #[inline]
    pub fn dens(&self) -> usize {
        self.sa.dens()
    }

    /// Marked text position of window `ci`.
    #[inline]
    fn isa_pos(&self, ci: usize) -> usize {
        match self.sa.marked_isa().select(ci) {
            Some(pos) => pos,
            None => unreachable!("window index bounded by sample count"),
        }
    }

    /// SA slot of window `ci`'s sample.
    #[inline]
    fn sa_slot(&self, ci: usize) -> usize {
        match self.sa.marked_sa().select(self.sa.inv(ci)) {
            Some(slot) => slot,
            None => unreachable!("sample rank bounded by marked count"),
        }
    }

    /// Heap memory owned by the support itself, in bytes.
    ///
    /// Always 0: everything is borrowed from the paired SA sampling.
    pub fn heap_size(&self) -> usize {
        0
    }
}

impl PartialEq for FuzzyIsaSupport<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.sa == other.sa
    }
}
