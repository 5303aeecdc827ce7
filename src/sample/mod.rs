//! Suffix array and inverse suffix array sampling strategies.
//!
//! A compressed full-text index stores only a sparse subset of its
//! suffix array; the rest is recovered by walking the index's navigation
//! operation until a sampled slot is hit. This module supplies the four
//! interchangeable SA-side strategies and their paired ISA-side
//! structures:
//!
//! | SA strategy | marks | paired ISA variant |
//! |---|---|---|
//! | [`SuffixOrderSampling`] | every `dens`-th slot | [`IsaSampling`] |
//! | [`TextOrderSampling`] | slots with `SA[i] % dens == 0` | [`TextOrderIsaSupport`] |
//! | [`BwtSampling`] | text-order or BWT character class | [`IsaSampling`] |
//! | [`FuzzySampling`] | one near-regular pick per window | [`FuzzyIsaSupport`] |
//!
//! For the worked example text `ABCDEFABCDEF$` with density 2,
//! suffix-order sampling retains SA slots {0, 2, 4, 6, 8, 10, 12} while
//! text-order sampling retains the slots holding the even text positions
//! {12, 6, 0, 8, 2, 10, 4}, which sit at SA indices {0, 1, 2, 4, 5, 6, 7}.
//!
//! The SA-side and ISA-side densities of a pair must agree. The sum
//! types below make that structural: [`IsaSupport::for_sampling`] builds
//! the matching ISA variant for a given [`SaSampling`] and reads the
//! density from it, so a mismatched pair cannot be assembled.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod bwt;
mod fuzzy;
mod isa;
mod suffix_order;
mod text_order;

pub use bwt::BwtSampling;
pub use fuzzy::FuzzySampling;
pub use isa::{FuzzyIsaSupport, IsaSampling, TextOrderIsaSupport};
pub use suffix_order::SuffixOrderSampling;
pub use text_order::TextOrderSampling;

#[cfg(feature = "std")]
use crate::cache::Cache;
#[cfg(feature = "std")]
use crate::error::Result;

use crate::bits::DEFAULT_SELECT_SAMPLE_RATE;
use crate::perm::DEFAULT_TAU;

/// Default sampling density.
pub const DEFAULT_DENS: usize = 32;

/// Configuration for sampling construction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingConfig {
    /// Sampling density (default: 32)
    pub dens: usize,
    /// Select sample rate for bit-vector supports (default: 256)
    pub select_sample_rate: u32,
    /// Inverse-permutation shortcut stride (default: 8)
    pub tau: usize,
    /// Entry width of the cached BWT artifact (default: 8)
    pub bwt_width: u8,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            dens: DEFAULT_DENS,
            select_sample_rate: DEFAULT_SELECT_SAMPLE_RATE,
            tau: DEFAULT_TAU,
            bwt_width: 8,
        }
    }
}

impl SamplingConfig {
    /// Set the sampling density.
    pub fn with_dens(mut self, dens: usize) -> Self {
        self.dens = dens;
        self
    }

    /// Set the select sample rate for bit-vector supports.
    pub fn with_select_sample_rate(mut self, rate: u32) -> Self {
        self.select_sample_rate = rate;
        self
    }

    /// Set the inverse-permutation shortcut stride.
    pub fn with_tau(mut self, tau: usize) -> Self {
        self.tau = tau;
        self
    }

    /// Set the entry width of the cached BWT artifact.
    pub fn with_bwt_width(mut self, width: u8) -> Self {
        self.bwt_width = width;
        self
    }
}

/// A suffix array sampling strategy.
///
/// Closed set of the four variants, dispatched by `match`; all variants
/// answer the same membership and recovery queries.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SaSampling {
    /// Every `dens`-th slot in suffix order.
    SuffixOrder(SuffixOrderSampling),
    /// Slots whose SA value is a multiple of the density.
    TextOrder(TextOrderSampling),
    /// Text-order marking widened by a BWT character class.
    Bwt(BwtSampling),
    /// Near-regular order-preserving window selection.
    Fuzzy(FuzzySampling),
}

impl SaSampling {
    /// Construct a suffix-order sampling from the cache.
    #[cfg(feature = "std")]
    pub fn suffix_order(cache: &Cache, config: &SamplingConfig) -> Result<Self> {
        Ok(Self::SuffixOrder(SuffixOrderSampling::from_cache(
            cache, config,
        )?))
    }

    /// Construct a text-order sampling from the cache.
    #[cfg(feature = "std")]
    pub fn text_order(cache: &Cache, config: &SamplingConfig) -> Result<Self> {
        Ok(Self::TextOrder(TextOrderSampling::from_cache(
            cache, config,
        )?))
    }

    /// Construct a BWT-character sampling from the cache.
    #[cfg(feature = "std")]
    pub fn bwt(cache: &Cache, config: &SamplingConfig) -> Result<Self> {
        Ok(Self::Bwt(BwtSampling::from_cache(cache, config)?))
    }

    /// Construct a fuzzy sampling from the cache, building the ISA
    /// artifact on demand.
    #[cfg(feature = "std")]
    pub fn fuzzy(cache: &mut Cache, config: &SamplingConfig) -> Result<Self> {
        Ok(Self::Fuzzy(FuzzySampling::from_cache(cache, config)?))
    }

    /// Returns true if SA slot `i` is sampled.
    #[inline]
    pub fn is_sampled(&self, i: usize) -> bool {
        match self {
            Self::SuffixOrder(s) => s.is_sampled(i),
            Self::TextOrder(s) => s.is_sampled(i),
            Self::Bwt(s) => s.is_sampled(i),
            Self::Fuzzy(s) => s.is_sampled(i),
        }
    }

    /// The suffix array value at the sampled slot `i`.
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        match self {
            Self::SuffixOrder(s) => s.value(i),
            Self::TextOrder(s) => s.value(i),
            Self::Bwt(s) => s.value(i),
            Self::Fuzzy(s) => s.value(i),
        }
    }

    /// Number of retained samples.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::SuffixOrder(s) => s.len(),
            Self::TextOrder(s) => s.len(),
            Self::Bwt(s) => s.len(),
            Self::Fuzzy(s) => s.len(),
        }
    }

    /// Returns true if no samples are retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sampling density.
    #[inline]
    pub fn dens(&self) -> usize {
        match self {
            Self::SuffixOrder(s) => s.dens(),
            Self::TextOrder(s) => s.dens(),
            Self::Bwt(s) => s.dens(),
            Self::Fuzzy(s) => s.dens(),
        }
    }

    /// Heap memory used, in bytes.
    pub fn heap_size(&self) -> usize {
        match self {
            Self::SuffixOrder(s) => s.heap_size(),
            Self::TextOrder(s) => s.heap_size(),
            Self::Bwt(s) => s.heap_size(),
            Self::Fuzzy(s) => s.heap_size(),
        }
    }
}

#[cfg(feature = "std")]
impl crate::binary::Persist for SaSampling {
    fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::binary::{self, Persist};

        let tag = match self {
            Self::SuffixOrder(_) => 0u64,
            Self::TextOrder(_) => 1,
            Self::Bwt(_) => 2,
            Self::Fuzzy(_) => 3,
        };
        let mut written = binary::write_u64(out, tag)?;
        written += match self {
            Self::SuffixOrder(s) => s.write_to(out)?,
            Self::TextOrder(s) => s.write_to(out)?,
            Self::Bwt(s) => s.write_to(out)?,
            Self::Fuzzy(s) => s.write_to(out)?,
        };
        Ok(written)
    }

    fn read_from<R: std::io::Read>(input: &mut R) -> std::io::Result<Self> {
        use crate::binary::{self, Persist};

        match binary::read_u64(input)? {
            0 => Ok(Self::SuffixOrder(SuffixOrderSampling::read_from(input)?)),
            1 => Ok(Self::TextOrder(TextOrderSampling::read_from(input)?)),
            2 => Ok(Self::Bwt(BwtSampling::read_from(input)?)),
            3 => Ok(Self::Fuzzy(FuzzySampling::read_from(input)?)),
            tag => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown sampling variant tag {}", tag),
            )),
        }
    }
}

/// An ISA sampling structure paired with an [`SaSampling`].
///
/// The text-order and fuzzy variants borrow their SA sampling; the
/// borrow checker rules out reading a support whose SA structure has
/// been moved or mutated.
#[derive(Debug, PartialEq)]
pub enum IsaSupport<'a> {
    /// Independently stored ISA samples.
    Direct(IsaSampling),
    /// Derived from a [`TextOrderSampling`].
    TextOrder(TextOrderIsaSupport<'a>),
    /// Derived from a [`FuzzySampling`].
    Fuzzy(FuzzyIsaSupport<'a>),
}

impl<'a> IsaSupport<'a> {
    /// Build the ISA variant paired with the given SA sampling.
    ///
    /// Static pairing table: suffix-order and BWT sampling pair with the
    /// direct variant, text-order and fuzzy with their borrowing
    /// supports. The density is inherited from `sa`, so SA/ISA density
    /// parity holds by construction.
    #[cfg(feature = "std")]
    pub fn for_sampling(
        cache: &Cache,
        sa: &'a SaSampling,
        config: &SamplingConfig,
    ) -> Result<Self> {
        match sa {
            SaSampling::SuffixOrder(s) => Ok(Self::Direct(IsaSampling::from_cache_with_dens(
                cache,
                s.dens(),
            )?)),
            SaSampling::Bwt(s) => Ok(Self::Direct(IsaSampling::from_cache_with_dens(
                cache,
                s.dens(),
            )?)),
            SaSampling::TextOrder(s) => Ok(Self::TextOrder(TextOrderIsaSupport::new(
                s,
                config.tau,
                config.select_sample_rate,
            ))),
            SaSampling::Fuzzy(s) => Ok(Self::Fuzzy(FuzzyIsaSupport::new(s))),
        }
    }

    /// The ISA value for the sample associated with `i`.
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        match self {
            Self::Direct(s) => s.value(i),
            Self::TextOrder(s) => s.value(i),
            Self::Fuzzy(s) => s.value(i),
        }
    }

    /// The rightmost ISA sample at or before text position `i`, returned
    /// as `(isa_value, text_position)`.
    #[inline]
    pub fn sample_leq(&self, i: usize) -> (usize, usize) {
        match self {
            Self::Direct(s) => s.sample_leq(i),
            Self::TextOrder(s) => s.sample_leq(i),
            Self::Fuzzy(s) => s.sample_leq(i),
        }
    }

    /// The leftmost ISA sample at or after text position `i`, wrapping
    /// past the end, returned as `(isa_value, text_position)`.
    #[inline]
    pub fn sample_geq(&self, i: usize) -> (usize, usize) {
        match self {
            Self::Direct(s) => s.sample_geq(i),
            Self::TextOrder(s) => s.sample_geq(i),
            Self::Fuzzy(s) => s.sample_geq(i),
        }
    }

    /// The sampling density, equal to the paired SA sampling's density.
    #[inline]
    pub fn dens(&self) -> usize {
        match self {
            Self::Direct(s) => s.dens(),
            Self::TextOrder(s) => s.dens(),
            Self::Fuzzy(s) => s.dens(),
        }
    }

    /// Heap memory owned by the ISA structure itself, in bytes.
    ///
    /// Borrowing variants count only their own state, not the paired SA
    /// sampling's.
    pub fn heap_size(&self) -> usize {
        match self {
            Self::Direct(s) => s.heap_size(),
            Self::TextOrder(s) => s.heap_size(),
            Self::Fuzzy(s) => s.heap_size(),
        }
    }
}
