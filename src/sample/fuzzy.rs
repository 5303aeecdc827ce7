//! Fuzzy (near-regular) sampling: one representative per window of ISA
//! positions, chosen to keep the chosen ISA values increasing for as
//! long as possible.
//!
//! Each `dens`-sized window of text positions contributes exactly one
//! sample. Within a window the candidate with the smallest ISA value not
//! below the previous window's choice extends the increasing run; when no
//! such candidate exists the window falls back to its overall minimum and
//! a new run starts. Compared to strict text-order marking this trades
//! marking regularity for a more uniform distribution of samples in
//! suffix order.
//!
//! Recovery composes three structures: the SA-side marking vector maps a
//! slot to its sample rank, the inverse permutation maps that rank back
//! to its window, and an ISA-side select yields the window's marked text
//! position, which is the slot's SA value.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::SparseBitVec;
use crate::perm::PermVec;

#[cfg(feature = "std")]
use crate::cache::{Cache, KEY_ISA, KEY_SA};
#[cfg(feature = "std")]
use crate::error::{Error, Result};

/// Order-preserving approximate sampling over ISA windows.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FuzzySampling {
    dens: usize,
    marked_sa: SparseBitVec,
    marked_isa: SparseBitVec,
    inv_perm: PermVec,
    runs: usize,
}

impl FuzzySampling {
    /// Construct from the cached inverse suffix array, building it from
    /// the suffix array first if it is not cached yet.
    ///
    /// One sequential scan of the ISA plus the inverse-permutation build.
    #[cfg(feature = "std")]
    pub fn from_cache(cache: &mut Cache, config: &crate::sample::SamplingConfig) -> Result<Self> {
        #[cfg(not(test))]
        use alloc::vec::Vec;

        use crate::bits::BitBuf;

        let dens = config.dens;
        if dens == 0 {
            return Err(Error::InvalidDensity);
        }

        if !cache.exists(KEY_ISA) {
            cache.construct_isa()?;
        }
        cache.register(KEY_SA)?;

        let isa = cache.load_ints(KEY_ISA)?;
        let n = isa.len();
        let windows = n.div_ceil(dens);

        let mut marked_isa_buf = BitBuf::zeroed(n);
        let mut marked_sa_buf = BitBuf::zeroed(n);
        let mut staging: Vec<u64> = Vec::with_capacity(windows);
        let mut runs = 1;
        let mut min_prev_val = 0u64;

        let mut i = 0;
        while i < n {
            // pos_min: window offset with the smallest ISA value, the
            // fallback when the increasing run cannot be extended.
            // pos_cnd: among offsets with ISA value >= min_prev_val, the
            // one with the smallest ISA value; `n` marks "none yet".
            let mut pos_min = i;
            let mut pos_cnd = if isa.get(i) >= min_prev_val { i } else { n };
            let mut j = i + 1;
            while j < i + dens && j < n {
                if isa.get(j) < isa.get(pos_min) {
                    pos_min = j;
                }
                if isa.get(j) >= min_prev_val {
                    if pos_cnd == n {
                        pos_cnd = j;
                    } else if isa.get(j) < isa.get(pos_cnd) {
                        pos_cnd = j;
                    }
                }
                j += 1;
            }
            if pos_cnd == n {
                pos_cnd = pos_min;
                runs += 1;
            }
            min_prev_val = isa.get(pos_cnd);
            marked_isa_buf.set(pos_cnd);
            staging.push(min_prev_val);
            marked_sa_buf.set(min_prev_val as usize);
            i += dens;
        }

        // Rewrite the staged SA positions as ranks within the SA-side
        // marking, so the auxiliary structure stores sample ranks.
        let sa_positions: Vec<usize> = marked_sa_buf.iter_ones().collect();
        for value in &mut staging {
            *value = sa_positions.partition_point(|&p| p < *value as usize) as u64;
        }

        let rate = config.select_sample_rate;
        Ok(Self {
            dens,
            marked_sa: SparseBitVec::from_positions_with_rate(
                n,
                windows,
                sa_positions.iter().copied(),
                rate,
            )?,
            marked_isa: SparseBitVec::from_positions_with_rate(
                n,
                windows,
                marked_isa_buf.iter_ones(),
                rate,
            )?,
            inv_perm: PermVec::build(&staging, config.tau, rate),
            runs,
        })
    }

    /// Returns true if SA slot `i` is sampled.
    #[inline]
    pub fn is_sampled(&self, i: usize) -> bool {
        self.marked_sa.get(i)
    }

    /// The suffix array value at the sampled slot `i`.
    ///
    /// `i` must satisfy [`FuzzySampling::is_sampled`]; for other slots
    /// the result is meaningless.
    #[inline]
    pub fn value(&self, i: usize) -> usize {
        let window = self.inv_perm.pos_of(self.marked_sa.rank(i));
        match self.marked_isa.select(window) {
            Some(pos) => pos,
            None => unreachable!("window index bounded by sample count"),
        }
    }

    /// The inverse-permutation entry for window `i` (a sample rank).
    #[inline]
    pub fn inv(&self, i: usize) -> usize {
        self.inv_perm.get(i)
    }

    /// Number of windows, which equals the number of samples.
    #[inline]
    pub fn window_count(&self) -> usize {
        self.inv_perm.len()
    }

    /// Number of retained samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.inv_perm.len()
    }

    /// Returns true if no samples are retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inv_perm.is_empty()
    }

    /// The sampling density.
    #[inline]
    pub fn dens(&self) -> usize {
        self.dens
    }

    /// Number of increasing runs observed during construction.
    ///
    /// Purely diagnostic; no query depends on it.
    #[inline]
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// The marking vector over SA slots.
    #[inline]
    pub fn marked_sa(&self) -> &SparseBitVec {
        &self.marked_sa
    }

    /// The marking vector over ISA (text) positions.
    #[inline]
    pub fn marked_isa(&self) -> &SparseBitVec {
        &self.marked_isa
    }

    /// Heap memory used, in bytes.
    pub fn heap_size(&self) -> usize {
        self.marked_sa.heap_size() + self.marked_isa.heap_size() + self.inv_perm.heap_size()
    }
}

#[cfg(feature = "std")]
impl crate::binary::Persist for FuzzySampling {
    fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::binary::{self, Persist};

        let mut written = binary::write_u64(out, self.dens as u64)?;
        written += binary::write_u64(out, self.runs as u64)?;
        written += self.marked_sa.write_to(out)?;
        written += self.marked_isa.write_to(out)?;
        written += self.inv_perm.write_to(out)?;
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
        let runs = binary::read_u64(input)? as usize;
        let marked_sa = SparseBitVec::read_from(input)?;
        let marked_isa = SparseBitVec::read_from(input)?;
        let inv_perm = PermVec::read_from(input)?;
        Ok(Self {
            dens,
            marked_sa,
            marked_isa,
            inv_perm,
            runs,
        })
    }
}
