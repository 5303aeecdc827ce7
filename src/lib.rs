//! # csa-sampling
//!
//! Suffix array sampling strategies and sparse bit vectors for compressed
//! full-text indexes.
//!
//! A compressed index cannot afford to store its full suffix array (SA)
//! or inverse suffix array (ISA). This crate provides the space/time
//! tradeoff machinery: strategies that retain a sparse, recoverable
//! subset of SA/ISA entries, and the Elias-Fano sparse bit vector they
//! mark positions with.
//!
//! ## Module Organization
//!
//! - [`bits`] - Bit vectors (plain and sparse), rank/select supports, and
//!   bit-packed integer storage
//! - [`sample`] - The four SA sampling strategies and their paired ISA
//!   structures
//! - [`perm`] - Permutation storage with O(tau) inverse lookup
//! - [`cache`] - Construction-time artifact store (requires `std`)
//! - [`binary`] - Byte-stream serialization
//!
//! ## Quick Start
//!
//! ```
//! use csa_sampling::bits::SparseBuilder;
//!
//! // Declare length and exact set-bit count up front, then fill in
//! // strictly increasing order.
//! let mut builder = SparseBuilder::new(10, 3)?;
//! builder.set(1)?;
//! builder.set(4)?;
//! builder.set(9)?;
//!
//! let sv = builder.finalize()?;
//! assert_eq!(sv.rank(5), 2);
//! assert_eq!(sv.select(2), Some(9));
//! # Ok::<(), csa_sampling::Error>(())
//! ```
//!
//! ## Features
//!
//! - `std` (default) - Enables the artifact cache and byte-stream
//!   serialization; disable for no_std targets
//! - `serde` - Structured serialization/deserialization support
//! - `mmap` - Memory-mapped zero-copy loading of cache artifacts

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

/// Bit vectors, rank/select supports, and bit-packed integer storage.
pub mod bits;

/// Byte-stream serialization utilities.
pub mod binary;

/// Construction-time artifact cache.
#[cfg(feature = "std")]
pub mod cache;

/// Error types.
pub mod error;

/// Permutation storage with fast inverse lookup.
pub mod perm;

/// SA/ISA sampling strategies.
pub mod sample;

// Core types
pub use bits::{BitVec, IntVec, SparseBitVec, SparseBuilder};
pub use error::{Error, Result};
pub use perm::{InvPermSupport, PermVec};
pub use sample::{IsaSupport, SaSampling, SamplingConfig};

/// Trait for rank/select operations on bitvectors.
///
/// Rank and select are fundamental operations for succinct data structures:
/// - `rank1(i)`: Count 1-bits in positions `[0, i)`
/// - `select1(k)`: Find position of the k-th 1-bit (0-indexed)
pub trait RankSelect {
    /// Count 1-bits in positions `[0, i)`.
    ///
    /// Returns 0 if `i == 0`.
    fn rank1(&self, i: usize) -> usize;

    /// Count 0-bits in positions `[0, i)`.
    ///
    /// Default implementation: `i - rank1(i)`
    #[inline]
    fn rank0(&self, i: usize) -> usize {
        i - self.rank1(i)
    }

    /// Find position of the k-th 1-bit (0-indexed).
    ///
    /// Returns `None` if fewer than `k+1` ones exist.
    fn select1(&self, k: usize) -> Option<usize>;

    /// Find position of the k-th 0-bit (0-indexed).
    ///
    /// Returns `None` if fewer than `k+1` zeros exist.
    fn select0(&self, k: usize) -> Option<usize>;
}
