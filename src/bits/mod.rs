//! Bit-level containers: plain and sparse bit vectors, rank/select
//! supports, and the bit-packed integer vector used for sample storage.

mod bitvec;
mod broadword;
mod intvec;
mod rank;
mod select;
mod sparse;

pub use bitvec::{BitBuf, BitVec};
pub use broadword::select_in_word;
pub use intvec::{bits_needed, IntVec};
pub use rank::RankDirectory;
pub use select::{SelectIndex, DEFAULT_SELECT_SAMPLE_RATE};
pub use sparse::{SparseBitVec, SparseBuilder};
