//! Permutation storage with fast inverse lookup.
//!
//! Both structures here answer "at which index does value `v` occur"
//! without storing the inverse permutation: every `tau`-th element along
//! each cycle of the permutation is marked and given a back pointer to the
//! element `tau` steps earlier on the cycle. A lookup walks forward at
//! most `tau` steps to a marked element, takes one back jump, and walks
//! forward again at most `tau` steps, so queries cost O(tau) while the
//! shortcut state costs ~`len/tau` entries.
//!
//! [`PermVec`] owns its values (the fuzzy sampler's window-to-sample-rank
//! map). [`InvPermSupport`] borrows an [`IntVec`] owned by someone else
//! (the text-order sampler's condensed samples); the borrow is the
//! back-reference, so the support can never outlive or dangle from the
//! permutation it indexes.

#[cfg(not(test))]
use alloc::vec::Vec;

use crate::bits::{bits_needed, BitBuf, BitVec, IntVec};
use crate::RankSelect;

/// Default shortcut stride.
pub const DEFAULT_TAU: usize = 8;

/// Walk each cycle of the permutation, marking every `tau`-th element and
/// recording a back pointer to the element `tau` steps earlier (wrapping
/// within the cycle).
fn build_shortcuts<F>(len: usize, get: F, tau: usize, sample_rate: u32) -> (BitVec, IntVec)
where
    F: Fn(usize) -> usize,
{
    assert!(tau >= 1, "shortcut stride must be at least 1");

    let mut visited = BitBuf::zeroed(len);
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    let mut cycle: Vec<usize> = Vec::new();

    for start in 0..len {
        if visited.get(start) {
            continue;
        }

        cycle.clear();
        let mut j = start;
        loop {
            visited.set(j);
            cycle.push(j);
            j = get(j);
            if j == start {
                break;
            }
        }

        let cycle_len = cycle.len();
        let step_back = tau % cycle_len;
        for s in (0..cycle_len).step_by(tau) {
            let pos = cycle[s];
            let back = cycle[(s + cycle_len - step_back) % cycle_len];
            pairs.push((pos, back));
        }
    }

    let mut marked_buf = BitBuf::zeroed(len);
    for &(pos, _) in &pairs {
        marked_buf.set(pos);
    }
    let marked = marked_buf.into_bitvec(sample_rate);

    let mut back = IntVec::new(pairs.len(), bits_needed(len as u64));
    for &(pos, target) in &pairs {
        back.set(marked.rank1(pos), target as u64);
    }
    (marked, back)
}

/// Find the index at which the permutation takes value `v`.
///
/// At most one back jump is taken; afterwards the walk runs forward only,
/// so the loop terminates within 2*tau steps.
fn inverse_walk<F>(get: F, marked: &BitVec, back: &IntVec, v: usize) -> usize
where
    F: Fn(usize) -> usize,
{
    let mut j = v;
    let mut jumped = false;
    loop {
        if get(j) == v {
            return j;
        }
        if !jumped && marked.get(j) {
            j = back.get(marked.rank1(j)) as usize;
            jumped = true;
            continue;
        }
        j = get(j);
    }
}

/// An owned permutation of `[0, len)` with O(tau) inverse lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermVec {
    values: IntVec,
    tau: usize,
    marked: BitVec,
    back: IntVec,
}

impl PermVec {
    /// Build from a permutation of `[0, values.len())`.
    ///
    /// # Panics
    ///
    /// Panics if `tau` is 0. Behavior is unspecified if `values` is not a
    /// permutation.
    pub fn build(values: &[u64], tau: usize, sample_rate: u32) -> Self {
        let len = values.len();
        let packed = IntVec::from_values(values, bits_needed(len as u64));
        let (marked, back) =
            build_shortcuts(len, |i| packed.get(i) as usize, tau, sample_rate);
        Self {
            values: packed,
            tau,
            marked,
            back,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the permutation is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at index `i`.
    #[inline]
    pub fn get(&self, i: usize) -> usize {
        self.values.get(i) as usize
    }

    /// The index at which value `v` occurs.
    ///
    /// # Panics
    ///
    /// Panics if `v >= len`.
    #[inline]
    pub fn pos_of(&self, v: usize) -> usize {
        assert!(v < self.len(), "value {} out of range", v);
        inverse_walk(|i| self.values.get(i) as usize, &self.marked, &self.back, v)
    }

    /// The shortcut stride.
    #[inline]
    pub fn tau(&self) -> usize {
        self.tau
    }

    /// Heap memory used, in bytes.
    pub fn heap_size(&self) -> usize {
        self.values.heap_size() + self.marked.heap_size() + self.back.heap_size()
    }
}

#[cfg(feature = "std")]
impl crate::binary::Persist for PermVec {
    fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::binary::{self, Persist};

        let mut written = binary::write_u64(out, self.tau as u64)?;
        written += binary::write_u64(out, self.marked.sample_rate() as u64)?;
        written += self.values.write_to(out)?;
        Ok(written)
    }

    fn read_from<R: std::io::Read>(input: &mut R) -> std::io::Result<Self> {
        use crate::binary::{self, Persist};

        let tau = binary::read_u64(input)? as usize;
        let sample_rate = binary::read_u64(input)? as u32;
        let values = IntVec::read_from(input)?;

        if tau == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "shortcut stride must be at least 1",
            ));
        }
        // Shortcut state is a function of the values; rebuilt, not stored.
        let (marked, back) =
            build_shortcuts(values.len(), |i| values.get(i) as usize, tau, sample_rate);
        Ok(Self {
            values,
            tau,
            marked,
            back,
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PermVec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("PermVec", 3)?;
        s.serialize_field("values", &self.values)?;
        s.serialize_field("tau", &self.tau)?;
        s.serialize_field("sample_rate", &self.marked.sample_rate())?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PermVec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            values: IntVec,
            tau: usize,
            sample_rate: u32,
        }

        let raw = Raw::deserialize(deserializer)?;
        if raw.tau == 0 {
            return Err(serde::de::Error::custom("shortcut stride must be at least 1"));
        }
        let (marked, back) = build_shortcuts(
            raw.values.len(),
            |i| raw.values.get(i) as usize,
            raw.tau,
            raw.sample_rate,
        );
        Ok(Self {
            values: raw.values,
            tau: raw.tau,
            marked,
            back,
        })
    }
}

/// Inverse-lookup support over an [`IntVec`] permutation owned elsewhere.
///
/// The lifetime ties the support to the vector it indexes; relocating the
/// owner invalidates the support at compile time instead of at run time.
#[derive(Clone, Debug)]
pub struct InvPermSupport<'a> {
    perm: &'a IntVec,
    tau: usize,
    marked: BitVec,
    back: IntVec,
}

impl<'a> InvPermSupport<'a> {
    /// Build shortcut state over `perm`, a permutation of `[0, perm.len())`.
    pub fn new(perm: &'a IntVec, tau: usize, sample_rate: u32) -> Self {
        let (marked, back) =
            build_shortcuts(perm.len(), |i| perm.get(i) as usize, tau, sample_rate);
        Self {
            perm,
            tau,
            marked,
            back,
        }
    }

    /// The index at which value `v` occurs in the underlying permutation.
    ///
    /// # Panics
    ///
    /// Panics if `v >= perm.len()`.
    #[inline]
    pub fn inv(&self, v: usize) -> usize {
        assert!(v < self.perm.len(), "value {} out of range", v);
        inverse_walk(|i| self.perm.get(i) as usize, &self.marked, &self.back, v)
    }

    /// The shortcut stride.
    #[inline]
    pub fn tau(&self) -> usize {
        self.tau
    }

    /// Heap memory used by the owned shortcut state, in bytes.
    pub fn heap_size(&self) -> usize {
        self.marked.heap_size() + self.back.heap_size()
    }

    /// Serialize the owned shortcut state.
    #[cfg(feature = "std")]
    pub fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize> {
        use crate::binary;

        let mut written = binary::write_u64(out, self.tau as u64)?;
        written += binary::write_u64(out, self.marked.sample_rate() as u64)?;
        Ok(written)
    }

    /// Deserialize, re-attaching the permutation back-reference.
    ///
    /// The shortcut state is rebuilt from `perm`, so a support loaded
    /// against the wrong permutation is impossible to observe.
    #[cfg(feature = "std")]
    pub fn read_from_with<R: std::io::Read>(input: &mut R, perm: &'a IntVec) -> std::io::Result<Self> {
        use crate::binary;

        let tau = binary::read_u64(input)? as usize;
        let sample_rate = binary::read_u64(input)? as u32;
        if tau == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "shortcut stride must be at least 1",
            ));
        }
        Ok(Self::new(perm, tau, sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::DEFAULT_SELECT_SAMPLE_RATE;

    fn check_inverse(values: &[u64], tau: usize) {
        let perm = PermVec::build(values, tau, DEFAULT_SELECT_SAMPLE_RATE);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(perm.get(i), v as usize);
            assert_eq!(perm.pos_of(v as usize), i, "pos_of({}) with tau={}", v, tau);
        }
    }

    #[test]
    fn test_identity() {
        check_inverse(&[0, 1, 2, 3, 4, 5], 2);
    }

    #[test]
    fn test_single_cycle() {
        // One cycle of length 8: 0 -> 3 -> 6 -> 1 -> 4 -> 7 -> 2 -> 5 -> 0
        check_inverse(&[3, 4, 5, 6, 7, 0, 1, 2], 3);
    }

    #[test]
    fn test_mixed_cycles() {
        // Fixed point, transposition, and a 5-cycle.
        check_inverse(&[0, 2, 1, 4, 5, 6, 7, 3], 2);
    }

    #[test]
    fn test_cycle_shorter_than_tau() {
        check_inverse(&[1, 0, 3, 2], 8);
    }

    #[test]
    fn test_all_tau_values() {
        let values: Vec<u64> = (0..97).map(|i| (i * 31) % 97).collect();
        for tau in [1, 2, 7, 8, 97, 200] {
            check_inverse(&values, tau);
        }
    }

    #[test]
    fn test_reverse_permutation() {
        let values: Vec<u64> = (0..50).rev().collect();
        check_inverse(&values, 4);
    }

    #[test]
    fn test_empty() {
        let perm = PermVec::build(&[], 8, DEFAULT_SELECT_SAMPLE_RATE);
        assert!(perm.is_empty());
    }

    #[test]
    fn test_inv_perm_support_borrowed() {
        let values: Vec<u64> = vec![4, 2, 0, 3, 1];
        let packed = IntVec::from_values(&values, 3);
        let support = InvPermSupport::new(&packed, 2, DEFAULT_SELECT_SAMPLE_RATE);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(support.inv(v as usize), i);
        }
    }

    #[test]
    fn test_permvec_persist_roundtrip() {
        use crate::binary::Persist;

        let values: Vec<u64> = (0..64).map(|i| (i * 13) % 64).collect();
        let perm = PermVec::build(&values, 8, DEFAULT_SELECT_SAMPLE_RATE);

        let mut buf = Vec::new();
        let written = perm.write_to(&mut buf).unwrap();
        assert_eq!(written, buf.len());

        let mut cursor = std::io::Cursor::new(buf);
        let loaded = PermVec::read_from(&mut cursor).unwrap();
        assert_eq!(loaded, perm);
        for &v in &values {
            assert_eq!(loaded.pos_of(v as usize), perm.pos_of(v as usize));
        }
    }

    #[test]
    fn test_support_serialize_rewires() {
        let values: Vec<u64> = vec![3, 1, 4, 0, 2];
        let packed = IntVec::from_values(&values, 3);
        let support = InvPermSupport::new(&packed, 2, DEFAULT_SELECT_SAMPLE_RATE);

        let mut buf = Vec::new();
        support.write_to(&mut buf).unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let loaded = InvPermSupport::read_from_with(&mut cursor, &packed).unwrap();
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(loaded.inv(v as usize), i);
        }
    }
}
