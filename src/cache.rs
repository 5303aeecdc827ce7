//! Construction-time artifact cache.
//!
//! Sampling strategies read previously computed arrays (suffix array,
//! inverse suffix array, BWT symbols, sampled-character set) from a
//! directory of bit-packed [`IntVec`] files keyed by name. The cache is a
//! capability handed to each strategy at construction time; it exposes
//! both "has this artifact" and "produce this artifact" operations so the
//! on-demand ISA construction inside fuzzy sampling is visible in the
//! public contract rather than hidden behind a global.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::binary::Persist;
use crate::bits::{bits_needed, IntVec};
use crate::error::{Error, Result};

/// Key of the suffix array artifact.
pub const KEY_SA: &str = "sa";

/// Key of the inverse suffix array artifact.
pub const KEY_ISA: &str = "isa";

/// Key of the sampled-character set artifact.
pub const KEY_SAMPLE_CHARS: &str = "sample_chars";

/// Key of the BWT symbol sequence stored with the given entry width.
pub fn key_bwt(width: u8) -> String {
    format!("bwt_{}", width)
}

/// A directory of bit-packed integer artifacts.
///
/// Artifacts written through the cache are recorded in an
/// insertion-ordered registry so callers can enumerate what a
/// construction produced.
#[derive(Debug)]
pub struct Cache {
    dir: PathBuf,
    registry: IndexMap<String, PathBuf>,
}

impl Cache {
    /// Open (creating if necessary) a cache rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            registry: IndexMap::new(),
        })
    }

    /// The cache directory.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the given key.
    pub fn file_name(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }

    /// Returns true if an artifact exists for `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.file_name(key).is_file()
    }

    /// Store a bit-packed integer array under `key`.
    pub fn store_ints(&mut self, key: &str, ints: &IntVec) -> Result<()> {
        let path = self.file_name(key);
        let mut out = BufWriter::new(File::create(&path)?);
        ints.write_to(&mut out)?;
        out.flush()?;
        self.registry.insert(key.to_owned(), path);
        Ok(())
    }

    /// Load the bit-packed integer array stored under `key`.
    ///
    /// Fails with [`Error::MissingArtifact`] if no artifact exists.
    pub fn load_ints(&self, key: &str) -> Result<IntVec> {
        let path = self.file_name(key);
        if !path.is_file() {
            return Err(Error::MissingArtifact {
                key: key.to_owned(),
            });
        }
        let mut input = BufReader::new(File::open(&path)?);
        Ok(IntVec::read_from(&mut input)?)
    }

    /// Remove the artifact stored under `key`, if any.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.file_name(key);
        if path.is_file() {
            fs::remove_file(&path)?;
        }
        self.registry.shift_remove(key);
        Ok(())
    }

    /// Record an existing artifact file in the registry.
    pub fn register(&mut self, key: &str) -> Result<()> {
        let path = self.file_name(key);
        if !path.is_file() {
            return Err(Error::MissingArtifact {
                key: key.to_owned(),
            });
        }
        self.registry.insert(key.to_owned(), path);
        Ok(())
    }

    /// Keys of registered artifacts in insertion order.
    pub fn artifacts(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// Ensure the inverse suffix array artifact exists, inverting the
    /// cached suffix array if it does not.
    pub fn construct_isa(&mut self) -> Result<()> {
        if self.exists(KEY_ISA) {
            return Ok(());
        }

        let sa = self.load_ints(KEY_SA)?;
        let n = sa.len();
        let mut isa = IntVec::new(n, bits_needed(n as u64));
        for (i, value) in sa.iter().enumerate() {
            isa.set(value as usize, i as u64);
        }
        self.store_ints(KEY_ISA, &isa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_ints() -> IntVec {
        IntVec::from_values(&[4, 0, 3, 1, 2], 3)
    }

    #[test]
    fn test_store_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut cache = Cache::open(tmp.path()).unwrap();

        let ints = sample_ints();
        assert!(!cache.exists(KEY_SA));
        cache.store_ints(KEY_SA, &ints).unwrap();
        assert!(cache.exists(KEY_SA));

        let loaded = cache.load_ints(KEY_SA).unwrap();
        assert_eq!(loaded, ints);
    }

    #[test]
    fn test_missing_artifact() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::open(tmp.path()).unwrap();
        let err = cache.load_ints("absent").unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));
    }

    #[test]
    fn test_remove() {
        let tmp = TempDir::new().unwrap();
        let mut cache = Cache::open(tmp.path()).unwrap();
        cache.store_ints("tmp_artifact", &sample_ints()).unwrap();
        assert!(cache.exists("tmp_artifact"));
        cache.remove("tmp_artifact").unwrap();
        assert!(!cache.exists("tmp_artifact"));
    }

    #[test]
    fn test_registry_order() {
        let tmp = TempDir::new().unwrap();
        let mut cache = Cache::open(tmp.path()).unwrap();
        cache.store_ints(KEY_SA, &sample_ints()).unwrap();
        cache.store_ints(KEY_ISA, &sample_ints()).unwrap();
        let keys: Vec<&str> = cache.artifacts().collect();
        assert_eq!(keys, vec![KEY_SA, KEY_ISA]);
    }

    #[test]
    fn test_construct_isa() {
        let tmp = TempDir::new().unwrap();
        let mut cache = Cache::open(tmp.path()).unwrap();

        // SA of "abcab$": suffixes sorted -> $ a b$ abcab$ ... computed by hand:
        // text positions: a0 b1 c2 a3 b4 $5
        // sorted suffixes: "$"(5), "ab$"(3), "abcab$"(0), "b$"(4), "bcab$"(1), "cab$"(2)
        let sa = IntVec::from_values(&[5, 3, 0, 4, 1, 2], 3);
        cache.store_ints(KEY_SA, &sa).unwrap();

        cache.construct_isa().unwrap();
        let isa = cache.load_ints(KEY_ISA).unwrap();
        let expected = [2u64, 4, 5, 1, 3, 0];
        for (i, &e) in expected.iter().enumerate() {
            assert_eq!(isa.get(i), e, "ISA[{}]", i);
        }

        // Idempotent once the artifact exists.
        cache.construct_isa().unwrap();
    }

    #[test]
    fn test_bwt_key_embeds_width() {
        assert_eq!(key_bwt(8), "bwt_8");
        assert_eq!(key_bwt(16), "bwt_16");
    }
}
