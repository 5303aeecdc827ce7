//! Binary serialization for sampling structures.
//!
//! The on-disk format is little-endian `u64` words. Variable-length word
//! arrays are prefixed with their length so structures can be framed in a
//! single stream; headerless raw-word files remain readable through
//! [`bytes_to_words`] and the optional memory-mapped loader.

#[cfg(not(test))]
use alloc::vec::Vec;

use bytemuck::cast_slice;

/// View a slice of u64 words as raw little-endian bytes.
#[inline]
pub fn words_to_bytes(words: &[u64]) -> &[u8] {
    cast_slice(words)
}

/// View raw bytes as u64 words.
///
/// # Panics
///
/// Panics if `bytes.len()` is not a multiple of 8.
#[inline]
pub fn bytes_to_words(bytes: &[u8]) -> &[u64] {
    if bytes.is_empty() {
        return &[];
    }
    assert!(
        bytes.len() % 8 == 0,
        "byte slice length must be a multiple of 8, got {}",
        bytes.len()
    );
    cast_slice(bytes)
}

/// Read u64 words from raw bytes into an owned Vec.
pub fn bytes_to_words_vec(bytes: &[u8]) -> Vec<u64> {
    bytes_to_words(bytes).to_vec()
}

/// Byte-stream serialization.
///
/// `write_to` reports the number of bytes written so callers can account
/// for the space each component occupies inside a larger index file.
/// `read_from` must leave the value fully wired: any rank/select support
/// derived from stored data is rebuilt before the value is returned, never
/// read back half-initialized.
#[cfg(feature = "std")]
pub trait Persist: Sized {
    /// Serialize into `out`, returning the number of bytes written.
    fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<usize>;

    /// Deserialize from `input`, rebuilding any derived supports.
    fn read_from<R: std::io::Read>(input: &mut R) -> std::io::Result<Self>;
}

/// Write a single u64 as little-endian bytes. Returns 8.
#[cfg(feature = "std")]
pub fn write_u64<W: std::io::Write>(out: &mut W, value: u64) -> std::io::Result<usize> {
    out.write_all(&value.to_le_bytes())?;
    Ok(8)
}

/// Read a single little-endian u64.
#[cfg(feature = "std")]
pub fn read_u64<R: std::io::Read>(input: &mut R) -> std::io::Result<u64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Write a length-prefixed word array. Returns the number of bytes written.
#[cfg(feature = "std")]
pub fn write_words<W: std::io::Write>(out: &mut W, words: &[u64]) -> std::io::Result<usize> {
    let mut written = write_u64(out, words.len() as u64)?;
    out.write_all(words_to_bytes(words))?;
    written += words.len() * 8;
    Ok(written)
}

/// Read a length-prefixed word array.
#[cfg(feature = "std")]
pub fn read_words<R: std::io::Read>(input: &mut R) -> std::io::Result<Vec<u64>> {
    let len = read_u64(input)? as usize;
    let mut bytes = vec![0u8; len * 8];
    input.read_exact(&mut bytes)?;
    Ok(bytes_to_words_vec(&bytes))
}

/// Memory-mapped file support for zero-copy access to cached word arrays.
#[cfg(feature = "mmap")]
pub mod mmap {
    use memmap2::Mmap;
    use std::fs::File;
    use std::io;
    use std::path::Path;

    /// A memory-mapped word vector.
    pub struct MmapWords {
        mmap: Mmap,
    }

    impl MmapWords {
        /// Open a file and memory-map it.
        ///
        /// The file must not be modified while the mapping is active.
        pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };

            if mmap.len() % 8 != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "file size is not a multiple of 8",
                ));
            }

            Ok(Self { mmap })
        }

        /// The mapped words.
        #[inline]
        pub fn words(&self) -> &[u64] {
            super::bytes_to_words(&self.mmap)
        }

        /// Number of mapped words.
        #[inline]
        pub fn len(&self) -> usize {
            self.mmap.len() / 8
        }

        /// Returns true if the file holds no words.
        #[inline]
        pub fn is_empty(&self) -> bool {
            self.mmap.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_bytes_roundtrip() {
        let original = vec![
            0x1111_1111_1111_1111u64,
            0xFFFF_FFFF_FFFF_FFFF,
            0x0000_0000_0000_0000,
            0x0123_4567_89AB_CDEF,
        ];
        let bytes = words_to_bytes(&original);
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes_to_words_vec(bytes), original);
    }

    #[test]
    fn test_words_to_bytes_little_endian() {
        let words = [0x0123_4567_89AB_CDEFu64];
        let bytes = words_to_bytes(&words);
        assert_eq!(bytes, &[0xEF, 0xCD, 0xAB, 0x89, 0x67, 0x45, 0x23, 0x01]);
    }

    #[test]
    #[should_panic(expected = "must be a multiple of 8")]
    fn test_bytes_to_words_invalid_length() {
        let bytes = [0u8; 7];
        let _ = bytes_to_words(&bytes);
    }

    #[test]
    fn test_u64_stream_roundtrip() {
        let mut buf = Vec::new();
        assert_eq!(write_u64(&mut buf, 42).unwrap(), 8);
        assert_eq!(write_u64(&mut buf, u64::MAX).unwrap(), 8);

        let mut cursor = std::io::Cursor::new(buf);
        assert_eq!(read_u64(&mut cursor).unwrap(), 42);
        assert_eq!(read_u64(&mut cursor).unwrap(), u64::MAX);
    }

    #[test]
    fn test_word_array_roundtrip() {
        let words = vec![7u64, 0, u64::MAX];
        let mut buf = Vec::new();
        let written = write_words(&mut buf, &words).unwrap();
        assert_eq!(written, 8 + 3 * 8);

        let mut cursor = std::io::Cursor::new(buf);
        assert_eq!(read_words(&mut cursor).unwrap(), words);
    }

    #[test]
    fn test_empty_word_array() {
        let mut buf = Vec::new();
        write_words(&mut buf, &[]).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        assert!(read_words(&mut cursor).unwrap().is_empty());
    }
}
