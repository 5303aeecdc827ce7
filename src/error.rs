//! Error types for sampling construction and sparse-vector building.

use core::fmt;

#[cfg(not(test))]
use alloc::string::String;

/// Errors that can occur while constructing sampling structures or
/// building sparse bit vectors.
///
/// Construction either completes or fails with one of these; no partially
/// wired structure is ever observable.
#[derive(Debug)]
pub enum Error {
    /// A sparse-vector builder was created with more set bits than the
    /// declared vector length can hold.
    BuilderCapacity {
        /// Requested number of set bits
        requested: usize,
        /// Declared vector length
        size: usize,
    },

    /// A sparse-vector builder was finalized before receiving the declared
    /// number of positions.
    BuilderUnderfilled {
        /// Positions appended so far
        items: usize,
        /// Declared number of set bits
        capacity: usize,
    },

    /// A position was appended to a builder that already holds its declared
    /// number of set bits.
    BuilderFull {
        /// Declared number of set bits
        capacity: usize,
    },

    /// Builder positions must be strictly increasing.
    NonIncreasingPosition {
        /// The offending position
        pos: usize,
        /// The last accepted position
        last: usize,
    },

    /// A builder position lies at or past the declared vector length.
    PositionOutOfRange {
        /// The offending position
        pos: usize,
        /// Declared vector length
        size: usize,
    },

    /// A sampling density of zero was requested.
    InvalidDensity,

    /// A required cache artifact is missing and cannot be constructed.
    MissingArtifact {
        /// The cache key of the missing artifact
        key: String,
    },

    /// An I/O error occurred while reading or writing cache artifacts.
    ///
    /// Propagated as-is; no retries are attempted at this level.
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BuilderCapacity { requested, size } => {
                write!(
                    f,
                    "builder capacity {} exceeds vector size {}",
                    requested, size
                )
            }
            Error::BuilderUnderfilled { items, capacity } => {
                write!(
                    f,
                    "builder finalized with {} of {} positions",
                    items, capacity
                )
            }
            Error::BuilderFull { capacity } => {
                write!(f, "builder already holds {} positions", capacity)
            }
            Error::NonIncreasingPosition { pos, last } => {
                write!(
                    f,
                    "position {} is not greater than last position {}",
                    pos, last
                )
            }
            Error::PositionOutOfRange { pos, size } => {
                write!(f, "position {} out of range for size {}", pos, size)
            }
            Error::InvalidDensity => {
                write!(f, "sampling density must be at least 1")
            }
            Error::MissingArtifact { key } => {
                write!(f, "cache artifact '{}' not found", key)
            }
            #[cfg(feature = "std")]
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// A specialized Result type for sampling operations.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_builder_errors() {
        let e = Error::BuilderCapacity {
            requested: 7,
            size: 5,
        };
        assert_eq!(e.to_string(), "builder capacity 7 exceeds vector size 5");

        let e = Error::BuilderUnderfilled {
            items: 2,
            capacity: 3,
        };
        assert_eq!(e.to_string(), "builder finalized with 2 of 3 positions");
    }

    #[test]
    fn test_display_position_errors() {
        let e = Error::NonIncreasingPosition { pos: 4, last: 9 };
        assert_eq!(
            e.to_string(),
            "position 4 is not greater than last position 9"
        );
    }
}
