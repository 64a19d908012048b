//! Definitions of error related things.

use crate::las::items::LazItemType;
use std::fmt;

/// Errors of this crate
#[derive(Debug)]
#[non_exhaustive]
pub enum LazError {
    /// An adaptive model was asked for an alphabet outside of `2..=2048`
    InvalidSymbolCount(u32),
    /// The Laz item type code is not known
    UnknownLazItem(u16),
    /// The compression version used for the item is not supported
    UnsupportedLazItemVersion(LazItemType, u16),
    /// Wrapper around an io error from the std lib
    IoError(std::io::Error),
    BufferLenNotMultipleOfPointSize {
        buffer_len: usize,
        point_size: usize,
    },
}

impl From<std::io::Error> for LazError {
    fn from(e: std::io::Error) -> Self {
        LazError::IoError(e)
    }
}

impl fmt::Display for LazError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            LazError::InvalidSymbolCount(n) => write!(
                f,
                "Invalid number of symbols: {} (must be between 2 and 2048)",
                n
            ),
            LazError::UnknownLazItem(t) => write!(f, "Item with type code: {} is unknown", t),
            LazError::UnsupportedLazItemVersion(item_type, version) => write!(
                f,
                "Item {:?} with compression version: {} is not supported",
                item_type, version
            ),
            LazError::IoError(e) => write!(f, "IoError: {}", e),
            LazError::BufferLenNotMultipleOfPointSize {
                buffer_len: bl,
                point_size: ps,
            } => write!(
                f,
                "The len of the buffer ({}) is not a multiple of the point size {}",
                bl, ps
            ),
        }
    }
}

impl std::error::Error for LazError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LazError::IoError(e) => Some(e),
            _ => None,
        }
    }
}
