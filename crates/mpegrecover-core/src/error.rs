//! Error types for mpegrecover-core.

use std::io;
use thiserror::Error;

/// Result type for mpegrecover-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mpegrecover-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred while reading or writing stream data.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No input files were given.
    #[error("No input files given")]
    NoInput,

    /// Block size cannot be used for scanning.
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// Buffer too small for operation.
    #[error("Buffer underflow: need {need} bytes, have {have}")]
    BufferUnderflow { need: usize, have: usize },

    /// Fragment refers to blocks beyond the end of the input.
    #[error("Fragment at block {start_block} ({block_count} blocks) exceeds input of {available} blocks")]
    FragmentOutOfRange {
        start_block: u64,
        block_count: u64,
        available: u64,
    },
}

impl Error {
    /// Whether this error came from the underlying byte source.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidBlockSize(0);
        assert_eq!(err.to_string(), "Invalid block size: 0");
        assert_eq!(Error::NoInput.to_string(), "No input files given");

        let err = Error::FragmentOutOfRange {
            start_block: 10,
            block_count: 5,
            available: 12,
        };
        assert_eq!(
            err.to_string(),
            "Fragment at block 10 (5 blocks) exceeds input of 12 blocks"
        );
    }

    #[test]
    fn test_io_error_from() {
        let err: Error = io::Error::new(io::ErrorKind::UnexpectedEof, "short").into();
        assert!(err.is_io());
        assert!(!Error::InvalidBlockSize(0).is_io());
    }
}
