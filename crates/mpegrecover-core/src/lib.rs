//! mpegrecover-core: MPEG program-stream fragment scanning
//!
//! This crate finds the playable pieces of a damaged MPEG program-stream
//! capture. The input is cut into fixed-size blocks; every block that starts
//! with a pack header contributes its system clock reference (SCR), and runs
//! of blocks with a steadily advancing clock become [`Fragment`]s.
//!
//! # Modules
//!
//! - `timestamp` - 33-bit SCR values and their arithmetic
//! - `header` - Pack header detection and SCR extraction
//! - `fragment` - Contiguous runs of valid blocks
//! - `source` - Fixed-size block sources over any reader
//! - `scanner` - The fragment detection state machine
//! - `merger` - Regrouping fragments into recordings
//!
//! # Example
//!
//! ```no_run
//! use mpegrecover_core::{Merger, Scanner};
//!
//! let scanner = Scanner::new().with_gap_size(90_000);
//! let fragments = scanner.scan_file("capture.vob")?;
//! let recordings = Merger::new(scanner.gap()).merge(&fragments);
//!
//! for (i, recording) in recordings.iter().enumerate() {
//!     println!("#{i}: {} fragments, {}", recording.len(), recording.duration());
//! }
//! # Ok::<(), mpegrecover_core::Error>(())
//! ```

pub mod error;
pub mod fragment;
pub mod header;
pub mod merger;
pub mod scanner;
pub mod source;
pub mod timestamp;

pub use error::{Error, Result};
pub use fragment::Fragment;
pub use merger::{Merger, Recording};
pub use scanner::Scanner;
pub use source::{BlockSource, FileChain, ReaderSource};
pub use timestamp::Timestamp;

/// Default block size in bytes (one DVD sector).
pub const DEFAULT_BLOCK_SIZE: usize = 2048;

/// Default gap threshold in clock ticks (one second).
pub const DEFAULT_GAP_SIZE: u32 = 90_000;

/// Tick rate of the system clock reference.
pub const CLOCK_HZ: u64 = 90_000;
