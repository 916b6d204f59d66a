//! Contiguous runs of valid blocks.

use crate::timestamp::Timestamp;
use std::ops::Range;

/// One uninterrupted run of blocks with an advancing clock.
///
/// Created by the [`Scanner`](crate::Scanner) when a run closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    /// Index of the first block of the run.
    pub start_block: u64,
    /// Number of blocks in the run (at least one).
    pub block_count: u64,
    /// SCR of the first block.
    pub start_time: Timestamp,
    /// SCR of the last block.
    pub end_time: Timestamp,
}

impl Fragment {
    /// Index one past the last block.
    pub fn end_block(&self) -> u64 {
        self.start_block + self.block_count
    }

    /// Clock time covered by the fragment.
    pub fn duration(&self) -> Timestamp {
        self.end_time.difference(self.start_time)
    }

    /// Byte range of the fragment in the input for a given block size.
    pub fn byte_range(&self, block_size: usize) -> Range<u64> {
        let block_size = block_size as u64;
        self.start_block * block_size..self.end_block() * block_size
    }

    /// Whether `next` can follow this fragment in playback within `gap` ticks.
    pub fn is_continued_by(&self, next: &Fragment, gap: Timestamp) -> bool {
        self.end_time <= next.start_time && next.start_time.difference(self.end_time) <= gap
    }
}
