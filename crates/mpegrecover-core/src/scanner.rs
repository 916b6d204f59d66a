//! Fragment detection.
//!
//! The scanner walks the block stream once. Each block either starts a valid
//! pack header, in which case its SCR decides whether the current fragment
//! continues, or it does not, which ends the current fragment.

use crate::fragment::Fragment;
use crate::header;
use crate::source::{BlockSource, ReaderSource};
use crate::timestamp::Timestamp;
use crate::{Result, DEFAULT_BLOCK_SIZE, DEFAULT_GAP_SIZE};
use std::io::Read;
use std::path::Path;

/// Emit a progress trace every this many blocks.
const PROGRESS_INTERVAL: u64 = 1 << 16;

/// Why a fragment was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    /// The clock went backwards.
    Backward,
    /// The clock jumped forward by more than the gap threshold.
    Gap,
    /// The block had no valid pack header.
    Invalid,
    /// The source ran out of blocks.
    EndOfStream,
}

/// Fragment scanner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanner {
    block_size: usize,
    gap: Timestamp,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Create a scanner with the default block size and gap threshold.
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            gap: Timestamp::from_integer(DEFAULT_GAP_SIZE),
        }
    }

    /// Set the block size used by [`scan_reader`](Self::scan_reader) and
    /// [`scan_file`](Self::scan_file).
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the largest forward clock jump, in ticks, allowed inside a fragment.
    pub fn with_gap_size(mut self, ticks: u32) -> Self {
        self.gap = Timestamp::from_integer(ticks);
        self
    }

    /// Configured block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Configured gap threshold.
    pub fn gap(&self) -> Timestamp {
        self.gap
    }

    /// Scan a block source.
    ///
    /// Blocks are numbered from zero in the order the source yields them.
    /// A read fault aborts the scan and no fragments are returned.
    pub fn scan<S: BlockSource + ?Sized>(&self, source: &mut S) -> Result<Vec<Fragment>> {
        let mut state = ScanState::new(self.gap);
        let mut index = 0u64;

        loop {
            let block = match source.next_block() {
                Ok(Some(block)) => block,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        block = index,
                        fragments = state.fragments.len(),
                        "Read fault, discarding scan: {}",
                        e
                    );
                    return Err(e.into());
                }
            };

            state.push(index, header::extract(block));
            index += 1;

            if index % PROGRESS_INTERVAL == 0 {
                tracing::trace!(
                    blocks = index,
                    fragments = state.fragments.len(),
                    "Scan progress"
                );
            }
        }

        let valid = state.valid_blocks;
        let fragments = state.finish(index);
        tracing::info!(
            blocks = index,
            valid_blocks = valid,
            fragments = fragments.len(),
            "Scan finished"
        );

        Ok(fragments)
    }

    /// Scan a reader in blocks of the configured size.
    pub fn scan_reader<R: Read>(&self, reader: R) -> Result<Vec<Fragment>> {
        let mut source = ReaderSource::new(reader, self.block_size)?;
        self.scan(&mut source)
    }

    /// Open and scan a file in blocks of the configured size.
    pub fn scan_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Fragment>> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), block_size = self.block_size, "Scanning file");
        let mut source = ReaderSource::open(path, self.block_size)?;
        self.scan(&mut source)
    }

    /// Scan several files as one capture, in the order given.
    pub fn scan_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Fragment>> {
        tracing::debug!(files = paths.len(), block_size = self.block_size, "Scanning files");
        let mut source = ReaderSource::open_chain(paths, self.block_size)?;
        self.scan(&mut source)
    }
}

/// Fragment being extended.
///
/// `last_time` doubles as the previous timestamp: a previous valid block
/// exists exactly when a fragment is open.
#[derive(Debug, Clone, Copy)]
struct OpenFragment {
    start_block: u64,
    start_time: Timestamp,
    last_time: Timestamp,
}

struct ScanState {
    gap: Timestamp,
    open: Option<OpenFragment>,
    fragments: Vec<Fragment>,
    valid_blocks: u64,
}

impl ScanState {
    fn new(gap: Timestamp) -> Self {
        Self {
            gap,
            open: None,
            fragments: Vec::new(),
            valid_blocks: 0,
        }
    }

    fn push(&mut self, index: u64, scr: Option<Timestamp>) {
        let Some(time) = scr else {
            self.close(index, CloseReason::Invalid);
            return;
        };
        self.valid_blocks += 1;

        let reason = match self.open {
            None => None,
            Some(open) if time < open.last_time => Some(CloseReason::Backward),
            Some(open) if time.difference(open.last_time) > self.gap => Some(CloseReason::Gap),
            Some(ref mut open) => {
                open.last_time = time;
                return;
            }
        };
        if let Some(reason) = reason {
            self.close(index, reason);
        }

        self.open = Some(OpenFragment {
            start_block: index,
            start_time: time,
            last_time: time,
        });
    }

    /// Close the open fragment, if any, just before block `index`.
    fn close(&mut self, index: u64, reason: CloseReason) {
        let Some(open) = self.open.take() else {
            return;
        };

        let fragment = Fragment {
            start_block: open.start_block,
            block_count: index - open.start_block,
            start_time: open.start_time,
            end_time: open.last_time,
        };
        tracing::debug!(
            start_block = fragment.start_block,
            block_count = fragment.block_count,
            start = %fragment.start_time,
            end = %fragment.end_time,
            reason = ?reason,
            "Fragment closed"
        );
        self.fragments.push(fragment);
    }

    fn finish(mut self, index: u64) -> Vec<Fragment> {
        self.close(index, CloseReason::EndOfStream);
        self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    const BLOCK: usize = 16;

    /// Build a stream where `Some(t)` is a valid block with SCR `t`.
    fn stream(blocks: &[Option<u32>]) -> Vec<u8> {
        let mut data = vec![0u8; blocks.len() * BLOCK];
        for (chunk, scr) in data.chunks_mut(BLOCK).zip(blocks) {
            if let Some(t) = scr {
                header::write_pack_header(chunk, Timestamp::from_integer(*t)).unwrap();
            }
        }
        data
    }

    fn scan(blocks: &[Option<u32>], gap: u32) -> Vec<(u64, u64, u64, u64)> {
        Scanner::new()
            .with_block_size(BLOCK)
            .with_gap_size(gap)
            .scan_reader(Cursor::new(stream(blocks)))
            .unwrap()
            .iter()
            .map(|f| {
                (
                    f.start_block,
                    f.block_count,
                    f.start_time.ticks(),
                    f.end_time.ticks(),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_source() {
        assert!(scan(&[], 90_000).is_empty());
    }

    #[test]
    fn test_all_invalid() {
        assert!(scan(&[None, None, None], 90_000).is_empty());
    }

    #[test]
    fn test_single_valid_block() {
        assert_eq!(scan(&[Some(42)], 90_000), vec![(0, 1, 42, 42)]);
    }

    #[test]
    fn test_invalid_block_splits() {
        let blocks = [Some(1), Some(2), None, Some(3), Some(4)];
        assert_eq!(scan(&blocks, 90_000), vec![(0, 2, 1, 2), (3, 2, 3, 4)]);
    }

    #[test]
    fn test_equal_timestamps_extend() {
        let blocks = [Some(100), Some(100), Some(100)];
        assert_eq!(scan(&blocks, 0), vec![(0, 3, 100, 100)]);
    }

    #[test]
    fn test_backward_jump_cuts_without_invalid_block() {
        let blocks = [Some(5000), Some(6000), Some(5999), Some(7000)];
        assert_eq!(
            scan(&blocks, 90_000),
            vec![(0, 2, 5000, 6000), (2, 2, 5999, 7000)]
        );
    }

    #[test]
    fn test_gap_boundary() {
        // A jump of exactly the gap size is allowed.
        let blocks = [Some(1000), Some(91_000)];
        assert_eq!(scan(&blocks, 90_000), vec![(0, 2, 1000, 91_000)]);

        // One tick more cuts.
        let blocks = [Some(1000), Some(91_001)];
        assert_eq!(
            scan(&blocks, 90_000),
            vec![(0, 1, 1000, 1000), (1, 1, 91_001, 91_001)]
        );
    }

    #[test]
    fn test_zero_gap() {
        let blocks = [Some(10), Some(10), Some(11)];
        assert_eq!(scan(&blocks, 0), vec![(0, 2, 10, 10), (2, 1, 11, 11)]);
    }

    #[test]
    fn test_trailing_fragment_closed_at_end() {
        let blocks = [None, Some(7), Some(8)];
        assert_eq!(scan(&blocks, 90_000), vec![(1, 2, 7, 8)]);
    }

    #[test]
    fn test_trailing_partial_block_ignored() {
        let mut data = stream(&[Some(1), Some(2)]);
        // A truncated final block that would otherwise be valid.
        let mut partial = vec![0u8; BLOCK];
        header::write_pack_header(&mut partial, Timestamp::from_integer(3)).unwrap();
        data.extend_from_slice(&partial[..BLOCK - 1]);

        let fragments = Scanner::new()
            .with_block_size(BLOCK)
            .scan_reader(Cursor::new(data))
            .unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].block_count, 2);
    }

    #[test]
    fn test_wraparound_is_a_cut() {
        let max = Timestamp::from_ticks(crate::timestamp::SCR_MAX);
        let mut data = vec![0u8; 2 * BLOCK];
        header::write_pack_header(&mut data[..BLOCK], max).unwrap();
        header::write_pack_header(&mut data[BLOCK..], Timestamp::ZERO).unwrap();

        let fragments = Scanner::new()
            .with_block_size(BLOCK)
            .scan_reader(Cursor::new(data))
            .unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].end_time, max);
        assert_eq!(fragments[1].start_time, Timestamp::ZERO);
    }

    struct FaultySource {
        blocks: Vec<Vec<u8>>,
        next: usize,
    }

    impl BlockSource for FaultySource {
        fn block_size(&self) -> usize {
            BLOCK
        }

        fn next_block(&mut self) -> io::Result<Option<&[u8]>> {
            let i = self.next;
            self.next += 1;
            match self.blocks.get(i) {
                Some(block) => Ok(Some(block.as_slice())),
                None => Err(io::Error::other("bad sector")),
            }
        }
    }

    #[test]
    fn test_read_fault_discards_fragments() {
        let data = stream(&[Some(1), Some(2), None, Some(3)]);
        let mut source = FaultySource {
            blocks: data.chunks(BLOCK).map(<[u8]>::to_vec).collect(),
            next: 0,
        };

        let result = Scanner::new().scan(&mut source);
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_builder_accessors() {
        let scanner = Scanner::new().with_block_size(512).with_gap_size(45_000);
        assert_eq!(scanner.block_size(), 512);
        assert_eq!(scanner.gap(), Timestamp::from_integer(45_000));
        assert_eq!(Scanner::default(), Scanner::new());
    }
}
