//! Fixed-size block sources.

use crate::{Error, Result};
use bytes::BytesMut;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Ordered supplier of fixed-size blocks.
///
/// Every block returned has the same length. A short trailing read is end of
/// stream, never a block. Errors are real read faults only.
pub trait BlockSource {
    /// Size in bytes of each block.
    fn block_size(&self) -> usize;

    /// Next block, `Ok(None)` at end of stream.
    fn next_block(&mut self) -> io::Result<Option<&[u8]>>;
}

/// Block source over any [`Read`] implementation.
pub struct ReaderSource<R> {
    reader: R,
    buf: BytesMut,
    blocks_read: u64,
    trailing: usize,
    finished: bool,
}

impl<R: Read> ReaderSource<R> {
    /// Create a source reading `block_size` bytes at a time.
    pub fn new(reader: R, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidBlockSize(block_size));
        }

        Ok(Self {
            reader,
            buf: BytesMut::zeroed(block_size),
            blocks_read: 0,
            trailing: 0,
            finished: false,
        })
    }

    /// Number of complete blocks handed out so far.
    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    /// Bytes of the incomplete final block that were ignored.
    pub fn trailing_bytes(&self) -> usize {
        self.trailing
    }

    fn fill(&mut self) -> io::Result<usize> {
        let mut filled = 0;
        while filled < self.buf.len() {
            match self.reader.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl ReaderSource<BufReader<File>> {
    /// Open a file as a block source.
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file), block_size)
    }
}

impl<R: Read> BlockSource for ReaderSource<R> {
    fn block_size(&self) -> usize {
        self.buf.len()
    }

    fn next_block(&mut self) -> io::Result<Option<&[u8]>> {
        if self.finished {
            return Ok(None);
        }

        let filled = self.fill()?;
        if filled < self.buf.len() {
            self.finished = true;
            self.trailing = filled;
            if filled > 0 {
                tracing::debug!(bytes = filled, "Ignoring incomplete final block");
            }
            return Ok(None);
        }

        self.blocks_read += 1;
        Ok(Some(&self.buf[..]))
    }
}

/// Several files read back to back as one seekable stream.
///
/// Captures split across multiple files (for example a disk image cut into
/// 2 GiB pieces) are scanned and exported as if they were one input.
#[derive(Debug)]
pub struct FileChain {
    parts: Vec<FilePart>,
    len: u64,
    pos: u64,
}

#[derive(Debug)]
struct FilePart {
    file: File,
    start: u64,
    len: u64,
}

impl FileChain {
    /// Open `paths` in order.
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::NoInput);
        }

        let mut parts = Vec::with_capacity(paths.len());
        let mut start = 0;
        for path in paths {
            let path = path.as_ref();
            let file = File::open(path)?;
            let len = file.metadata()?.len();
            tracing::debug!(path = %path.display(), offset = start, bytes = len, "Adding input file");
            parts.push(FilePart { file, start, len });
            start += len;
        }

        Ok(Self {
            parts,
            len: start,
            pos: 0,
        })
    }

    /// Total length of all files in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether every file is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of files in the chain.
    pub fn file_count(&self) -> usize {
        self.parts.len()
    }

    fn part_at(&self, pos: u64) -> Option<usize> {
        self.parts.iter().position(|p| pos < p.start + p.len)
    }
}

impl Read for FileChain {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(index) = self.part_at(self.pos) else {
            return Ok(0);
        };

        // Reads never cross a file boundary.
        let part = &mut self.parts[index];
        let offset = self.pos - part.start;
        let want = (part.len - offset).min(buf.len() as u64) as usize;

        part.file.seek(SeekFrom::Start(offset))?;
        let n = part.file.read(&mut buf[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for FileChain {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(n) => self.len.checked_add_signed(n),
            SeekFrom::Current(n) => self.pos.checked_add_signed(n),
        };

        match target {
            Some(pos) => {
                self.pos = pos;
                Ok(pos)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

impl ReaderSource<BufReader<FileChain>> {
    /// Open several files as one block source.
    pub fn open_chain<P: AsRef<Path>>(paths: &[P], block_size: usize) -> Result<Self> {
        let chain = FileChain::open(paths)?;
        Self::new(BufReader::new(chain), block_size)
    }
}
