//! Export of recovered recordings.
//!
//! Each kept recording becomes one file holding the raw bytes of its
//! fragments, concatenated in playback order.

use crate::config::RecoverConfig;
use mpegrecover_core::{Error, FileChain, Fragment, Recording, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A recording written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedRecording {
    /// Index of the recording in the merge result.
    pub index: usize,
    /// Output file.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
}

/// Writes recordings into an output directory.
pub struct Exporter {
    output_dir: PathBuf,
    block_size: usize,
    config: RecoverConfig,
}

impl Exporter {
    /// Create an exporter for captures cut into `block_size` blocks.
    pub fn new<P: AsRef<Path>>(output_dir: P, block_size: usize, config: &RecoverConfig) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            block_size,
            config: config.clone(),
        }
    }

    /// Whether a recording is too short to be worth writing.
    pub fn is_discarded(&self, recording: &Recording) -> bool {
        self.config.is_discarded(recording)
    }

    /// Output path of the recording with the given index.
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{:04}.{}",
            self.config.file_prefix, index, self.config.extension
        ))
    }

    /// Recordings that would be written, with their output paths.
    pub fn plan<'a>(&self, recordings: &'a [Recording]) -> Vec<(usize, &'a Recording, PathBuf)> {
        recordings
            .iter()
            .enumerate()
            .filter(|(_, r)| !self.is_discarded(r))
            .map(|(i, r)| (i, r, self.output_path(i)))
            .collect()
    }

    /// Copy every kept recording out of `inputs`, read back to back as one capture.
    ///
    /// Every fragment is checked against the input length before any file is
    /// created. A file whose copy fails is removed again.
    pub fn export<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        recordings: &[Recording],
    ) -> Result<Vec<ExportedRecording>> {
        let plan = self.plan(recordings);
        if plan.is_empty() {
            tracing::info!("No recordings long enough to export");
            return Ok(Vec::new());
        }

        let chain = FileChain::open(inputs)?;
        let available = chain.len() / self.block_size as u64;
        for (_, recording, _) in &plan {
            check_in_range(recording, available)?;
        }

        fs::create_dir_all(&self.output_dir)?;
        let mut reader = BufReader::new(chain);

        let mut exported = Vec::with_capacity(plan.len());
        for (index, recording, path) in plan {
            tracing::info!(
                recording = index,
                fragments = recording.len(),
                path = %path.display(),
                "Writing recording"
            );

            let bytes = self.write_or_remove(&mut reader, &path, recording)?;
            exported.push(ExportedRecording { index, path, bytes });
        }

        Ok(exported)
    }

    /// Write one recording to `path`, deleting the file again if the copy fails.
    fn write_or_remove<R: Read + Seek>(
        &self,
        reader: &mut R,
        path: &Path,
        recording: &Recording,
    ) -> Result<u64> {
        self.write_file(reader, path, recording).inspect_err(|e| {
            tracing::warn!(path = %path.display(), "Removing incomplete recording: {}", e);
            if let Err(remove_err) = fs::remove_file(path) {
                tracing::debug!("Could not remove {:?}: {}", path, remove_err);
            }
        })
    }

    fn write_file<R: Read + Seek>(
        &self,
        reader: &mut R,
        path: &Path,
        recording: &Recording,
    ) -> Result<u64> {
        let mut out = BufWriter::new(File::create(path)?);
        let bytes = self.write_recording(reader, &mut out, recording)?;
        out.flush()?;
        Ok(bytes)
    }

    /// Copy the fragments of one recording from `reader` to `out`.
    pub fn write_recording<R, W>(
        &self,
        reader: &mut R,
        out: &mut W,
        recording: &Recording,
    ) -> Result<u64>
    where
        R: Read + Seek,
        W: Write,
    {
        let mut total = 0;
        for fragment in recording {
            total += self.copy_fragment(reader, out, fragment)?;
        }
        Ok(total)
    }

    fn copy_fragment<R, W>(&self, reader: &mut R, out: &mut W, fragment: &Fragment) -> Result<u64>
    where
        R: Read + Seek,
        W: Write,
    {
        let range = fragment.byte_range(self.block_size);
        let len = range.end - range.start;

        reader.seek(SeekFrom::Start(range.start))?;
        let copied = io::copy(&mut reader.take(len), out)?;
        if copied != len {
            return Err(Error::FragmentOutOfRange {
                start_block: fragment.start_block,
                block_count: fragment.block_count,
                available: (range.start + copied) / self.block_size as u64,
            });
        }

        tracing::debug!(
            start_block = fragment.start_block,
            block_count = fragment.block_count,
            bytes = copied,
            "Copied fragment"
        );
        Ok(copied)
    }
}

fn check_in_range(recording: &Recording, available: u64) -> Result<()> {
    match recording.iter().find(|f| f.end_block() > available) {
        Some(f) => Err(Error::FragmentOutOfRange {
            start_block: f.start_block,
            block_count: f.block_count,
            available,
        }),
        None => Ok(()),
    }
}
