use mpegrecover_core::{Recording, DEFAULT_BLOCK_SIZE, DEFAULT_GAP_SIZE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub recover: RecoverConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Size of the blocks the capture is cut into, in bytes
    #[serde(default = "default_blocksize")]
    pub blocksize: usize,

    /// Largest forward clock jump inside a fragment, in 90 kHz ticks
    #[serde(default = "default_gapsize")]
    pub gapsize: u32,
}

fn default_blocksize() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_gapsize() -> u32 {
    DEFAULT_GAP_SIZE
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            blocksize: default_blocksize(),
            gapsize: default_gapsize(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MergeConfig {
    /// Largest forward clock jump between fragments of one recording, in 90 kHz ticks
    #[serde(default = "default_gapsize")]
    pub gapsize: u32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            gapsize: default_gapsize(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecoverConfig {
    /// Recordings shorter than this many ticks are not written (default: 5 minutes)
    #[serde(default = "default_discardsize")]
    pub discardsize: u64,

    /// File name prefix of exported recordings
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// File extension of exported recordings
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_discardsize() -> u64 {
    27_000_000
}

fn default_file_prefix() -> String {
    "recording".to_string()
}

fn default_extension() -> String {
    "mpg".to_string()
}

impl Default for RecoverConfig {
    fn default() -> Self {
        Self {
            discardsize: default_discardsize(),
            file_prefix: default_file_prefix(),
            extension: default_extension(),
        }
    }
}

impl RecoverConfig {
    /// Whether a recording is too short to be worth writing.
    pub fn is_discarded(&self, recording: &Recording) -> bool {
        recording.duration().ticks() < self.discardsize
    }
}
