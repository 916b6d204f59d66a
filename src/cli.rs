use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mpegrecover")]
#[command(author, version, about = "Recover MPEG program-stream recordings from damaged captures")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Block size in bytes (overrides config)
    #[arg(short, long, global = true)]
    pub blocksize: Option<usize>,

    /// Largest clock jump inside a fragment, in 90 kHz ticks (overrides config)
    #[arg(short, long, global = true)]
    pub gapsize: Option<u32>,

    /// Largest clock jump between fragments of a recording, in 90 kHz ticks (overrides config)
    #[arg(short, long, global = true)]
    pub merge_gapsize: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a capture and list the fragments found
    Scan {
        /// Capture files, read back to back as one capture
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan a capture and list the fragments grouped into recordings
    Merge {
        /// Capture files, read back to back as one capture
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Minimum recording length in ticks worth keeping (overrides config)
        #[arg(short, long)]
        discardsize: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan a capture and write every recording to the output directory
    Recover {
        /// Capture files, read back to back as one capture
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Directory that receives the recovered recordings
        #[arg(short, long, required = true)]
        output: PathBuf,

        /// Minimum recording length in ticks worth keeping (overrides config)
        #[arg(short, long)]
        discardsize: Option<u64>,

        /// Show what would be written without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
