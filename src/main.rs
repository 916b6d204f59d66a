mod cli;

use mpegrecover::{
    config::{self, Config},
    recover::Exporter,
    report::{self, RecordingSummary},
};
use mpegrecover_core::{Fragment, Merger, Recording, Scanner, Timestamp};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mpegrecover=trace,mpegrecover_core=trace".to_string()
        } else {
            "mpegrecover=info,mpegrecover_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let overrides = Overrides {
        blocksize: cli.blocksize,
        gapsize: cli.gapsize,
        merge_gapsize: cli.merge_gapsize,
    };
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Scan { inputs, json } => {
            let config = overrides.apply(config_path, None)?;
            scan_command(&inputs, &config, json)
        }
        Commands::Merge {
            inputs,
            discardsize,
            json,
        } => {
            let config = overrides.apply(config_path, discardsize)?;
            merge_command(&inputs, &config, json)
        }
        Commands::Recover {
            inputs,
            output,
            discardsize,
            dry_run,
        } => {
            let config = overrides.apply(config_path, discardsize)?;
            recover_command(&inputs, &output, &config, dry_run)
        }
        Commands::Validate {
            config: validate_path,
        } => validate_config(validate_path.as_deref().or(config_path)),
        Commands::Version => {
            println!("mpegrecover {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Settings given on the command line that take precedence over the config file.
struct Overrides {
    blocksize: Option<usize>,
    gapsize: Option<u32>,
    merge_gapsize: Option<u32>,
}

impl Overrides {
    fn apply(&self, config_path: Option<&Path>, discardsize: Option<u64>) -> Result<Config> {
        let mut config = config::load_config_or_default(config_path)?;

        if let Some(blocksize) = self.blocksize {
            config.scan.blocksize = blocksize;
        }
        if let Some(gapsize) = self.gapsize {
            config.scan.gapsize = gapsize;
        }
        if let Some(gapsize) = self.merge_gapsize {
            config.merge.gapsize = gapsize;
        }
        if let Some(discardsize) = discardsize {
            config.recover.discardsize = discardsize;
        }

        config::validate_config(&config)?;
        Ok(config)
    }
}

fn scanner(config: &Config) -> Scanner {
    Scanner::new()
        .with_block_size(config.scan.blocksize)
        .with_gap_size(config.scan.gapsize)
}

fn scan_input(inputs: &[PathBuf], config: &Config) -> Result<Vec<Fragment>> {
    if let Some(missing) = inputs.iter().find(|p| !p.exists()) {
        anyhow::bail!("Input file does not exist: {:?}", missing);
    }

    tracing::debug!(
        "blocksize: {}, gapsize: {}, merge gapsize: {}, discardsize: {}",
        config.scan.blocksize,
        config.scan.gapsize,
        config.merge.gapsize,
        config.recover.discardsize
    );

    scanner(config)
        .scan_files(inputs)
        .with_context(|| format!("Failed to analyze {:?}", inputs))
}

fn merge_input(inputs: &[PathBuf], config: &Config) -> Result<Vec<Recording>> {
    let fragments = scan_input(inputs, config)?;
    let gap = Timestamp::from_integer(config.merge.gapsize);
    Ok(Merger::new(gap).merge(&fragments))
}

fn scan_command(inputs: &[PathBuf], config: &Config, json: bool) -> Result<()> {
    let fragments = scan_input(inputs, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&fragments)?);
    } else {
        println!("Fragments: {}", fragments.len());
        print!("{}", report::fragment_table(&fragments));
    }

    Ok(())
}

fn merge_command(inputs: &[PathBuf], config: &Config, json: bool) -> Result<()> {
    let recordings = merge_input(inputs, config)?;
    let discarded = |r: &Recording| config.recover.is_discarded(r);

    if json {
        let summaries: Vec<RecordingSummary> = recordings
            .iter()
            .enumerate()
            .map(|(i, r)| RecordingSummary::new(i, r, discarded(r)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("Recordings: {}", recordings.len());
        print!("{}", report::recording_list(&recordings, discarded));
    }

    Ok(())
}

fn recover_command(
    inputs: &[PathBuf],
    output: &Path,
    config: &Config,
    dry_run: bool,
) -> Result<()> {
    let recordings = merge_input(inputs, config)?;
    let exporter = Exporter::new(output, config.scan.blocksize, &config.recover);

    print!(
        "{}",
        report::recording_list(&recordings, |r| exporter.is_discarded(r))
    );

    if dry_run {
        let plan = exporter.plan(&recordings);
        println!("\n[DRY RUN] Would write {} recordings", plan.len());
        for (_, recording, path) in plan {
            println!("  {} ({} blocks)", path.display(), recording.block_count());
        }
        return Ok(());
    }

    let exported = exporter
        .export(inputs, &recordings)
        .with_context(|| format!("Failed to write recordings to {:?}", output))?;

    println!("\nWrote {} recordings:", exported.len());
    for item in &exported {
        println!("  {} ({} bytes)", item.path.display(), item.bytes);
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let path = path.map(Path::to_path_buf).or_else(config::find_config);
    let config = match &path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file found, using defaults");
            Config::default()
        }
    };

    println!("  Block size: {}", config.scan.blocksize);
    println!("  Gap size: {}", config.scan.gapsize);
    println!("  Merge gap size: {}", config.merge.gapsize);
    println!("  Discard size: {}", config.recover.discardsize);
    println!(
        "  Output files: {}_NNNN.{}",
        config.recover.file_prefix, config.recover.extension
    );

    Ok(())
}
