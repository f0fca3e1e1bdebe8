//! vgm_ripper - VGM data block extractor
//!
//! Walks the command stream of a .vgm/.vgz file and dumps every embedded data
//! block (PCM samples, ROM images, RAM writes) to its own .raw file.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vgm_ripper::{
    utils, BlockSink, DecodeOutcome, FileSink, MemorySink, ParserConfig, TracingObserver, VgmFile,
};

#[derive(Parser)]
#[command(name = "vgm_ripper")]
#[command(about = "Extract embedded data blocks from VGM files")]
#[command(version)]
struct Cli {
    /// Verbose output (per-command logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one .raw file per data block
    Extract {
        /// Input .vgm or .vgz file, prompted for when omitted
        file: Option<PathBuf>,

        /// Output directory (defaults to the input file's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print the scan result as JSON
        #[arg(long)]
        json: bool,

        /// Decode and report without writing files
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        budget: BudgetArgs,
    },

    /// Show header fields, command counts and data blocks
    Info {
        /// Input .vgm or .vgz file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        budget: BudgetArgs,
    },
}

#[derive(Args)]
struct BudgetArgs {
    /// Stop after this many commands
    #[arg(long)]
    max_commands: Option<usize>,

    /// Largest accepted data block payload in bytes
    #[arg(long)]
    max_block_size: Option<u32>,

    /// Largest accepted sum of data block payloads in bytes
    #[arg(long)]
    max_total_block_bytes: Option<usize>,

    /// Skip reserved opcodes instead of failing on them
    #[arg(long)]
    allow_reserved: bool,

    /// Treat bit 31 of the data block size as part of the size
    #[arg(long)]
    literal_block_size: bool,
}

impl BudgetArgs {
    fn to_config(&self) -> ParserConfig {
        ParserConfig {
            max_commands: self.max_commands,
            max_data_block_size: self.max_block_size,
            max_total_data_block_bytes: self.max_total_block_bytes,
            allow_reserved_opcodes: self.allow_reserved,
            literal_block_size: self.literal_block_size,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            file,
            out_dir,
            json,
            dry_run,
            budget,
        } => {
            let file = match file {
                Some(file) => file,
                None => prompt_for_path()?,
            };
            extract(&file, out_dir.as_deref(), json, dry_run, &budget.to_config())
        },
        Commands::Info { file, json, budget } => info(&file, json, &budget.to_config()),
    }
}

/// `RUST_LOG` when set, otherwise info; `-v` raises it to debug
fn log_filter(verbose: bool) -> EnvFilter {
    filter_from(std::env::var("RUST_LOG").ok().as_deref(), verbose)
}

fn filter_from(directives: Option<&str>, verbose: bool) -> EnvFilter {
    let filter = directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    if verbose {
        filter.add_directive(tracing::Level::DEBUG.into())
    } else {
        filter
    }
}

fn prompt_for_path() -> Result<PathBuf> {
    print!("Path to VGM file: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read path from stdin")?;

    let trimmed = line.trim();
    if trimmed.is_empty() {
        bail!("No input file given");
    }
    Ok(PathBuf::from(trimmed))
}

fn load(path: &Path) -> Result<VgmFile> {
    VgmFile::from_path(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn extract(
    path: &Path,
    out_dir: Option<&Path>,
    json: bool,
    dry_run: bool,
    config: &ParserConfig,
) -> Result<()> {
    let file = load(path)?;

    let mut file_sink;
    let mut memory_sink;
    let sink: &mut dyn BlockSink = if dry_run {
        memory_sink = MemorySink::new(file.source_name());
        &mut memory_sink
    } else {
        if let Some(dir) = out_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        file_sink = FileSink::for_source(path, out_dir);
        &mut file_sink
    };

    let outcome = file
        .extract(config, sink, &mut TracingObserver)
        .with_context(|| format!("Failed to read header of {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for record in &outcome.artifacts {
            println!(
                "[{:#x}] {} at 0x{:X}, {} bytes -> {}",
                record.index, record.category, record.offset, record.size, record.location
            );
        }
        println!(
            "{} data block(s) {}, {} command(s) decoded",
            outcome.artifacts.len(),
            if dry_run { "found" } else { "written" },
            outcome.commands_decoded
        );
    }

    finish(&outcome)
}

fn info(path: &Path, json: bool, config: &ParserConfig) -> Result<()> {
    let file = load(path)?;
    let outcome = file
        .decode(config)
        .with_context(|| format!("Failed to read header of {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return finish(&outcome);
    }

    let header = &outcome.header;
    println!("File:          {}", path.display());
    println!("Signature:     {}", String::from_utf8_lossy(&header.signature));
    println!("Version:       {}", utils::version_string(header.version));
    println!("EOF offset:    0x{:X}", header.eof_offset);
    println!(
        "Data start:    0x{:X}{}",
        header.data_start_offset,
        if header.has_relative_data_offset() { "" } else { " (fixed)" }
    );
    if let Some(gd3) = header.gd3_offset {
        println!("GD3 offset:    0x{:X}", gd3);
    }
    println!(
        "Samples:       {} (commands wait {})",
        header.total_samples, outcome.wait_samples
    );
    if let Some(loop_offset) = header.loop_offset {
        println!("Loop:          0x{:X}, {} samples", loop_offset, header.loop_samples);
    }
    for warning in &outcome.header_warnings {
        println!("Warning:       {:?}", warning);
    }

    println!("Commands:      {}", outcome.commands_decoded);
    for (family, count) in &outcome.family_counts {
        println!("  {:<18} {}", format!("{:?}", family), count);
    }

    println!("Data blocks:   {}", outcome.blocks.len());
    for (index, block) in outcome.blocks.iter().enumerate() {
        println!(
            "  [{:#x}] 0x{:02X} {} at 0x{:X}, {} bytes{}",
            index,
            block.block_type,
            block.category,
            block.offset,
            block.declared_size,
            if block.second_chip { " (second chip)" } else { "" }
        );
    }

    finish(&outcome)
}

/// Turn stream and write failures into a non-zero exit
fn finish(outcome: &DecodeOutcome) -> Result<()> {
    for failure in &outcome.write_failures {
        eprintln!("error[{}]: {}", failure.code(), failure);
    }

    if let Some(error) = &outcome.error {
        eprintln!("hint: {}", error.suggested_action());
        bail!(
            "Scan stopped at 0x{:X} after {} command(s): {}",
            outcome.end_offset,
            outcome.commands_decoded,
            error
        );
    }

    if !outcome.write_failures.is_empty() {
        bail!("{} data block(s) could not be written", outcome.write_failures.len());
    }

    Ok(())
}
