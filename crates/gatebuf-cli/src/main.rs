//! Gatebuf CLI - inspect input gate buffer plans.
//!
//! A small tool for operators sizing network memory: it shows how many
//! exclusive and floating buffers a gate gets for a given fan-in, and where
//! the blocking-exchange cap starts to bite.

mod commands;
mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Gatebuf input gate buffer planner.
///
/// Computes the network buffer budget of input gates from the same
/// configuration the task runtime uses.
#[derive(Parser)]
#[command(name = "gatebuf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Suppress progress and info messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

/// Output format options.
#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table format (default for TTY)
    #[default]
    Table,
    /// Machine-readable JSON format
    Json,
}

/// Buffer configuration shared by all commands.
#[derive(Args, Clone, Default)]
struct BufferArgs {
    /// JSON file with network buffer configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exclusive buffers per channel (overrides the config file)
    #[arg(long, allow_negative_numbers = true)]
    exclusive: Option<i64>,

    /// Floating buffers per gate (overrides the config file)
    #[arg(long, allow_negative_numbers = true)]
    floating: Option<i64>,

    /// Max required buffers per gate (overrides the config file)
    #[arg(long, allow_negative_numbers = true)]
    max_required: Option<i64>,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the buffer plan of a single gate
    Plan {
        /// Partition type consumed by the gate (e.g. blocking, pipelined_bounded)
        #[arg(long, default_value = "blocking")]
        partition: String,

        /// Number of upstream channels
        #[arg(long)]
        channels: usize,

        #[command(flatten)]
        buffers: BufferArgs,
    },

    /// Show buffer plans across a range of channel counts
    Sweep {
        /// Partition type consumed by the gate
        #[arg(long, default_value = "blocking")]
        partition: String,

        /// First channel count
        #[arg(long, default_value_t = 1)]
        from: usize,

        /// Last channel count (inclusive)
        #[arg(long)]
        to: usize,

        /// Channel count increment
        #[arg(long, default_value_t = 100)]
        step: usize,

        #[command(flatten)]
        buffers: BufferArgs,
    },

    /// Show the effective configuration and resolved ceilings
    Config {
        #[command(flatten)]
        buffers: BufferArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else if !cli.quiet {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Plan {
            partition,
            channels,
            buffers,
        } => commands::plan::run(&partition, channels, &buffers, cli.format, cli.quiet),
        Commands::Sweep {
            partition,
            from,
            to,
            step,
            buffers,
        } => commands::sweep::run(&partition, from..=to, step, &buffers, cli.format, cli.quiet),
        Commands::Config { buffers } => commands::config::run(&buffers, cli.format, cli.quiet),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
