//! RR log command line interface
//!
//! Decodes an RR telemetry log and prints what it contains.
//!
//! # Commands
//!
//! - `rrlog <FILE> summary` - Version, channel and message counts
//! - `rrlog <FILE> channels` - Channel schemas in declaration order
//! - `rrlog <FILE> messages <CHANNEL>` - Decoded messages of one channel
//! - `rrlog <FILE> poses <CHANNEL>` - Pose timeline of one channel

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rr_log::{BoolDecoding, DecodeOptions, LogFile, PoseWithTime};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use output::OutputFormat;

/// Inspect RR telemetry logs
#[derive(Parser, Debug)]
#[command(name = "rrlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Treat any boolean byte other than 1 as false instead of rejecting it
    #[arg(long, global = true)]
    lenient_bools: bool,

    /// Deepest struct nesting accepted in a channel schema
    #[arg(long, global = true, default_value_t = 64)]
    max_schema_depth: usize,

    /// Path to the .log file
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version, channel and message counts
    Summary {
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List channels with their schemas
    Channels {
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the messages of one channel
    Messages {
        /// Channel name
        channel: String,

        /// Maximum number of messages to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of messages to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,

        /// Output format (text or json)
        #[arg(short = 'f', long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the pose timeline of one channel
    Poses {
        /// Channel carrying x, y, heading and timestamp fields
        channel: String,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

impl From<&Cli> for DecodeOptions {
    fn from(cli: &Cli) -> Self {
        let bool_decoding = if cli.lenient_bools {
            BoolDecoding::Lenient
        } else {
            BoolDecoding::Strict
        };
        DecodeOptions::default()
            .with_bool_decoding(bool_decoding)
            .with_max_schema_depth(cli.max_schema_depth)
    }
}

fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_tracing(verbose: bool) {
    let default_level = default_log_level(verbose);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = DecodeOptions::from(&cli);
    let log = rr_log::decode_file_with(&cli.file, options)
        .with_context(|| format!("failed to decode {}", cli.file.display()))?;

    info!(
        file = %cli.file.display(),
        channels = log.len(),
        messages = log.message_count(),
        "log decoded"
    );

    println!("{}", run(&log, &cli.command)?);
    Ok(())
}

fn run(log: &LogFile, command: &Commands) -> Result<String> {
    let rendered = match command {
        Commands::Summary { format } => output::format_summary(log, *format),
        Commands::Channels { format } => output::format_channels(log, *format),
        Commands::Messages {
            channel,
            limit,
            offset,
            format,
        } => {
            let channel = find_channel(log, channel)?;
            let messages: Vec<_> = channel
                .messages()
                .iter()
                .enumerate()
                .skip(*offset)
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            output::format_messages(channel, &messages, *format)
        }
        Commands::Poses { channel, format } => {
            let channel = find_channel(log, channel)?;
            let poses = PoseWithTime::timeline(channel)
                .with_context(|| format!("channel {} does not carry poses", channel.name()))?;
            output::format_poses(&poses, *format)
        }
    };
    Ok(rendered)
}

fn find_channel<'a>(log: &'a LogFile, name: &str) -> Result<&'a rr_log::Channel> {
    log.channel(name).with_context(|| {
        let known: Vec<&str> = log.channel_names().collect();
        format!("no channel named {name:?} (channels: {})", known.join(", "))
    })
}
