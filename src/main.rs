use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tsframe_codec::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_FRAME_LEN, FrameReader, RenderOptions};
use tsframe_filter::{FilterDriver, FilterOptions, FilterStats, MatchEngine};

mod config;
mod patterns;

use config::{FileConfig, Settings};

/// tsfilter - filter a frame stream on stdin by one or more regular expressions
///
/// Each frame is rendered to a line of text and matched against every
/// pattern. By default a frame is kept when all patterns match; kept frames
/// are written to stdout byte-for-byte.
#[derive(Parser, Debug)]
#[command(name = "tsfilter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Patterns to match against each frame's text rendering
    #[arg(value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Read newline-delimited patterns from a file; replaces PATTERN arguments
    #[arg(long, value_name = "PATH")]
    regexfile: Option<PathBuf>,

    /// Keep frames matching any pattern instead of all patterns
    #[arg(long)]
    any: bool,

    /// Invert the selection: drop the frames that would have been kept
    #[arg(long)]
    exclude: bool,

    /// Print the capture groups of the matching pattern instead of frames
    #[arg(long)]
    sub: bool,

    /// Match case-insensitively
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Pretty-print JSON payloads before matching
    #[arg(long)]
    pretty: bool,

    /// Read-ahead buffer size in bytes
    #[arg(long, value_name = "BYTES")]
    buffer_size: Option<usize>,

    /// Largest frame accepted, in bytes
    #[arg(long, value_name = "BYTES")]
    max_frame_len: Option<usize>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Logs go to stderr; stdout carries the filtered stream
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tsfilter: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<FilterStats> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = resolve_settings(args, file)?;

    let engine = MatchEngine::new(settings.patterns.as_slice(), settings.options)?;

    let mut reader = FrameReader::with_capacity(settings.buffer_size, io::stdin().lock())
        .with_max_frame_len(settings.max_frame_len);
    let mut out = BufWriter::new(io::stdout().lock());

    let stats = FilterDriver::new(&engine)
        .with_render_options(settings.render)
        .run(&mut reader, &mut out)?;

    info!(
        frames_read = stats.frames_read,
        frames_selected = stats.frames_selected,
        "done"
    );
    Ok(stats)
}

/// Merge command-line arguments over the config file
fn resolve_settings(args: Args, file: FileConfig) -> Result<Settings> {
    let patterns = if let Some(path) = &args.regexfile {
        patterns::read_pattern_file(path)?
    } else if !args.patterns.is_empty() {
        args.patterns
    } else {
        file.filter.patterns
    };

    Ok(Settings {
        patterns,
        options: FilterOptions {
            any: args.any || file.filter.any,
            exclude: args.exclude || file.filter.exclude,
            sub: args.sub || file.filter.sub,
            ignore_case: args.ignore_case || file.filter.ignore_case,
        },
        render: RenderOptions {
            pretty: args.pretty || file.render.pretty,
        },
        buffer_size: args
            .buffer_size
            .or(file.reader.buffer_size)
            .unwrap_or(DEFAULT_BUFFER_SIZE),
        max_frame_len: args
            .max_frame_len
            .or(file.reader.max_frame_len)
            .unwrap_or(DEFAULT_MAX_FRAME_LEN),
    })
}
