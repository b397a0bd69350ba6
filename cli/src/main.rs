//! stamperr CLI: inspect, re-render and query stamped error strings.
//!
//! # Commands
//! ```text
//! stamperr frames <TEXT> [--json]
//! stamperr render <TEXT>
//! stamperr report <TEXT> [--mode default|reversed|indent|reversed-indent] [--json]
//! stamperr find   <TEXT> --kind <KIND> --type <SHAPE>
//! stamperr match  <A> <B>
//! ```
//! `<TEXT>` of `-` reads standard input.

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stamperr::{frames, is_match, parse, render_report, Report, ReportMode};
use tracing::debug;

mod cmd_find;
mod logging;

use cmd_find::Shape;
use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "stamperr",
    about = "Inspect, re-render and query stamped error strings",
    version
)]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split an error string into its frames
    Frames {
        /// Error text, or `-` for stdin
        text: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse and re-render; fails if the result differs from the input
    Render {
        /// Error text, or `-` for stdin
        text: String,
    },

    /// Summarise or lay out an error chain
    Report {
        /// Error text, or `-` for stdin
        text: String,
        /// Layout: default | reversed | indent | reversed-indent
        #[arg(long, default_value = "default")]
        mode: ReportMode,
        /// Print the summary (message, traces, kind) as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Extract the payload stored under a kind
    Find {
        /// Error text, or `-` for stdin
        text: String,
        /// Kind to look for
        #[arg(long)]
        kind: String,
        /// Shape to decode the payload as
        #[arg(long = "type", value_enum)]
        shape: Shape,
    },

    /// Compare two error strings, ignoring stamps
    Match {
        a: String,
        b: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&LogConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    match cli.command {
        Commands::Frames { text, json } => cmd_frames(&read_text(&text)?, json),
        Commands::Render { text } => cmd_render(&read_text(&text)?),
        Commands::Report { text, mode, json } => cmd_report(&read_text(&text)?, mode, json),
        Commands::Find { text, kind, shape } => cmd_lookup(&read_text(&text)?, &kind, shape),
        Commands::Match { a, b } => cmd_match(&read_text(&a)?, &read_text(&b)?),
    }
}

/// The argument itself, or stdin without its trailing newline for `-`.
fn read_text(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("read error text from stdin")?;
    let trimmed = buf.strip_suffix('\n').unwrap_or(&buf);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}

// ─── frames ───────────────────────────────────────────────────────────────────

fn cmd_frames(text: &str, json: bool) -> Result<ExitCode> {
    let frames = frames(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(ExitCode::SUCCESS);
    }
    for (idx, frame) in frames.iter().enumerate() {
        let role = if frame.is_wrapper { "wrap" } else { "end " };
        match frame.stamp {
            Some(ts) => println!("{idx:>3} {role} ts={ts}"),
            None => println!("{idx:>3} {role} (no stamp)"),
        }
        if !frame.kind.is_empty() {
            println!("      kind:    {}", frame.kind);
        }
        if !frame.data.is_empty() {
            println!("      data:    {}", frame.data);
        }
        if !frame.message.is_empty() {
            println!("      message: {}", frame.message);
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ─── render ───────────────────────────────────────────────────────────────────

fn cmd_render(text: &str) -> Result<ExitCode> {
    let rendered = parse(text).to_string();
    println!("{rendered}");
    if rendered == text {
        Ok(ExitCode::SUCCESS)
    } else {
        debug!(input = %text, rendered = %rendered, "re-render differs from input");
        eprintln!("re-rendered text differs from input");
        Ok(ExitCode::FAILURE)
    }
}

// ─── report ───────────────────────────────────────────────────────────────────

fn cmd_report(text: &str, mode: ReportMode, json: bool) -> Result<ExitCode> {
    let err = parse(text);
    if json {
        let report = Report::from_error(&err);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_report(&err, mode));
    }
    Ok(ExitCode::SUCCESS)
}

// ─── find ─────────────────────────────────────────────────────────────────────

fn cmd_lookup(text: &str, kind: &str, shape: Shape) -> Result<ExitCode> {
    let err = parse(text);
    match cmd_find::find(&err, kind, shape)? {
        Some(value) => {
            println!("{value}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("no {kind} data decodable as {shape:?}");
            Ok(ExitCode::FAILURE)
        }
    }
}

// ─── match ────────────────────────────────────────────────────────────────────

fn cmd_match(a: &str, b: &str) -> Result<ExitCode> {
    let (a, b) = (parse(a), parse(b));
    if is_match(Some(&a), Some(&b)) {
        println!("match");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("no match");
        Ok(ExitCode::FAILURE)
    }
}
