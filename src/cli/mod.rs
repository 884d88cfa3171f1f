//! CLI command definitions and handlers

mod generate;
mod init;
mod score;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate attempt count (1-8)
fn parse_attempts(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("attempts must be at least 1".to_string())
    } else if n > 8 {
        Err("attempts cannot exceed 8".to_string())
    } else {
        Ok(n)
    }
}

/// Copysmith - quality-controlled marketing copy generation
#[derive(Parser, Debug)]
#[command(name = "copysmith")]
#[command(
    version,
    about = "Generate Japanese product copy with concurrent LLM candidates, rule-based scoring, and deterministic repair",
    long_about = "Copysmith fans out concurrent generation attempts against an LLM backend, \
repairs and scores every candidate against a structural and factual-honesty rule set, \
measures how much of the supplied input material survived into each candidate, and \
returns the best one, with at most one rescue attempt when the whole pool is weak.",
    after_help = "\
Examples:
  copysmith generate --input request.json           Generate copy from a request file
  copysmith generate --input request.json -f json   JSON output with the selection trace
  copysmith score --input request.json --text copy.txt   Score an existing text offline
  copysmith init                                    Write an example user config

Set ANTHROPIC_API_KEY (or OPENAI_API_KEY with --backend openai) before generating."
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate copy for a normalized request
    Generate {
        /// Path to the request JSON (NormalizedInput)
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// LLM backend: anthropic, openai, ollama
        #[arg(long)]
        backend: Option<String>,

        /// Model name (default: backend's default model)
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Concurrent attempts in the initial round (1-8)
        #[arg(long, value_parser = parse_attempts)]
        attempts: Option<usize>,

        /// Disable the rescue round entirely
        #[arg(long)]
        no_rescue: bool,
    },

    /// Repair and score an existing text offline (no LLM calls)
    Score {
        /// Path to the request JSON (NormalizedInput)
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Path to the candidate text file
        #[arg(long, short = 't')]
        text: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Initialize the user config file with example settings
    Init,
}

/// Dispatch a parsed CLI invocation.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            input,
            format,
            output,
            backend,
            model,
            temperature,
            attempts,
            no_rescue,
        } => generate::run(generate::GenerateArgs {
            input,
            format,
            output,
            backend,
            model,
            temperature,
            attempts,
            no_rescue,
        }),
        Commands::Score {
            input,
            text,
            format,
        } => score::run(&input, &text, &format),
        Commands::Init => init::run(),
    }
}
