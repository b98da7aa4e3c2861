//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// hfetch - fetch, revalidate and post over HTTP
///
/// Performs a single HTTP call per invocation, with query-parameter merging,
/// bounded body reads and ETag / Last-Modified freshness checks.
#[derive(Parser, Debug)]
#[command(
    name = "hfetch",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "HFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a URL and print the response body
    Get(GetArgs),

    /// Report whether a resource changed since the given validators
    Check(CheckArgs),

    /// Send a JSON body and print the response
    Send(SendArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Flags shared by every subcommand that performs a request
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Target URL
    #[arg(value_name = "URL")]
    pub url: String,

    /// Query parameter to merge into the URL (repeatable)
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Request header (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// HTTP method
    #[arg(short = 'X', long)]
    pub method: Option<String>,

    /// Timeout in seconds for the whole call
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Return redirect responses instead of following them
    #[arg(long)]
    pub no_redirects: bool,

    /// Fail when the body exceeds this many bytes (0 = unbounded)
    #[arg(long, value_name = "BYTES")]
    pub max_body_size: Option<u64>,
}

/// Arguments for the get command
#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Print the status line and response headers before the body
    #[arg(short, long)]
    pub include: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// ETag recorded from the previous fetch
    #[arg(long, default_value = "")]
    pub etag: String,

    /// Last-Modified value recorded from the previous fetch
    #[arg(long, default_value = "")]
    pub last_modified: String,
}

/// Arguments for the send command
#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Inline JSON payload
    #[arg(short, long, value_name = "JSON", conflicts_with = "file", required_unless_present = "file")]
    pub data: Option<String>,

    /// Read the JSON payload from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Arguments for generating shell completions
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Parse a `KEY=VALUE` query parameter; the value may be empty
fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse a `Name: value` header
fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
