//! hfetch CLI - fetch, revalidate and post over HTTP
//!
//! This is the main entry point for the hfetch CLI application. It parses
//! arguments, loads configuration, installs logging and dispatches to the
//! subcommand handlers.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use hfetch_core::ErrorFields;
use logging::LoggingConfig;
use std::io::{self, Write};
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    // Configuration feeds the logging setup, so it is read first
    let config = Config::load_with_file(cli.config.as_deref());

    if let Err(e) = init_logging(&cli, config.as_ref().ok()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            let code = report(e, control::SHOULD_COLORIZE.should_colorize());
            process::exit(code);
        }
    }
}

/// Print a failure for the user and return its exit code.
///
/// The message goes to stderr once; the structured fields (code, location,
/// cause) are only logged at debug level.
fn report(e: error::Error, use_color: bool) -> i32 {
    eprintln!("{}", error::format_error(&e, use_color));

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    let code = e.exit_code();
    ErrorFields::from_error(&e.into_annotated()).emit_debug("hfetch failed");
    code
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config) -> Result<()> {
    let mut out = io::stdout();

    tracing::info!(verbosity = cli.verbosity_level(), "Executing command");

    let result = match cli.command {
        None => handlers::print_usage(&mut out),
        Some(Commands::Get(args)) => handlers::handle_get(args, &config, &mut out).await,
        Some(Commands::Check(args)) => handlers::handle_check(args, &config, &mut out).await,
        Some(Commands::Send(args)) => handlers::handle_send(args, &config, &mut out).await,
        Some(Commands::Completions(args)) => handlers::handle_completions(args, &mut out),
    };

    out.flush()?;
    result
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: Option<&Config>) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    if let Some(config) = config {
        logging_config.merge_with_file(&config.logging, verbosity)?;
    }

    // Apply environment overrides
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["hfetch"]);
        assert_eq!(cli.verbosity_level(), 0);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["hfetch", "-vv", "check", "https://example.test/feed"]);
        assert_eq!(cli.verbosity_level(), 2);
        assert!(matches!(cli.command, Some(Commands::Check(_))));

        let cli = Cli::parse_from(["hfetch", "--quiet", "completions", "zsh"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[tokio::test]
    async fn test_run_without_command_prints_usage() {
        let cli = Cli::parse_from(["hfetch"]);
        assert!(run(cli, Config::default()).await.is_ok());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_while_reporting(filter: &str) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let code = tracing::subscriber::with_default(subscriber, || {
            report(error::Error::config("missing [request] table"), false)
        });
        assert_eq!(code, 5);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_failure_is_not_logged_at_default_level() {
        assert!(logged_while_reporting("warn").is_empty());
    }

    #[test]
    fn test_failure_fields_logged_when_verbose() {
        let logged = logged_while_reporting("debug");
        assert!(logged.contains("hfetch failed"));
        assert!(logged.contains("error.code"));
    }
}
