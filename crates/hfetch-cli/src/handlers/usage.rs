//! Usage table printed when no subcommand is given

use crate::cli::Cli;
use crate::error::Result;
use clap::CommandFactory;
use std::io::Write;

/// Print one line per subcommand with its description
pub fn print_usage(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Commands:")?;
    for command in Cli::command().get_subcommands() {
        let about = command
            .get_about()
            .map(|about| about.to_string())
            .unwrap_or_default();
        writeln!(out, "\t{}\t\t\t{}", command.get_name(), about)?;
    }
    Ok(())
}
