//! Shell completions command handler

use crate::cli::CompletionsArgs;
use crate::error::Result;
use clap::CommandFactory;
use std::io::Write;

/// Handle the completions command
pub fn handle_completions(args: CompletionsArgs, out: &mut impl Write) -> Result<()> {
    use clap_complete::generate;

    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();

    generate(args.shell.to_clap_shell(), &mut cmd, name, out);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Shell;

    #[test]
    fn test_bash_completions_mention_subcommands() {
        let mut out = Vec::new();
        handle_completions(CompletionsArgs { shell: Shell::Bash }, &mut out).unwrap();

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("hfetch"));
        assert!(script.contains("check"));
    }
}
