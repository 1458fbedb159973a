//! # Shell Completion Module
//!
//! Generates completion scripts through clap's completion system.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! navtree completion bash > ~/.local/share/bash-completion/completions/navtree
//!
//! # Generate zsh completions
//! navtree completion zsh > ~/.config/zsh/completions/_navtree
//! ```

use crate::cli::Shell;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

/// Write completions for `cmd` to `out`.
pub fn write_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Generate shell completions for the given shell on stdout
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    write_completions(gen, cmd, &mut io::stdout());
}

/// Convert our Shell enum to clap_complete's Shell enum
#[must_use]
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::CommandFactory;

    #[test]
    fn test_shell_conversion() {
        assert_eq!(shell_to_completion_shell(Shell::Bash), CompletionShell::Bash);
        assert_eq!(shell_to_completion_shell(Shell::PowerShell), CompletionShell::PowerShell);
    }

    #[test]
    fn test_completions_cover_subcommands() {
        let mut out = Vec::new();
        write_completions(CompletionShell::Bash, &mut Args::command(), &mut out);
        let script = String::from_utf8(out).unwrap();
        for name in ["build", "report", "costs", "completion"] {
            assert!(script.contains(name), "missing {name}");
        }
        assert!(script.contains("--branching-factor"));
    }
}
