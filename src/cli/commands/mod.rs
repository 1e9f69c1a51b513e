//! Command implementations for accessaid.
//!
//! Every command returns the text to print; `main` does the printing.

mod reminder;
mod sync;
mod voice;

pub use reminder::reminder;
pub use sync::sync;
pub use voice::voice;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::Cli;
use crate::error::AccessAidError;

/// Generate a shell completion script.
///
/// # Errors
///
/// Returns `AccessAidError::Config` if the generated script is not UTF-8.
pub fn completions(shell: Shell) -> Result<String, AccessAidError> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, name, &mut buf);
    String::from_utf8(buf)
        .map_err(|e| AccessAidError::Config(format!("Completion script is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_bash() {
        let script = completions(Shell::Bash).unwrap();
        assert!(script.contains("accessaid"));
        assert!(script.contains("sync"));
    }

    #[test]
    fn test_completions_zsh() {
        let script = completions(Shell::Zsh).unwrap();
        assert!(script.contains("#compdef accessaid"));
    }
}
