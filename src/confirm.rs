//! Interactive confirmation for destructive commands.

use std::io::{BufRead, Write};

use anyhow::Result;

/// How a destructive command was (or was not) approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Granted,
    Declined,
    /// No `--yes` and stdin is not a terminal, so nobody could be asked.
    Unavailable,
}

impl Approval {
    pub fn granted(self) -> bool {
        self == Approval::Granted
    }
}

/// `--yes` wins; otherwise ask on stderr when stdin is a terminal.
pub fn confirm(question: &str, yes: bool) -> Result<Approval> {
    if yes {
        return Ok(Approval::Granted);
    }
    if !atty::is(atty::Stream::Stdin) {
        return Ok(Approval::Unavailable);
    }
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(if is_yes(&answer) {
        Approval::Granted
    } else {
        Approval::Declined
    })
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
