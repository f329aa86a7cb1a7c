//! Terminal confirmation port.

use crate::ports::ConfirmationPort;
use std::io::{self, BufRead, Write};

/// Asks on stderr, reads answers from stdin.
///
/// With `assume_yes` every confirmation is approved and every prompt takes
/// its default without reading input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read from stdin");
                None
            }
        }
    }
}

impl ConfirmationPort for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        let mut err = io::stderr();
        let _ = writeln!(err, "{}", message);
        if self.assume_yes {
            let _ = writeln!(err, "(confirmed by --yes)");
            return true;
        }
        let _ = write!(err, "[y/N] ");
        let _ = err.flush();

        self.read_line().map(|line| is_yes(&line)).unwrap_or(false)
    }

    fn prompt_text(&self, message: &str, default: Option<&str>) -> Option<String> {
        if self.assume_yes {
            return default.map(str::to_string);
        }

        let mut err = io::stderr();
        match default {
            Some(value) => {
                let _ = write!(err, "{} [{}]: ", message, value);
            }
            None => {
                let _ = write!(err, "{}: ", message);
            }
        }
        let _ = err.flush();

        let line = self.read_line()?;
        resolve_text(&line, default)
    }
}

/// `y`/`yes` in any case
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Trimmed input; blank input falls back to the default
fn resolve_text(input: &str, default: Option<&str>) -> Option<String> {
    let value = input.trim();
    if value.is_empty() {
        return default.map(str::to_string);
    }
    Some(value.to_string())
}
