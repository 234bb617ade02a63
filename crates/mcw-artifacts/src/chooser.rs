//! Interactive selection among local versions.

use mcw_common::ServerVersion;
use std::io::{self, BufRead, Write};

/// Result of asking the user to pick a version.
///
/// `Cancelled` is an explicit quit. Callers end the session on it instead
/// of falling back to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(ServerVersion),
    Cancelled,
}

/// A surface that lets the user pick one of several versions.
pub trait VersionChooser {
    fn choose(&mut self, versions: &[ServerVersion]) -> io::Result<Selection>;
}

/// Numbered-list prompt over any line reader and writer.
///
/// A number selects, `q`/`quit` or end of input cancels, anything else
/// prompts again.
pub struct PromptChooser<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> VersionChooser for PromptChooser<R, W> {
    fn choose(&mut self, versions: &[ServerVersion]) -> io::Result<Selection> {
        if versions.is_empty() {
            writeln!(self.output, "No versions to choose from")?;
            return Ok(Selection::Cancelled);
        }

        writeln!(self.output, "Select Minecraft Version")?;
        for (index, version) in versions.iter().enumerate() {
            writeln!(self.output, "  {}) Paper {}", index + 1, version)?;
        }

        loop {
            write!(self.output, "Choice [1-{}, q to quit]: ", versions.len())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Selection::Cancelled);
            }

            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit") {
                return Ok(Selection::Cancelled);
            }

            match answer.parse::<usize>() {
                Ok(n) if (1..=versions.len()).contains(&n) => {
                    return Ok(Selection::Chosen(versions[n - 1].clone()));
                }
                _ => writeln!(self.output, "Invalid choice: {:?}", answer)?,
            }
        }
    }
}
