use std::io::{self, BufRead, Write};

use capsync_core::Prompter;
use colored::Colorize;

/// Line-based prompter: writes the question, reads one line as the answer.
/// End of input counts as an empty answer.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on stderr so stdout stays clean for the summary.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, prompt: &str) -> String {
        let _ = write!(self.output, "{} {prompt}: ", "?".yellow());
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(_) => line.trim_end_matches(['\r', '\n']).to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read answer, treating as empty");
                String::new()
            }
        }
    }
}
