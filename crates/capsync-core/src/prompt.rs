/// Source of operator input for placeholder values and confirmations.
///
/// Calls block until the operator answers; an empty answer means "no value".
pub trait Prompter {
    fn ask(&mut self, prompt: &str) -> String;

    /// Yes/no question; only `y` or `yes` (any case) count as consent.
    fn confirm(&mut self, prompt: &str) -> bool {
        let answer = self.ask(&format!("{prompt} [y/N]"));
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Prompter for unattended runs: every question gets an empty answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn ask(&mut self, _prompt: &str) -> String {
        String::new()
    }
}
