//! Operator confirmation before any mutating call.

use std::io::{BufRead, Write};

use crate::error::ProvisioningResult;

/// Asks the operator whether to go ahead.
pub trait Confirmation {
    /// `summary` is shown before the question.
    fn confirm(&mut self, summary: &str, question: &str) -> ProvisioningResult<bool>;
}

/// Parse a yes/no answer. Returns `None` for anything unrecognized.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" | "1" | "true" | "t" => Some(true),
        "n" | "no" | "0" | "false" | "f" => Some(false),
        _ => None,
    }
}

/// Line-oriented prompt; re-asks until the answer parses.
///
/// End of input counts as "no".
pub struct PromptConfirmation<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirmation<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirmation for PromptConfirmation<R, W> {
    fn confirm(&mut self, summary: &str, question: &str) -> ProvisioningResult<bool> {
        writeln!(self.output, "{summary}")?;
        loop {
            writeln!(self.output, "\n{question}")?;
            writeln!(self.output, "Yes or No? ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            match parse_yes_no(&line) {
                Some(answer) => return Ok(answer),
                None => writeln!(self.output, "ERROR:  A yes or no response is required")?,
            }
        }
    }
}

/// Confirms without asking (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmation for AssumeYes {
    fn confirm(&mut self, _summary: &str, _question: &str) -> ProvisioningResult<bool> {
        Ok(true)
    }
}
