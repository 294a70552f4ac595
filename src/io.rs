//! Pluggable input and output for running programs.
//!
//! The interpreter never touches stdin/stdout directly; hosts hand it a pair
//! of providers. Tests use the scripted and captured variants.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tracing::warn;

/// Supplies a line of text for each `input(prompt)` call.
pub trait InputProvider {
    fn read(&mut self, prompt: &str) -> String;
}

/// Receives program output. `text` already includes any trailing newline.
pub trait OutputProvider {
    fn print(&mut self, text: &str);
}

pub struct StdinInput {
    echo_prompts: bool,
}

impl StdinInput {
    pub fn new(echo_prompts: bool) -> Self {
        Self { echo_prompts }
    }
}

impl InputProvider for StdinInput {
    fn read(&mut self, prompt: &str) -> String {
        if self.echo_prompts {
            let mut stdout = io::stdout().lock();
            if let Err(error) = write!(stdout, "{prompt}").and_then(|()| stdout.flush()) {
                warn!(%error, "failed to write prompt");
            }
        }
        let mut line = String::new();
        if let Err(error) = io::stdin().lock().read_line(&mut line) {
            warn!(%error, "failed to read input line");
            return String::new();
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        line
    }
}

#[derive(Debug, Default)]
pub struct StdoutOutput;

impl OutputProvider for StdoutOutput {
    fn print(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(error) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
            warn!(%error, "failed to write output");
        }
    }
}

/// Answers `input` calls from a fixed queue and records the prompts seen.
///
/// Once the queue is exhausted every read returns an empty string.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl InputProvider for ScriptedInput {
    fn read(&mut self, prompt: &str) -> String {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct CapturedOutput {
    buffer: String,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines().collect()
    }

    pub fn into_text(self) -> String {
        self.buffer
    }
}

impl OutputProvider for CapturedOutput {
    fn print(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}
